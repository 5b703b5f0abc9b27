//! Deal command: one committed shuffle, dealt and then revealed.
//!
//! The commitment is printed before any card so the output reads in the
//! same order a table sees it.

use crate::error::CliError;
use fairdeal_engine::cards::cards_to_string;
use fairdeal_engine::deck::Deck;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::fs;
use std::io::Write;
use std::path::Path;

const BOARD_CARDS: usize = 5;

pub fn handle_deal_command(
    players: u8,
    seed: Option<u64>,
    output: Option<&Path>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let mut deck = Deck::new();
    let commitment = match seed {
        Some(s) => deck.shuffle_with(&mut ChaCha20Rng::seed_from_u64(s)),
        None => deck.shuffle(),
    };
    writeln!(out, "Commitment: {}", commitment)?;

    for p in 1..=players {
        let hole = deck.deal(2)?;
        writeln!(out, "Hole P{}: {}", p, cards_to_string(&hole))?;
    }
    let board = deck.deal(BOARD_CARDS)?;
    writeln!(out, "Board: {}", cards_to_string(&board))?;

    let bundle = deck.verification_bundle()?;
    let json = serde_json::to_string_pretty(&bundle).map_err(std::io::Error::other)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, format!("{}\n", json))?;
            writeln!(out, "Bundle written to {}", path.display())?;
        }
        None => writeln!(out, "{}", json)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(players: u8, seed: Option<u64>) -> String {
        let mut out = Vec::new();
        handle_deal_command(players, seed, None, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn commitment_comes_first() {
        let output = deal(3, Some(7));
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with("Commitment: "));
        assert!(lines[1].starts_with("Hole P1:"));
        assert!(lines[3].starts_with("Hole P3:"));
        assert!(lines[4].starts_with("Board:"));
    }

    #[test]
    fn same_seed_deals_the_same_hand() {
        assert_eq!(deal(2, Some(12345)), deal(2, Some(12345)));
        assert_ne!(deal(2, Some(1)), deal(2, Some(2)));
    }

    #[test]
    fn full_table_fits_in_the_deck() {
        let output = deal(22, None);
        assert!(output.contains("Hole P22:"));
    }
}
