//! Eval command: best five-card hand out of 5 to 7 cards.

use crate::error::CliError;
use fairdeal_engine::cards::{cards_to_string, Card};
use fairdeal_engine::hand::best_hand;
use std::io::Write;

pub fn handle_eval_command(cards: &[String], out: &mut dyn Write) -> Result<(), CliError> {
    let parsed = cards
        .iter()
        .map(|c| c.parse::<Card>())
        .collect::<Result<Vec<Card>, _>>()?;
    let (strength, best_five) = best_hand(&parsed)?;

    let tiebreakers = strength
        .tiebreakers
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "Hand: {}", strength.describe())?;
    writeln!(out, "Category: {}", strength.category.name())?;
    writeln!(out, "Tiebreakers: {}", tiebreakers)?;
    writeln!(out, "Best five: {}", cards_to_string(&best_five))?;
    Ok(())
}
