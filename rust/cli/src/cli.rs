//! Command-line argument definitions.

use clap::{Parser, Subcommand};
use fairdeal_engine::game::MAX_SEATS;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "fairdeal",
    version,
    about = "Provably fair Hold'em: hand evaluation, dealing and shuffle audits"
)]
pub struct FairdealCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate the best five-card hand from 5 to 7 cards
    Eval {
        /// Card codes such as As, Td, 10h or K♠
        #[arg(required = true, num_args = 5..=7)]
        cards: Vec<String>,
    },
    /// Shuffle a committed deck, deal a hand and reveal the bundle
    Deal {
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(2..=MAX_SEATS as i64))]
        players: u8,
        /// Derive the shuffle from this seed instead of OS entropy
        #[arg(long)]
        seed: Option<u64>,
        /// Write the verification bundle here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Audit a verification bundle (JSON) or a hand log (JSONL)
    Verify {
        #[arg(long)]
        input: PathBuf,
    },
    /// Show resolved table settings and where each value came from
    Cfg,
}
