//! # fairdeal CLI Library
//!
//! Operator and auditor tooling for the fairdeal engine. The entry point is
//! [`run`], which parses arguments and dispatches to a subcommand.
//!
//! ## Available Subcommands
//!
//! - `eval`: Evaluate the best hand out of 5 to 7 cards
//! - `deal`: Shuffle, commit, deal one hand and reveal the verification bundle
//! - `verify`: Audit a verification bundle or a JSONL hand log
//! - `cfg`: Display resolved table settings and their sources
//!
//! ## Example Usage
//!
//! ```
//! use std::io;
//! let args = vec!["fairdeal", "eval", "As", "Ks", "Qs", "Js", "Ts"];
//! let code = fairdeal_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```

use clap::Parser;
use std::io::Write;

pub mod cli;
mod commands;
mod error;
pub mod exit_code;
pub mod ui;

use cli::{Commands, FairdealCli};
use commands::{
    handle_cfg_command, handle_deal_command, handle_eval_command, handle_verify_command,
};

pub use error::{BatchValidationError, CliError};

const COMMANDS: &[&str] = &["eval", "deal", "verify", "cfg"];

/// Parses `args` and runs the selected command.
///
/// Returns `0` on success and `2` on any error. Help and version output go
/// to `out`; everything else diagnostic goes to `err`.
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match FairdealCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => return report_parse_error(&e, out, err),
    };

    let result = match cli.cmd {
        Commands::Eval { cards } => handle_eval_command(&cards, out),
        Commands::Deal {
            players,
            seed,
            output,
        } => handle_deal_command(players, seed, output.as_deref(), out),
        Commands::Verify { input } => handle_verify_command(&input, out, err),
        Commands::Cfg => handle_cfg_command(out, err),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            let _ = ui::write_error(err, &e.to_string());
            exit_code::ERROR
        }
    }
}

fn report_parse_error(e: &clap::Error, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    use clap::error::ErrorKind;

    // Help and version should print to stdout and exit 0
    if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        return match write!(out, "{}", e) {
            Ok(()) => exit_code::SUCCESS,
            Err(_) => exit_code::ERROR,
        };
    }

    let _ = writeln!(err, "{}", e);
    let _ = writeln!(err, "Usage: fairdeal <command> [options]\n");
    let _ = writeln!(err, "Commands:");
    for c in COMMANDS {
        let _ = writeln!(err, "  {}", c);
    }
    let _ = writeln!(err, "\nFor full help, run: fairdeal --help");
    exit_code::ERROR
}
