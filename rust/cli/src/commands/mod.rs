//! Command handlers, one module per subcommand.
//!
//! Each handler takes its parsed arguments plus the output streams and
//! returns `Result<(), CliError>`.

mod cfg;
mod deal;
mod eval;
mod verify;

pub use cfg::handle_cfg_command;
pub use deal::handle_deal_command;
pub use eval::handle_eval_command;
pub use verify::handle_verify_command;
