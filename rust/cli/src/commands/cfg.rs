//! Cfg command: resolved table settings with the source of each value.
//!
//! ```json
//! {
//!   "small_blind": { "value": 10, "source": "default" },
//!   "big_blind": { "value": 50, "source": "env" },
//!   ...
//! }
//! ```

use crate::error::CliError;
use crate::ui;
use fairdeal_tables::settings;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let resolved = match settings::load_with_sources() {
        Ok(r) => r,
        Err(e) => {
            ui::write_error(err, &format!("Invalid configuration: {}", e))?;
            return Err(e.into());
        }
    };

    let settings::ResolvedSettings { settings, sources } = resolved;
    let display = serde_json::json!({
        "small_blind": {
            "value": settings.small_blind,
            "source": sources.small_blind,
        },
        "big_blind": {
            "value": settings.big_blind,
            "source": sources.big_blind,
        },
        "turn_timeout_secs": {
            "value": settings.turn_timeout_secs,
            "source": sources.turn_timeout_secs,
        },
        "poll_interval_ms": {
            "value": settings.poll_interval_ms,
            "source": sources.poll_interval_ms,
        },
        "max_seats": {
            "value": settings.max_seats,
            "source": sources.max_seats,
        },
        "min_buy_in": {
            "value": settings.min_buy_in,
            "source": sources.min_buy_in,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
