use fairdeal_engine::game::{GameConfig, MAX_SEATS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_ENV: &str = "FAIRDEAL_CONFIG";

/// Defaults applied to every table the manager creates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSettings {
    pub small_blind: u32,
    pub big_blind: u32,
    /// Seconds a player has to act before being folded
    pub turn_timeout_secs: u64,
    /// How often the timeout watcher sweeps the tables
    pub poll_interval_ms: u64,
    pub max_seats: usize,
    pub min_buy_in: u32,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            small_blind: 10,
            big_blind: 20,
            turn_timeout_secs: 30,
            poll_interval_ms: 1_000,
            max_seats: 9,
            min_buy_in: 100,
        }
    }
}

impl TableSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.small_blind == 0 {
            return Err(SettingsError::InvalidValue(
                "small_blind must be greater than 0".to_string(),
            ));
        }
        if self.big_blind < self.small_blind {
            return Err(SettingsError::InvalidValue(
                "big_blind must be at least small_blind".to_string(),
            ));
        }
        if self.turn_timeout_secs == 0 {
            return Err(SettingsError::InvalidValue(
                "turn_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if !(2..=MAX_SEATS).contains(&self.max_seats) {
            return Err(SettingsError::InvalidValue(format!(
                "max_seats must be between 2 and {}",
                MAX_SEATS
            )));
        }
        Ok(())
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Engine configuration for a table with these defaults and the given blinds.
    pub fn game_config(&self, small_blind: u32, big_blind: u32) -> GameConfig {
        GameConfig {
            small_blind,
            big_blind,
            turn_timeout: self.turn_timeout(),
            max_seats: self.max_seats,
            min_buy_in: self.min_buy_in,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SettingsSources {
    pub small_blind: ValueSource,
    pub big_blind: ValueSource,
    pub turn_timeout_secs: ValueSource,
    pub poll_interval_ms: ValueSource,
    pub max_seats: ValueSource,
    pub min_buy_in: ValueSource,
}

impl Default for SettingsSources {
    fn default() -> Self {
        Self {
            small_blind: ValueSource::Default,
            big_blind: ValueSource::Default,
            turn_timeout_secs: ValueSource::Default,
            poll_interval_ms: ValueSource::Default,
            max_seats: ValueSource::Default,
            min_buy_in: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSettings {
    pub settings: TableSettings,
    pub sources: SettingsSources,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    #[serde(default)]
    small_blind: Option<u32>,
    #[serde(default)]
    big_blind: Option<u32>,
    #[serde(default)]
    turn_timeout_secs: Option<u64>,
    #[serde(default)]
    poll_interval_ms: Option<u64>,
    #[serde(default)]
    max_seats: Option<usize>,
    #[serde(default)]
    min_buy_in: Option<u32>,
}

pub fn load() -> Result<TableSettings, SettingsError> {
    load_with_sources().map(|resolved| resolved.settings)
}

/// Resolves settings from defaults, then the TOML file named by
/// `FAIRDEAL_CONFIG`, then `FAIRDEAL_*` environment variables.
pub fn load_with_sources() -> Result<ResolvedSettings, SettingsError> {
    let mut s = TableSettings::default();
    let mut sources = SettingsSources::default();

    if let Ok(path) = std::env::var(CONFIG_ENV) {
        let text = fs::read_to_string(path)?;
        let f: FileSettings = toml::from_str(&text)?;
        apply(&mut s.small_blind, &mut sources.small_blind, f.small_blind, ValueSource::File);
        apply(&mut s.big_blind, &mut sources.big_blind, f.big_blind, ValueSource::File);
        apply(
            &mut s.turn_timeout_secs,
            &mut sources.turn_timeout_secs,
            f.turn_timeout_secs,
            ValueSource::File,
        );
        apply(
            &mut s.poll_interval_ms,
            &mut sources.poll_interval_ms,
            f.poll_interval_ms,
            ValueSource::File,
        );
        apply(&mut s.max_seats, &mut sources.max_seats, f.max_seats, ValueSource::File);
        apply(&mut s.min_buy_in, &mut sources.min_buy_in, f.min_buy_in, ValueSource::File);
    }

    apply(
        &mut s.small_blind,
        &mut sources.small_blind,
        env_value("FAIRDEAL_SMALL_BLIND")?,
        ValueSource::Env,
    );
    apply(
        &mut s.big_blind,
        &mut sources.big_blind,
        env_value("FAIRDEAL_BIG_BLIND")?,
        ValueSource::Env,
    );
    apply(
        &mut s.turn_timeout_secs,
        &mut sources.turn_timeout_secs,
        env_value("FAIRDEAL_TURN_TIMEOUT")?,
        ValueSource::Env,
    );
    apply(
        &mut s.poll_interval_ms,
        &mut sources.poll_interval_ms,
        env_value("FAIRDEAL_POLL_INTERVAL_MS")?,
        ValueSource::Env,
    );
    apply(
        &mut s.max_seats,
        &mut sources.max_seats,
        env_value("FAIRDEAL_MAX_SEATS")?,
        ValueSource::Env,
    );
    apply(
        &mut s.min_buy_in,
        &mut sources.min_buy_in,
        env_value("FAIRDEAL_MIN_BUY_IN")?,
        ValueSource::Env,
    );

    s.validate()?;
    Ok(ResolvedSettings {
        settings: s,
        sources,
    })
}

fn apply<T>(slot: &mut T, source: &mut ValueSource, value: Option<T>, from: ValueSource) {
    if let Some(v) = value {
        *slot = v;
        *source = from;
    }
}

/// Reads a numeric override; unset or empty means no override.
fn env_value<T: std::str::FromStr>(name: &str) -> Result<Option<T>, SettingsError> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SettingsError::InvalidValue(format!("{} is not a valid number", name))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        assert!(TableSettings::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_blinds() {
        let settings = TableSettings {
            small_blind: 50,
            big_blind: 20,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_zero_timeouts_and_bad_seat_counts() {
        for settings in [
            TableSettings {
                turn_timeout_secs: 0,
                ..Default::default()
            },
            TableSettings {
                poll_interval_ms: 0,
                ..Default::default()
            },
            TableSettings {
                max_seats: 1,
                ..Default::default()
            },
            TableSettings {
                max_seats: MAX_SEATS + 1,
                ..Default::default()
            },
        ] {
            assert!(settings.validate().is_err(), "{:?}", settings);
        }
    }

    #[test]
    fn game_config_carries_table_defaults() {
        let settings = TableSettings {
            turn_timeout_secs: 45,
            max_seats: 6,
            ..Default::default()
        };
        let config = settings.game_config(25, 50);
        assert_eq!(config.small_blind, 25);
        assert_eq!(config.big_blind, 50);
        assert_eq!(config.turn_timeout, Duration::from_secs(45));
        assert_eq!(config.max_seats, 6);
        assert_eq!(config.min_buy_in, 100);
    }
}
