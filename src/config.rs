use std::{env, fmt, path::PathBuf, time::Duration};
use thiserror::Error;
use tracing::warn;

pub const TOKEN_VAR: &str = "TALLY_BOT_TOKEN";
pub const DEFAULT_DATA_PATH: &str = "data/tally_data.json";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_RESET_INTERVAL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_COMMAND_PREFIX: &str = "!";

/// The reset timer has to tick more often than the smallest window.
const MAX_RESET_INTERVAL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TALLY_BOT_TOKEN environment variable not set")]
    MissingToken,
}

#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub data_path: PathBuf,
    pub port: u16,
    pub reset_interval: Duration,
    pub command_prefix: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"***")
            .field("data_path", &self.data_path)
            .field("port", &self.port)
            .field("reset_interval", &self.reset_interval)
            .field("command_prefix", &self.command_prefix)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup(TOKEN_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let reset_interval = match lookup("TALLY_RESET_INTERVAL_SECS") {
            None => DEFAULT_RESET_INTERVAL,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 && secs < MAX_RESET_INTERVAL_SECS => Duration::from_secs(secs),
                _ => {
                    warn!("ignoring TALLY_RESET_INTERVAL_SECS={raw}, using default");
                    DEFAULT_RESET_INTERVAL
                }
            },
        };

        let command_prefix = lookup("TALLY_COMMAND_PREFIX")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COMMAND_PREFIX.to_string());

        Ok(Self {
            token,
            data_path,
            port,
            reset_interval,
            command_prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn token_is_required() {
        assert!(matches!(config_from(&[]), Err(ConfigError::MissingToken)));
        assert!(matches!(
            config_from(&[(TOKEN_VAR, "   ")]),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn defaults_apply() {
        let config = config_from(&[(TOKEN_VAR, "secret")]).unwrap();
        assert_eq!(config.token, "secret");
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.reset_interval, DEFAULT_RESET_INTERVAL);
        assert_eq!(config.command_prefix, "!");
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            (TOKEN_VAR, "secret"),
            ("APP_DATA_PATH", "/tmp/t.json"),
            ("PORT", "9000"),
            ("TALLY_RESET_INTERVAL_SECS", "60"),
            ("TALLY_COMMAND_PREFIX", "?"),
        ])
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("/tmp/t.json"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.reset_interval, Duration::from_secs(60));
        assert_eq!(config.command_prefix, "?");
    }

    #[test]
    fn out_of_range_interval_falls_back() {
        for raw in ["0", "86400", "soon"] {
            let config =
                config_from(&[(TOKEN_VAR, "secret"), ("TALLY_RESET_INTERVAL_SECS", raw)]).unwrap();
            assert_eq!(config.reset_interval, DEFAULT_RESET_INTERVAL, "{raw}");
        }
    }

    #[test]
    fn debug_hides_token() {
        let config = config_from(&[(TOKEN_VAR, "secret")]).unwrap();
        assert!(!format!("{config:?}").contains("secret"));
    }
}
