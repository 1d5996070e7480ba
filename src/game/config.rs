//! Referee Configuration
//!
//! Everything a session needs besides player commands. The seed is always
//! explicit; nothing here reads the clock.

use std::time::Duration;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Upper bound on seats; the rotational spawn layout gets too tight beyond it.
pub const MAX_PLAYERS: usize = 8;

/// Session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefereeConfig {
    /// RNG seed for map generation.
    pub seed: u64,
    /// Number of players.
    pub player_count: usize,
    /// Round cap.
    pub max_rounds: u32,
    /// Time each bot gets to answer a round.
    #[serde(with = "duration_millis")]
    pub response_timeout: Duration,
}

impl Default for RefereeConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            player_count: 3,
            max_rounds: 200,
            response_timeout: Duration::from_millis(50),
        }
    }
}

impl RefereeConfig {
    /// Create config from environment variables.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            seed: env_parse("MEANMAX_SEED").unwrap_or(defaults.seed),
            player_count: env_parse("MEANMAX_PLAYERS").unwrap_or(defaults.player_count),
            max_rounds: env_parse("MEANMAX_MAX_ROUNDS").unwrap_or(defaults.max_rounds),
            response_timeout: env_parse("MEANMAX_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.response_timeout),
        }
    }

    /// Config with a specific seed and otherwise default values.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, ..Self::default() }
    }

    /// Check the config can build a session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player_count == 0 || self.player_count > MAX_PLAYERS {
            return Err(ConfigError::PlayerCount(self.player_count));
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Invalid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Player count outside [1, MAX_PLAYERS].
    #[error("player count {0} outside supported range")]
    PlayerCount(usize),
    /// Zero round cap.
    #[error("max_rounds must be positive")]
    NoRounds,
}

mod duration_millis {
    use std::time::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RefereeConfig::default();
        assert_eq!(config.seed, 1);
        assert_eq!(config.player_count, 3);
        assert_eq!(config.max_rounds, 200);
        assert_eq!(config.response_timeout, Duration::from_millis(50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_player_count() {
        let mut config = RefereeConfig::default();
        config.player_count = 0;
        assert_eq!(config.validate(), Err(ConfigError::PlayerCount(0)));
        config.player_count = MAX_PLAYERS + 1;
        assert!(config.validate().is_err());
        config.player_count = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rounds() {
        let config = RefereeConfig { max_rounds: 0, ..RefereeConfig::default() };
        assert_eq!(config.validate(), Err(ConfigError::NoRounds));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = RefereeConfig::with_seed(99);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"response_timeout\":50"));
        let back: RefereeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
