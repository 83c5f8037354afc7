//! TOML-backed session configuration.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use deck_defence_core::EconomyTuning;
use deck_defence_system_wave_generation::WaveTuning;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config at {}", path.display())]
    Read {
        /// Location that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file is not valid TOML for a session configuration.
    #[error("failed to parse session config toml contents")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range.
    #[error("invalid session config: {0}")]
    Invalid(&'static str),
}

/// Clock and spawn cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Milliseconds between ticks of the background clock.
    pub tick_period_ms: u64,
    /// Ticks between attacker releases while the path is occupied.
    pub spawn_interval: u32,
    /// Seed for the wave order shuffle.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 1_500,
            spawn_interval: 3,
            seed: 0x5eed_dec4_defe_2ce0,
        }
    }
}

/// Complete tuning for a play session. Every section is optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Clock and spawn cadence.
    pub simulation: SimulationConfig,
    /// Balances and price formulas.
    pub economy: EconomyTuning,
    /// Procedural wave coefficients.
    pub waves: WaveTuning,
}

impl SessionConfig {
    /// Reads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.tick_period_ms == 0 {
            return Err(ConfigError::Invalid("tick_period_ms must be positive"));
        }
        if self.simulation.spawn_interval == 0 {
            return Err(ConfigError::Invalid("spawn_interval must be positive"));
        }
        let growth = self.economy.upgrade_growth;
        if growth.denominator() == 0 {
            return Err(ConfigError::Invalid(
                "upgrade growth denominator must be positive",
            ));
        }
        if growth.numerator() < growth.denominator() {
            return Err(ConfigError::Invalid("upgrade prices must not shrink"));
        }
        if self.waves.boss_cadence == 0 {
            return Err(ConfigError::Invalid("boss_cadence must be positive"));
        }
        Ok(())
    }

    /// Interval between clock ticks.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.simulation.tick_period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SessionConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.tick_period(), Duration::from_millis(1_500));
        assert_eq!(config.economy.starting_gold, 100);
        assert_eq!(config.waves.boss_cadence, 5);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = SessionConfig::from_toml_str(
            r#"
            [simulation]
            seed = 42

            [economy]
            starting_gold = 250
            upgrade_growth = { numerator = 2, denominator = 1 }

            [waves]
            hp_step_percent = 20
            "#,
        )
        .expect("valid config");

        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.simulation.spawn_interval, 3);
        assert_eq!(config.economy.starting_gold, 250);
        assert_eq!(config.economy.starting_lives, 20);
        assert_eq!(config.economy.upgrade_growth.numerator(), 2);
        assert_eq!(config.waves.hp_step_percent, 20);
        assert_eq!(config.waves.hp_threshold, 5);
    }

    #[test]
    fn zero_spawn_interval_is_rejected() {
        let error = SessionConfig::from_toml_str("[simulation]\nspawn_interval = 0\n")
            .expect_err("zero interval must fail");
        assert!(matches!(error, ConfigError::Invalid(_)));
    }

    #[test]
    fn shrinking_upgrade_growth_is_rejected() {
        let error = SessionConfig::from_toml_str(
            "[economy]\nupgrade_growth = { numerator = 1, denominator = 2 }\n",
        )
        .expect_err("shrinking prices must fail");
        assert!(matches!(error, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_reports_parse_error() {
        let error = SessionConfig::from_toml_str("[simulation\n").expect_err("broken toml");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let error = SessionConfig::load("/definitely/not/here.toml").expect_err("missing file");
        assert!(error.to_string().contains("/definitely/not/here.toml"));
    }
}
