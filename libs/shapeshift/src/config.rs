use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Mapper behaviour toggles. Fixed for the lifetime of a `Mapper`.
///
/// Every toggle defaults to `false`; `max_depth` defaults to 64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Let a user validator replace a built-in of the same name (`eq`,
    /// `required`, ...). When off, the built-in wins and the user validator
    /// is ignored for that name.
    pub override_default_validators: bool,

    /// Silently skip validators named in a tag that are not registered,
    /// instead of failing the call.
    pub ignore_missing_validators: bool,

    /// Silently skip callbacks named in a tag that are not registered,
    /// instead of failing the call.
    pub ignore_missing_callbacks: bool,

    /// Parse strings into int, uint and float destinations.
    pub auto_string_to_number: bool,

    /// Format int, uint and float sources into string destinations.
    pub auto_number_to_string: bool,

    /// Maximum record/sequence nesting depth before the call fails.
    pub max_depth: usize,
}

pub const DEFAULT_MAX_DEPTH: usize = 64;

impl Default for Config {
    fn default() -> Self {
        Self {
            override_default_validators: false,
            ignore_missing_validators: false,
            ignore_missing_callbacks: false,
            auto_string_to_number: false,
            auto_number_to_string: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string. Missing keys keep their defaults.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }
}
