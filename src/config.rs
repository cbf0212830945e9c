//! Engine configuration
//!
//! Flags are read once, validated, and handed to the engine as an immutable
//! value. Detectors never consult the environment themselves.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::DEFAULT_STORE_PATH;

pub const ENV_ENABLED: &str = "LUMIRA_ENABLED";
pub const ENV_SEMANTICS_ENABLED: &str = "LUMIRA_SEMANTICS_ENABLED";
pub const ENV_SAFETY_ENABLED: &str = "LUMIRA_SAFETY_ENABLED";
pub const ENV_SIGNALS_ENABLED: &str = "LUMIRA_SIGNALS_ENABLED";
pub const ENV_DB_PATH: &str = "LUMIRA_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "LUMIRA_LOG_LEVEL";

/// Layer switches; everything defaults to off
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Master status, reported but not used for gating
    pub enabled: bool,
    pub semantics_enabled: bool,
    pub safety_enabled: bool,
    pub signals_enabled: bool,
}

impl FeatureFlags {
    /// Every layer on
    pub fn all() -> Self {
        Self {
            enabled: true,
            semantics_enabled: true,
            safety_enabled: true,
            signals_enabled: true,
        }
    }

    /// Every layer off
    pub fn none() -> Self {
        Self::default()
    }

    /// Read flags through a lookup function (env, map, ...)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            enabled: flag(&lookup, ENV_ENABLED)?,
            semantics_enabled: flag(&lookup, ENV_SEMANTICS_ENABLED)?,
            safety_enabled: flag(&lookup, ENV_SAFETY_ENABLED)?,
            signals_enabled: flag(&lookup, ENV_SIGNALS_ENABLED)?,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

/// Full engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LumiraConfig {
    pub flags: FeatureFlags,
    pub store_path: PathBuf,
}

impl Default for LumiraConfig {
    fn default() -> Self {
        Self {
            flags: FeatureFlags::default(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl LumiraConfig {
    /// Build from a lookup function; fails fast on malformed flag values
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flags = FeatureFlags::from_lookup(&lookup)?;
        let store_path = lookup(ENV_DB_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));

        Ok(Self { flags, store_path })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Explicit flags override whatever was loaded
    pub fn with_flags(mut self, flags: FeatureFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }
}

/// Parse a boolean flag value
pub fn parse_flag(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name: name.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn flag<F>(lookup: &F, name: &str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => parse_flag(name, &raw),
        None => Ok(false),
    }
}
