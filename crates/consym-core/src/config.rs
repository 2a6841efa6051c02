//! # Configuration
//!
//! Options accepted by the installer, plus environment-driven loading.
//!
//! ## Environment Variables
//!
//! - `CONSYM_EXCLUDE_RN_CORE_FRAMES`: drop framework-internal frames (`true`/`false`, `1`/`0`, `yes`/`no`)
//! - `CONSYM_DEV_SERVER_URL`: base URL of the development server (default: `http://localhost:8081`)
//! - `CONSYM_MODE`: force `development` or `production` instead of deriving it from the build

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::symbolicate::DEFAULT_DEV_SERVER_URL;

/// Options recognised by the installer.
///
/// Deserialises from the camelCase option object, so
/// `{"excludeReactNativeCoreFrames": true}` is accepted as-is; unknown keys
/// are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SymbolicatorOptions
{
    /// Drop frames whose formatted line points into `node_modules/react-native`.
    ///
    /// Makes stacks shorter at the cost of losing the framework-internal part.
    pub exclude_react_native_core_frames: bool,
}

impl SymbolicatorOptions
{
    /// Parse an options object from JSON.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidOptions`] for malformed JSON or wrongly typed values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError>
    {
        serde_json::from_str(json).map_err(|err| ConfigError::InvalidOptions(err.to_string()))
    }
}

/// Build mode gating installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode
{
    /// Development build: channels get symbolicated.
    Development,
    /// Production build: installation is a no-op.
    Production,
}

impl Mode
{
    /// Mode of the running build: `Development` with debug assertions, `Production` otherwise.
    pub const fn current() -> Self
    {
        if cfg!(debug_assertions) {
            Mode::Development
        } else {
            Mode::Production
        }
    }

    /// `true` for [`Mode::Development`].
    pub const fn is_development(self) -> bool
    {
        matches!(self, Mode::Development)
    }
}

impl fmt::Display for Mode
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Mode::Development => f.write_str("development"),
            Mode::Production => f.write_str("production"),
        }
    }
}

impl FromStr for Mode
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            _ => Err(format!("Unknown mode: {s}. Use 'development' or 'production'")),
        }
    }
}

/// Full configuration for a default installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config
{
    /// Installer options.
    pub options: SymbolicatorOptions,
    /// Base URL of the development server.
    pub dev_server_url: String,
    /// Explicit mode; `None` means [`Mode::current`].
    pub mode: Option<Mode>,
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            options: SymbolicatorOptions::default(),
            dev_server_url: DEFAULT_DEV_SERVER_URL.to_string(),
            mode: None,
        }
    }
}

impl Config
{
    /// Load configuration from the process environment.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set to something
    /// we cannot interpret.
    pub fn from_env() -> Result<Self, ConfigError>
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// ## Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError>
    {
        let mut config = Self::default();

        if let Some(value) = lookup("CONSYM_EXCLUDE_RN_CORE_FRAMES") {
            config.options.exclude_react_native_core_frames = parse_flag(&value).ok_or(ConfigError::InvalidValue {
                key: "CONSYM_EXCLUDE_RN_CORE_FRAMES",
                value,
            })?;
        }

        if let Some(url) = lookup("CONSYM_DEV_SERVER_URL").filter(|url| !url.trim().is_empty()) {
            config.dev_server_url = url.trim().to_string();
        }

        if let Some(value) = lookup("CONSYM_MODE") {
            let mode = value.parse::<Mode>().map_err(|_| ConfigError::InvalidValue {
                key: "CONSYM_MODE",
                value,
            })?;
            config.mode = Some(mode);
        }

        Ok(config)
    }

    /// Effective mode.
    pub fn mode(&self) -> Mode
    {
        self.mode.unwrap_or_else(Mode::current)
    }
}

fn parse_flag(value: &str) -> Option<bool>
{
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
