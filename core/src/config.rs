//! Client configuration.
//!
//! # Design
//! `ClientConfig` carries the defaults every transfer starts from. It is
//! re-applied to the handle on each call, so a handle reset never loses it.
//! Per-call `RequestOptions` override the three boolean switches and add
//! headers on top.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Content type used for POST and PUT bodies when none is given.
pub const DEFAULT_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Handle-wide defaults, loadable from TOML.
///
/// ```toml
/// follow_location = false
/// timeout_ms = 5000
/// user_agent = "friendly-curl"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub follow_location: bool,
    pub accept_self_signed: bool,
    pub debug: bool,
    pub timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
    pub content_type: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            follow_location: true,
            accept_self_signed: false,
            debug: false,
            timeout_ms: None,
            connect_timeout_ms: None,
            user_agent: None,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::Invalid("timeout_ms must be greater than zero".to_string()));
        }
        if self.connect_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "connect_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.content_type.trim().is_empty() {
            return Err(ConfigError::Invalid("content_type must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}

/// Per-call settings. Unset switches fall back to the client's config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub content_type: Option<String>,
    pub accept_self_signed: Option<bool>,
    pub follow_location: Option<bool>,
    pub debug: Option<bool>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.headers.push((name.into(), value.to_string()));
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn accept_self_signed(mut self, accept: bool) -> Self {
        self.accept_self_signed = Some(accept);
        self
    }

    pub fn follow_location(mut self, follow: bool) -> Self {
        self.follow_location = Some(follow);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    pub(crate) fn resolve(&self, config: &ClientConfig) -> Resolved {
        Resolved {
            accept_self_signed: self.accept_self_signed.unwrap_or(config.accept_self_signed),
            follow_location: self.follow_location.unwrap_or(config.follow_location),
            debug: self.debug.unwrap_or(config.debug),
        }
    }
}

/// Switches after applying config defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub accept_self_signed: bool,
    pub follow_location: bool,
    pub debug: bool,
}
