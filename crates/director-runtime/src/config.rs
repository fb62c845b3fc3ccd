#![forbid(unsafe_code)]

//! Policy-as-data configuration for the timeline controller.
//!
//! Every pacing constant of [`Director`](crate::Director) lives in
//! [`DirectorConfig`], loadable from TOML or JSON at startup with the
//! `policy-config` feature.
//!
//! # Loading
//!
//! ```toml
//! # director.toml
//! skip_window_ms = 400
//! instant_duration_cap_ms = 250
//! hurry_selector = "*"
//! ```
//!
//! ```rust,ignore
//! let config = DirectorConfig::from_toml_file("director.toml")?;
//! let config = DirectorConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! `DirectorConfig::default()` uses the core constants: a 500ms skip window,
//! a 300ms cap on instant and rollback transitions, and zero-length
//! transitions while skipping.

#[cfg(feature = "policy-config")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};

use director_core::{INSTANT_DURATION_CAP, ROLLBACK_DURATION_CAP, SKIP_WINDOW, Selector};

/// Pacing parameters for navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct DirectorConfig {
    /// Commands closer together than this are rapid skips (ms).
    pub skip_window_ms: u64,
    /// Duration cap for commands the caller marks instant (ms).
    pub instant_duration_cap_ms: u64,
    /// Duration cap for commands detected as skips (ms).
    pub skip_duration_cap_ms: u64,
    /// Duration cap for generated inverse transitions (ms).
    pub rollback_duration_cap_ms: u64,
    /// Transitions forced to completion when a skip is detected.
    pub hurry_selector: String,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            skip_window_ms: SKIP_WINDOW.as_millis() as u64,
            instant_duration_cap_ms: INSTANT_DURATION_CAP.as_millis() as u64,
            skip_duration_cap_ms: 0,
            rollback_duration_cap_ms: ROLLBACK_DURATION_CAP.as_millis() as u64,
            hurry_selector: "*".to_string(),
        }
    }
}

impl DirectorConfig {
    #[must_use]
    pub fn skip_window(&self) -> Duration {
        Duration::from_millis(self.skip_window_ms)
    }

    #[must_use]
    pub fn instant_duration_cap(&self) -> Duration {
        Duration::from_millis(self.instant_duration_cap_ms)
    }

    #[must_use]
    pub fn skip_duration_cap(&self) -> Duration {
        Duration::from_millis(self.skip_duration_cap_ms)
    }

    #[must_use]
    pub fn rollback_duration_cap(&self) -> Duration {
        Duration::from_millis(self.rollback_duration_cap_ms)
    }

    #[must_use]
    pub fn hurry_selector(&self) -> Selector {
        Selector::parse(&self.hurry_selector)
    }

    /// Disable skip detection entirely (builder pattern).
    #[must_use]
    pub fn without_skipping(mut self) -> Self {
        self.skip_window_ms = 0;
        self
    }

    /// Load from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyConfigError> {
        let config: Self = toml::from_str(s).map_err(PolicyConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PolicyConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, PolicyConfigError> {
        let config: Self = serde_json::from_str(s).map_err(PolicyConfigError::Json)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PolicyConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.skip_duration_cap_ms > self.instant_duration_cap_ms {
            errors.push(format!(
                "skip_duration_cap_ms ({}) must not exceed instant_duration_cap_ms ({})",
                self.skip_duration_cap_ms, self.instant_duration_cap_ms
            ));
        }

        if self.hurry_selector.trim().is_empty() {
            errors.push("hurry_selector must not be empty".into());
        }

        errors
    }

    #[cfg(feature = "policy-config")]
    fn validated(self) -> Result<Self, PolicyConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(PolicyConfigError::Validation(errors))
        }
    }
}

/// Errors from loading a [`DirectorConfig`].
#[derive(Debug)]
pub enum PolicyConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "policy-config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "policy-config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for PolicyConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for PolicyConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
