//! Import configuration

use estate_fields::DEFAULT_MAX_MARKUP_BYTES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Import pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// How long a parsed import waits for decisions
    pub session_ttl_secs: u64,
    /// Maximum match candidates per extracted person
    pub match_limit: usize,
    /// Largest accepted answer file
    pub max_markup_bytes: usize,
    /// Suffix marking the second principal's document fields
    pub second_principal_suffix: String,
    /// Candidates below this confidence are not suggested
    pub min_match_confidence: u8,
}

impl ImportConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With session TTL in seconds
    #[inline]
    #[must_use]
    pub fn with_session_ttl_secs(mut self, secs: u64) -> Self {
        self.session_ttl_secs = secs;
        self
    }

    /// With candidate limit
    #[inline]
    #[must_use]
    pub fn with_match_limit(mut self, limit: usize) -> Self {
        self.match_limit = limit;
        self
    }

    /// With maximum markup size
    #[inline]
    #[must_use]
    pub fn with_max_markup_bytes(mut self, max: usize) -> Self {
        self.max_markup_bytes = max;
        self
    }

    /// With second-principal field suffix
    #[inline]
    #[must_use]
    pub fn with_second_principal_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.second_principal_suffix = suffix.into();
        self
    }

    /// With minimum suggested confidence
    #[inline]
    #[must_use]
    pub fn with_min_match_confidence(mut self, confidence: u8) -> Self {
        self.min_match_confidence = confidence;
        self
    }

    /// Session TTL as a duration
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Parse from TOML text; missing keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] for invalid TOML or mistyped keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 3600,
            match_limit: 5,
            max_markup_bytes: DEFAULT_MAX_MARKUP_BYTES,
            second_principal_suffix: " SP".to_string(),
            min_match_confidence: 0,
        }
    }
}

/// Configuration loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid configuration
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}
