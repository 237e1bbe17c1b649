//! Error types for person matching

use estate_model::StoreError;

/// Failures while matching extracted people against the registry
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// Registry lookup failed
    #[error("registry lookup failed for '{name}': {source}")]
    Registry {
        /// Extracted name being matched
        name: String,
        #[source]
        source: StoreError,
    },
}

impl MatchError {
    /// Create registry error for a name
    pub fn registry(name: impl Into<String>, source: StoreError) -> Self {
        Self::Registry {
            name: name.into(),
            source,
        }
    }

    /// Check if retrying the lookup may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Registry { source, .. } => source.is_retryable(),
        }
    }
}
