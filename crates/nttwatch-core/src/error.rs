//! Error types for the watcher pipeline.

use thiserror::Error;

/// Errors that can occur while watching a chain.
#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Rate limited by {chain} provider")]
    RateLimited { chain: String },

    #[error("No resume point for {chain} on {network} ({mode} watcher)")]
    ConfigurationGap {
        network: String,
        chain: String,
        mode: String,
    },

    #[error("Invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Watcher aborted: {reason}")]
    Aborted { reason: String },

    #[error("{0}")]
    Other(String),
}

impl WatcherError {
    /// Returns `true` for timeouts, rate limits, and RPC/store failures,
    /// which the watcher retries with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Rpc(_) | Self::Storage(_) | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }

    pub(crate) fn invalid_key(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(WatcherError::Timeout { ms: 10 }.is_transient());
        assert!(WatcherError::Rpc("connection reset".into()).is_transient());
        assert!(WatcherError::RateLimited { chain: "solana".into() }.is_transient());
        assert!(!WatcherError::Config("missing chain".into()).is_transient());
        assert!(!WatcherError::invalid_key("x", "bad").is_transient());
    }
}
