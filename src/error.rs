//! Error type shared by the probe library and binary.

use std::io;

use thiserror::Error;

/// Everything that can stop an experiment from producing a report.
///
/// Conditional-store failures are not errors; they are the measured signal.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The target architecture exposes no load-reserved/store-conditional pair.
    #[error("unsupported platform: `{arch}` has no load-reserved/store-conditional primitive")]
    UnsupportedPlatform {
        /// Architecture the crate was compiled for.
        arch: &'static str,
    },

    /// A configuration override could not be parsed or failed validation.
    #[error("invalid configuration {key}={value:?}: {reason}")]
    InvalidConfig {
        /// Name of the offending setting.
        key: &'static str,
        /// Raw value as supplied.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A worker thread could not be created.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),

    /// A worker thread panicked before reporting its tally.
    #[error("{worker} worker panicked")]
    WorkerPanicked {
        /// Name of the worker.
        worker: &'static str,
    },

    /// Writing the report to the output sink failed.
    #[error("report output failed: {0}")]
    Io(#[from] io::Error),

    /// Serializing the report as JSON failed.
    #[error("report serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ProbeError>;

impl ProbeError {
    pub(crate) fn invalid(key: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_platform_names_arch() {
        let err = ProbeError::UnsupportedPlatform { arch: "x86_64" };
        assert_eq!(
            err.to_string(),
            "unsupported platform: `x86_64` has no load-reserved/store-conditional primitive"
        );
    }

    #[test]
    fn invalid_config_quotes_value() {
        let err = ProbeError::invalid("LRSC_ITER", "ten", "not an integer");
        assert_eq!(
            err.to_string(),
            "invalid configuration LRSC_ITER=\"ten\": not an integer"
        );
    }
}
