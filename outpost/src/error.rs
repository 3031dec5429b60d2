//! Error types for the worker lifecycle and configuration.

use outpost_store::{PopulationError, StoreError};
use thiserror::Error;

use crate::lifecycle::WorkerState;

/// Error raised by lifecycle phases.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Store operation failed.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The critical asset list could not be stored. The version did not install.
    #[error("installation failed: {0}")]
    Population(#[from] PopulationError),

    /// The phase was requested from a state that does not allow it.
    #[error("cannot leave state {actual:?}, expected {expected:?}")]
    InvalidState {
        /// State the phase starts from.
        expected: WorkerState,
        /// State the worker was in.
        actual: WorkerState,
    },
}

/// Error raised while loading or validating a [`WorkerConfig`](crate::WorkerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_saphyr::Error),

    /// A path or URL in the configuration could not be resolved.
    #[error("invalid URL {value:?}")]
    InvalidUrl {
        /// Offending value.
        value: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },

    /// Configuration is syntactically valid but unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
