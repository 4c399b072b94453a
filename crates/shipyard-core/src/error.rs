//! Error types for shipyard-core

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while building a [`Context`](crate::context::Context).
#[derive(Error, Debug)]
pub enum ContextError {
    /// A selected or rejected platform token is not a known os/arch pair.
    #[error("unsupported platform '{platform}' given to --{option}")]
    UnsupportedPlatform {
        /// Token as given.
        platform: String,
        /// Option that carried it.
        option: &'static str,
    },

    /// The base directory is not usable.
    #[error("base directory {path} does not exist")]
    MissingBasedir {
        /// Directory as given.
        path: Utf8PathBuf,
    },
}

/// Result type alias using [`ContextError`].
pub type ContextResult<T> = Result<T, ContextError>;

/// Unexpected failures inside a validation stage.
///
/// The orchestrator converts these into configuration errors; they never
/// abort the remaining stages.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Filesystem access failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path being read.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A configured regular expression does not compile.
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        /// Pattern as configured.
        pattern: String,
        /// Underlying error.
        #[source]
        source: regex::Error,
    },
}

/// Result type alias using [`ValidationError`].
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors raised by workflow listeners.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// A listener refused the event.
    #[error("{0}")]
    Rejected(String),

    /// Wrapped by the dispatcher with the listener and event that failed.
    #[error("listener {listener} failed on {event}: {reason}")]
    Failed {
        /// Listener name.
        listener: String,
        /// Event being dispatched.
        event: String,
        /// Reason given by the listener.
        reason: String,
    },
}

/// Errors raised while writing the run report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Could not write the report file.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Report path.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
