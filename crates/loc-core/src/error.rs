//! Error types for the cmdlet invocation pipeline.
//!
//! Every failure an invocation can produce is a variant of [`Error`]. The
//! pipeline never lets one escape: failures are captured at the invocation
//! boundary and handed back inside [`Outcome::Failed`](crate::Outcome).
//!
//! # Examples
//!
//! ```
//! use loc_core::{Error, Result};
//!
//! fn parse_selector(select: &str) -> Result<()> {
//!     if select.is_empty() {
//!         return Err(Error::ConfigError {
//!             message: "selector cannot be empty".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = parse_selector("").unwrap_err();
//! assert!(err.is_config_error());
//! ```

use crate::service::ServiceError;
use thiserror::Error;

/// Main error type for cmdlet invocations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid invocation configuration.
    ///
    /// Raised for an unknown `--select` value, a selector combined with the
    /// legacy pass-through switch, or an invalid configuration file. Always
    /// raised before any network call.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Invalid argument error.
    ///
    /// Raised when user input cannot be bound to the cmdlet's parameters:
    /// unknown flags, surplus positional values, duplicate flags.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A bound value failed coercion or validation.
    #[error("Validation error in {field}: {reason}")]
    ValidationError {
        /// The parameter that failed validation
        field: String,
        /// Detailed reason for the validation failure
        reason: String,
    },

    /// A required parameter was not supplied and the strict policy is active.
    #[error("Missing required parameter '{parameter}' for {cmdlet}")]
    MissingRequiredParameter {
        /// Cmdlet being invoked
        cmdlet: String,
        /// Name of the missing parameter
        parameter: String,
    },

    /// The remote service rejected the call or could not be reached.
    #[error("{operation} failed: {source}")]
    ServiceFailure {
        /// Service operation name, e.g. `ListGeofences`
        operation: String,
        /// Underlying service failure
        #[source]
        source: ServiceError,
    },

    /// The service endpoint host name could not be resolved.
    ///
    /// Usually caused by a wrong region or endpoint override.
    #[error(
        "Name resolution failure attempting to reach service endpoint '{host}' for {operation}; \
         check that the region '{region}' and any endpoint override are correct"
    )]
    NameResolution {
        /// Service operation name
        operation: String,
        /// Host that failed to resolve
        host: String,
        /// Region in effect for the invocation
        region: String,
        /// Original failure
        #[source]
        source: ServiceError,
    },

    /// The call did not complete within the configured timeout.
    #[error("Operation timed out after {duration_secs}s: {operation}")]
    Timeout {
        /// Name of the operation that timed out
        operation: String,
        /// Duration in seconds before timeout occurred
        duration_secs: u64,
    },

    /// The invocation was stopped through its cancellation token.
    #[error("Invocation of {operation} was cancelled")]
    Cancelled {
        /// Name of the operation that was cancelled
        operation: String,
    },

    /// The confirmation prompt could not be shown.
    #[error("Confirmation failed: {message}")]
    ConfirmationFailed {
        /// Description of the failure
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization error.
    ///
    /// Raised when a response cannot be projected into JSON.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Description of the serialization failure
        message: String,
        /// Underlying serde error
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl Error {
    /// Returns `true` if this is a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use loc_core::Error;
    ///
    /// let err = Error::ConfigError {
    ///     message: "unknown selector".to_string(),
    /// };
    /// assert!(err.is_config_error());
    /// ```
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` for any failure caused by the caller's input.
    ///
    /// Covers configuration, argument, validation and strict missing
    /// parameter errors.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigError { .. }
                | Self::InvalidArgument(_)
                | Self::ValidationError { .. }
                | Self::MissingRequiredParameter { .. }
        )
    }

    /// Returns `true` if this is a validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use loc_core::Error;
    ///
    /// let err = Error::ValidationError {
    ///     field: "MaxResult".to_string(),
    ///     reason: "must be between 1 and 100".to_string(),
    /// };
    /// assert!(err.is_validation_error());
    /// ```
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }

    /// Returns `true` if the remote service failed or could not be reached.
    #[must_use]
    pub const fn is_service_error(&self) -> bool {
        matches!(
            self,
            Self::ServiceFailure { .. } | Self::NameResolution { .. }
        )
    }

    /// Returns `true` if this is a name resolution failure.
    #[must_use]
    pub const fn is_name_resolution(&self) -> bool {
        matches!(self, Self::NameResolution { .. })
    }

    /// Returns `true` if this is a timeout error.
    ///
    /// # Examples
    ///
    /// ```
    /// use loc_core::Error;
    ///
    /// let err = Error::Timeout {
    ///     operation: "ListGeofences".to_string(),
    ///     duration_secs: 30,
    /// };
    /// assert!(err.is_timeout());
    /// ```
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if the invocation was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
