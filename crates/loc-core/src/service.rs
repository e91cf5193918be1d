//! Contract with the remote service client.
//!
//! The pipeline does not know how requests travel over the wire. A cmdlet's
//! send function hands back a [`ServiceFuture`] and failures come back as a
//! [`ServiceError`], which the pipeline inspects to pick a diagnostic.

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed error used as the cause of transport-level failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Future returned by a cmdlet's send function.
///
/// Matches the shape produced by `#[async_trait]` methods so client trait
/// methods can be returned directly.
pub type ServiceFuture<'a, T> =
    Pin<Box<dyn Future<Output = std::result::Result<T, ServiceError>> + Send + 'a>>;

/// Failure reported by a service client.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The endpoint host name could not be resolved.
    #[error("could not resolve host '{host}'")]
    NameResolution {
        /// Host that failed to resolve
        host: String,
        /// Underlying resolver error
        #[source]
        source: BoxError,
    },

    /// The service answered with an error document.
    #[error("{code} (HTTP {status}): {message}")]
    Remote {
        /// Service error code, e.g. `ResourceNotFoundException`
        code: String,
        /// Human-readable message from the service
        message: String,
        /// HTTP status code
        status: u16,
        /// Request id assigned by the service, if any
        request_id: Option<String>,
    },

    /// The request could not be delivered.
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the failure
        message: String,
        /// Underlying error
        #[source]
        source: Option<BoxError>,
    },

    /// The request was rejected by the client before it was sent.
    ///
    /// Raised for missing path parameters and missing endpoint settings.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// What is wrong with the request
        message: String,
    },

    /// The service answered with a body that could not be decoded.
    #[error("invalid service response: {message}")]
    InvalidResponse {
        /// Description of the failure
        message: String,
        /// Underlying error
        #[source]
        source: Option<BoxError>,
    },
}

impl ServiceError {
    /// Builds a remote error without a request id.
    ///
    /// # Examples
    ///
    /// ```
    /// use loc_core::ServiceError;
    ///
    /// let err = ServiceError::remote("ResourceNotFoundException", "collection not found", 404);
    /// assert_eq!(err.code(), Some("ResourceNotFoundException"));
    /// ```
    #[must_use]
    pub fn remote(code: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
        Self::Remote {
            code: code.into(),
            message: message.into(),
            status,
            request_id: None,
        }
    }

    /// Returns the service error code for remote errors.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Remote { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Returns the unresolved host for name resolution failures.
    #[must_use]
    pub fn unresolved_host(&self) -> Option<&str> {
        match self {
            Self::NameResolution { host, .. } => Some(host),
            _ => None,
        }
    }
}
