//! CLI-facing value types.
//!
//! # Examples
//!
//! ```
//! use loc_core::cli::{ExitCode, OutputFormat};
//!
//! let format: OutputFormat = "json".parse().unwrap();
//! assert_eq!(format.as_str(), "json");
//!
//! assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
//! assert_eq!(ExitCode::CANCELLED.as_i32(), 130);
//! ```

use crate::Error;
use std::fmt;
use std::str::FromStr;

/// How emitted output is rendered on stdout.
///
/// All formats carry the same data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Compact JSON, one document per invocation
    Json,
    /// Plain text for scripts
    Text,
    /// Indented, colored output for humans
    #[default]
    Pretty,
}

impl OutputFormat {
    /// Returns the string representation of the format.
    ///
    /// # Examples
    ///
    /// ```
    /// use loc_core::cli::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::Json.as_str(), "json");
    /// assert_eq!(OutputFormat::Pretty.as_str(), "pretty");
    /// ```
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Pretty => "pretty",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "pretty" => Ok(Self::Pretty),
            _ => Err(Error::InvalidArgument(format!(
                "invalid output format: '{s}' (expected: json, text, or pretty)"
            ))),
        }
    }
}

/// Process exit code with semantic meaning.
///
/// A declined confirmation is not a failure and exits with
/// [`ExitCode::SUCCESS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Successful execution (exit code 0).
    pub const SUCCESS: Self = Self(0);

    /// General error (exit code 1).
    pub const ERROR: Self = Self(1);

    /// Invalid input, arguments or configuration (exit code 2).
    pub const INVALID_INPUT: Self = Self(2);

    /// The service rejected the call or could not be reached (exit code 3).
    pub const SERVICE_ERROR: Self = Self(3);

    /// The call did not finish in time (exit code 4).
    pub const TIMEOUT: Self = Self(4);

    /// Interrupted by the user (exit code 130).
    pub const CANCELLED: Self = Self(130);

    /// Returns the exit code as an integer.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Picks the exit code for a failed invocation.
    ///
    /// # Examples
    ///
    /// ```
    /// use loc_core::cli::ExitCode;
    /// use loc_core::Error;
    ///
    /// let err = Error::Timeout { operation: "ListGeofences".into(), duration_secs: 5 };
    /// assert_eq!(ExitCode::for_error(&err), ExitCode::TIMEOUT);
    /// ```
    #[must_use]
    pub const fn for_error(err: &Error) -> Self {
        if err.is_cancelled() {
            Self::CANCELLED
        } else if err.is_timeout() {
            Self::TIMEOUT
        } else if err.is_service_error() {
            Self::SERVICE_ERROR
        } else if err.is_input_error() {
            Self::INVALID_INPUT
        } else {
            Self::ERROR
        }
    }

    /// Combines codes of several invocations: the first failure wins.
    #[must_use]
    pub const fn first_failure(self, other: Self) -> Self {
        if self.0 == 0 { other } else { self }
    }
}

impl Default for ExitCode {
    fn default() -> Self {
        Self::SUCCESS
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        Self::for_error(err)
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
