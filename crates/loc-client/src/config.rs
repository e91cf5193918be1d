//! Endpoint and transport settings.

use loc_core::{ClientContext, ServiceError};
use secrecy::SecretString;
use std::fmt;
use std::time::Duration;

/// Service family an operation belongs to; each has its own host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Map resources.
    Maps,
    /// Geofence collections.
    Geofencing,
    /// Trackers.
    Tracking,
}

impl ServiceKind {
    /// Host label and path prefix, e.g. `geofencing`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Maps => "maps",
            Self::Geofencing => "geofencing",
            Self::Tracking => "tracking",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for [`crate::HttpLocationClient`].
#[derive(Debug, Default)]
pub struct ClientConfig {
    /// Region, e.g. `eu-west-1`.
    pub region: Option<String>,
    /// Replaces the regional endpoint for every service family.
    pub endpoint_url: Option<String>,
    /// Named credential profile.
    pub profile_name: Option<String>,
    /// API key sent with map requests.
    pub api_key: Option<SecretString>,
    /// Per-request transport timeout.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Builds settings from an invocation's client context.
    #[must_use]
    pub fn from_context(context: &ClientContext) -> Self {
        Self {
            region: context.region.clone(),
            endpoint_url: context.endpoint_url.clone(),
            profile_name: context.profile_name.clone(),
            ..Self::default()
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Sets the transport timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Base URL for a service family.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidRequest`] if neither an endpoint
    /// override nor a region is configured.
    ///
    /// # Examples
    ///
    /// ```
    /// use loc_client::{ClientConfig, ServiceKind};
    ///
    /// let config = ClientConfig {
    ///     region: Some("eu-west-1".into()),
    ///     ..ClientConfig::default()
    /// };
    /// assert_eq!(
    ///     config.base_url(ServiceKind::Geofencing)?,
    ///     "https://geofencing.geo.eu-west-1.amazonaws.com"
    /// );
    /// # Ok::<(), loc_core::ServiceError>(())
    /// ```
    pub fn base_url(&self, service: ServiceKind) -> Result<String, ServiceError> {
        if let Some(endpoint) = self.endpoint_url.as_deref().filter(|e| !e.trim().is_empty()) {
            return Ok(endpoint.trim_end_matches('/').to_string());
        }

        let region = self
            .region
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| ServiceError::InvalidRequest {
                message: "no region configured; pass --region or set AWS_REGION".to_string(),
            })?;

        Ok(format!("https://{service}.geo.{region}.amazonaws.com"))
    }
}
