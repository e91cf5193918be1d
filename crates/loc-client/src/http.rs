//! REST-JSON transport over `reqwest`.
//!
//! Requests are unsigned; credentials beyond the optional maps API key are
//! expected to be handled by a proxy or the endpoint override.

use crate::client::{LocationClient, ServiceResult};
use crate::config::{ClientConfig, ServiceKind};
use crate::model::geofencing::{
    BatchDeleteGeofenceRequest, BatchDeleteGeofenceResponse, ListGeofencesRequest,
    ListGeofencesResponse,
};
use crate::model::maps::{
    GetMapSpritesRequest, GetMapSpritesResponse, GetMapStyleDescriptorRequest,
    GetMapStyleDescriptorResponse, MapBlobResponse,
};
use crate::model::tracking::{
    AssociateTrackerConsumerRequest, AssociateTrackerConsumerResponse,
    BatchDeleteDevicePositionHistoryRequest, BatchDeleteDevicePositionHistoryResponse,
};
use async_trait::async_trait;
use loc_core::{BoxError, ServiceError};
use reqwest::header::{HeaderMap, HeaderName, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Method, Url};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error as StdError;
use tracing::{debug, trace};

const USER_AGENT: &str = concat!("loc-cmdlets/", env!("CARGO_PKG_VERSION"));

/// Talks to the Location Service REST endpoints.
#[derive(Debug)]
pub struct HttpLocationClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpLocationClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Transport`] if the HTTP client cannot be
    /// initialized.
    pub fn new(config: ClientConfig) -> ServiceResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| ServiceError::Transport {
            message: "failed to create HTTP client".to_string(),
            source: Some(Box::new(e)),
        })?;

        if let Some(profile) = &config.profile_name {
            debug!(profile = %profile, "using credential profile");
        }

        Ok(Self { http, config })
    }

    /// Creates a client on top of an existing `reqwest` client.
    ///
    /// The timeout in `config` is ignored; configure it on `http` instead.
    #[must_use]
    pub const fn with_http(config: ClientConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    /// Settings in use.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds the URL for `segments` below the service's base URL.
    ///
    /// Each segment is percent-encoded on its own, so names containing `/`
    /// stay a single path segment.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidRequest`] if no endpoint can be derived.
    pub fn url(&self, service: ServiceKind, segments: &[&str]) -> ServiceResult<Url> {
        let base = self.config.base_url(service)?;
        let mut url = Url::parse(&base).map_err(|e| ServiceError::InvalidRequest {
            message: format!("invalid endpoint URL '{base}': {e}"),
        })?;

        url.path_segments_mut()
            .map_err(|()| ServiceError::InvalidRequest {
                message: format!("endpoint URL '{base}' cannot carry a path"),
            })?
            .pop_if_empty()
            .push(service.as_str())
            .push("v0")
            .extend(segments);

        if service == ServiceKind::Maps {
            if let Some(key) = &self.config.api_key {
                url.query_pairs_mut().append_pair("key", key.expose_secret());
            }
        }

        Ok(url)
    }

    async fn execute(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> ServiceResult<reqwest::Response> {
        let host = url.host_str().unwrap_or_default().to_string();
        debug!(%method, host = %host, path = url.path(), "sending HTTP request");

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, &host))?;

        let status = response.status();
        trace!(status = status.as_u16(), "HTTP response");
        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let body = response.bytes().await.unwrap_or_default();
        Err(parse_error(status.as_u16(), &headers, &body))
    }

    async fn call_json<B, R>(&self, method: Method, url: Url, body: &B) -> ServiceResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let body = serde_json::to_vec(body).map_err(|e| ServiceError::InvalidRequest {
            message: format!("failed to encode request body: {e}"),
        })?;
        let response = self.execute(method, url, Some(body)).await?;
        let bytes = response.bytes().await.map_err(|e| ServiceError::Transport {
            message: "failed to read response body".to_string(),
            source: Some(Box::new(e)),
        })?;
        decode(&bytes)
    }

    async fn call_blob(&self, url: Url) -> ServiceResult<MapBlobResponse> {
        let response = self.execute(Method::GET, url, None).await?;
        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        let content_type = header(CONTENT_TYPE);
        let cache_control = header(CACHE_CONTROL);
        let blob = response.bytes().await.map_err(|e| ServiceError::Transport {
            message: "failed to read response body".to_string(),
            source: Some(Box::new(e)),
        })?;

        Ok(MapBlobResponse {
            blob: blob.to_vec(),
            content_type,
            cache_control,
        })
    }
}

#[async_trait]
impl LocationClient for HttpLocationClient {
    async fn list_geofences(
        &self,
        request: ListGeofencesRequest,
    ) -> ServiceResult<ListGeofencesResponse> {
        let collection = path_member("CollectionName", request.collection_name.as_deref())?;
        let url = self.url(
            ServiceKind::Geofencing,
            &["collections", collection, "list-geofences"],
        )?;
        self.call_json(Method::POST, url, &request).await
    }

    async fn get_map_sprites(
        &self,
        request: GetMapSpritesRequest,
    ) -> ServiceResult<GetMapSpritesResponse> {
        let map = path_member("MapName", request.map_name.as_deref())?;
        let file = path_member("FileName", request.file_name.as_deref())?;
        let url = self.url(ServiceKind::Maps, &["maps", map, "sprites", file])?;
        self.call_blob(url).await
    }

    async fn get_map_style_descriptor(
        &self,
        request: GetMapStyleDescriptorRequest,
    ) -> ServiceResult<GetMapStyleDescriptorResponse> {
        let map = path_member("MapName", request.map_name.as_deref())?;
        let url = self.url(ServiceKind::Maps, &["maps", map, "style-descriptor"])?;
        self.call_blob(url).await
    }

    async fn associate_tracker_consumer(
        &self,
        request: AssociateTrackerConsumerRequest,
    ) -> ServiceResult<AssociateTrackerConsumerResponse> {
        let tracker = path_member("TrackerName", request.tracker_name.as_deref())?;
        let url = self.url(ServiceKind::Tracking, &["trackers", tracker, "consumers"])?;
        self.call_json(Method::POST, url, &request).await
    }

    async fn batch_delete_device_position_history(
        &self,
        request: BatchDeleteDevicePositionHistoryRequest,
    ) -> ServiceResult<BatchDeleteDevicePositionHistoryResponse> {
        let tracker = path_member("TrackerName", request.tracker_name.as_deref())?;
        let url = self.url(
            ServiceKind::Tracking,
            &["trackers", tracker, "delete-positions"],
        )?;
        self.call_json(Method::POST, url, &request).await
    }

    async fn batch_delete_geofence(
        &self,
        request: BatchDeleteGeofenceRequest,
    ) -> ServiceResult<BatchDeleteGeofenceResponse> {
        let collection = path_member("CollectionName", request.collection_name.as_deref())?;
        let url = self.url(
            ServiceKind::Geofencing,
            &["collections", collection, "delete-geofences"],
        )?;
        self.call_json(Method::POST, url, &request).await
    }
}

/// Path members cannot be sent unset.
fn path_member<'a>(name: &str, value: Option<&'a str>) -> ServiceResult<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::InvalidRequest {
            message: format!("{name} is required to build the request URL"),
        })
}

fn decode<R: DeserializeOwned>(bytes: &[u8]) -> ServiceResult<R> {
    let bytes = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        bytes
    };
    serde_json::from_slice(bytes).map_err(|e| ServiceError::InvalidResponse {
        message: format!("failed to decode response body: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Maps an error document to [`ServiceError::Remote`].
///
/// The code comes from the `x-amzn-ErrorType` header, then the body's
/// `__type` or `code`. Namespaces and trailing URIs are stripped.
#[must_use]
pub fn parse_error(status: u16, headers: &HeaderMap, body: &[u8]) -> ServiceError {
    let document: serde_json::Value = serde_json::from_slice(body).unwrap_or_default();
    let field = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| document.get(*name).and_then(|v| v.as_str()))
            .map(ToString::to_string)
    };

    let code = headers
        .get("x-amzn-errortype")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
        .or_else(|| field(&["__type", "code", "Code"]))
        .map_or_else(|| format!("HttpStatus{status}"), |raw| sanitize_code(&raw));

    let message = field(&["message", "Message"]).unwrap_or_else(|| {
        String::from_utf8_lossy(body).trim().chars().take(256).collect::<String>()
    });

    let request_id = headers
        .get("x-amzn-requestid")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    ServiceError::Remote {
        code,
        message,
        status,
        request_id,
    }
}

fn sanitize_code(raw: &str) -> String {
    let code = raw.split(':').next().unwrap_or(raw);
    let code = code.rsplit('#').next().unwrap_or(code);
    code.trim().to_string()
}

fn transport_error(err: reqwest::Error, host: &str) -> ServiceError {
    if is_name_resolution(&err) {
        return ServiceError::NameResolution {
            host: host.to_string(),
            source: Box::new(err),
        };
    }
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("could not connect to '{host}'")
    } else {
        err.to_string()
    };
    ServiceError::Transport {
        message,
        source: Some(Box::new(err) as BoxError),
    }
}

/// Returns `true` if any error in the chain is a DNS lookup failure.
pub(crate) fn is_name_resolution(err: &(dyn StdError + 'static)) -> bool {
    const MARKERS: [&str; 5] = [
        "dns error",
        "failed to lookup address",
        "name or service not known",
        "no such host",
        "nodename nor servname",
    ];

    let mut current = Some(err);
    while let Some(e) = current {
        let text = e.to_string().to_ascii_lowercase();
        if MARKERS.iter().any(|marker| text.contains(marker)) {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use std::fmt;

    fn client(config: ClientConfig) -> HttpLocationClient {
        HttpLocationClient::new(config).unwrap()
    }

    fn regional() -> ClientConfig {
        ClientConfig {
            region: Some("eu-central-1".to_string()),
            ..ClientConfig::default()
        }
    }

    #[test]
    fn test_url_for_geofencing() {
        let url = client(regional())
            .url(ServiceKind::Geofencing, &["collections", "fleet-A", "list-geofences"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://geofencing.geo.eu-central-1.amazonaws.com/geofencing/v0/collections/fleet-A/list-geofences"
        );
    }

    #[test]
    fn test_path_members_are_percent_encoded() {
        let url = client(regional())
            .url(ServiceKind::Maps, &["maps", "my map", "sprites", "a/b.png"])
            .unwrap();
        assert_eq!(url.path(), "/maps/v0/maps/my%20map/sprites/a%2Fb.png");
    }

    #[test]
    fn test_api_key_only_on_maps() {
        let config = regional().with_api_key("v1.public.secret");
        let client = client(config);

        let maps = client
            .url(ServiceKind::Maps, &["maps", "m", "style-descriptor"])
            .unwrap();
        assert_eq!(maps.query(), Some("key=v1.public.secret"));

        let tracking = client
            .url(ServiceKind::Tracking, &["trackers", "t", "consumers"])
            .unwrap();
        assert_eq!(tracking.query(), None);
    }

    #[test]
    fn test_endpoint_override_with_path() {
        let config = ClientConfig {
            endpoint_url: Some("http://127.0.0.1:9000/proxy/".to_string()),
            ..ClientConfig::default()
        };
        let url = client(config)
            .url(ServiceKind::Tracking, &["trackers", "t", "consumers"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9000/proxy/tracking/v0/trackers/t/consumers"
        );
    }

    #[test]
    fn test_missing_path_member() {
        let err = path_member("CollectionName", None).unwrap_err();
        assert!(err.to_string().contains("CollectionName"));
        assert!(path_member("CollectionName", Some("")).is_err());
        assert_eq!(path_member("CollectionName", Some("x")).unwrap(), "x");
    }

    #[test]
    fn test_parse_error_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-amzn-errortype",
            HeaderValue::from_static("ResourceNotFoundException:http://internal.amazon.com/"),
        );
        headers.insert("x-amzn-requestid", HeaderValue::from_static("req-1"));
        let err = parse_error(404, &headers, br#"{"message":"collection fleet-A not found"}"#);

        match err {
            ServiceError::Remote {
                code,
                message,
                status,
                request_id,
            } => {
                assert_eq!(code, "ResourceNotFoundException");
                assert_eq!(message, "collection fleet-A not found");
                assert_eq!(status, 404);
                assert_eq!(request_id.as_deref(), Some("req-1"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_from_body_type() {
        let err = parse_error(
            400,
            &HeaderMap::new(),
            br#"{"__type":"com.amazonaws.geo#ValidationException","Message":"bad MaxResults"}"#,
        );
        assert_eq!(err.code(), Some("ValidationException"));
        assert!(err.to_string().contains("bad MaxResults"));
    }

    #[test]
    fn test_parse_error_without_document() {
        let err = parse_error(502, &HeaderMap::new(), b"Bad Gateway");
        assert_eq!(err.code(), Some("HttpStatus502"));
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn test_decode_empty_body() {
        let response: AssociateTrackerConsumerResponse = decode(b"").unwrap();
        assert_eq!(response, AssociateTrackerConsumerResponse {});
        let err = decode::<ListGeofencesResponse>(b"not json").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse { .. }));
    }

    #[derive(Debug)]
    struct Chain(&'static str, Option<Box<Chain>>);

    impl fmt::Display for Chain {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl StdError for Chain {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.1.as_deref().map(|c| c as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn test_name_resolution_detected_in_chain() {
        let err = Chain(
            "error sending request",
            Some(Box::new(Chain(
                "client error (Connect)",
                Some(Box::new(Chain("dns error: failed to lookup address information", None))),
            ))),
        );
        assert!(is_name_resolution(&err));

        let refused = Chain("error sending request", Some(Box::new(Chain("connection refused", None))));
        assert!(!is_name_resolution(&refused));
    }
}
