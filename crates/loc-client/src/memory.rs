//! In-memory client used by tests and offline demos.
//!
//! Holds geofence collections, trackers and maps, records every request it
//! receives, and can be told to fail or stall the next calls.

use crate::client::{LocationClient, ServiceResult};
use crate::model::BatchItemError;
use crate::model::geofencing::{
    BatchDeleteGeofenceError, BatchDeleteGeofenceRequest, BatchDeleteGeofenceResponse,
    GeofenceEntry, GeofenceGeometry, ListGeofencesRequest, ListGeofencesResponse,
};
use crate::model::maps::{
    GetMapSpritesRequest, GetMapSpritesResponse, GetMapStyleDescriptorRequest,
    GetMapStyleDescriptorResponse, MapBlobResponse,
};
use crate::model::tracking::{
    AssociateTrackerConsumerRequest, AssociateTrackerConsumerResponse,
    BatchDeleteDevicePositionHistoryError, BatchDeleteDevicePositionHistoryRequest,
    BatchDeleteDevicePositionHistoryResponse,
};
use async_trait::async_trait;
use chrono::Utc;
use loc_core::ServiceError;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Default page size of `ListGeofences`.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// A request received by [`MemoryLocationClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    /// `ListGeofences`
    ListGeofences(ListGeofencesRequest),
    /// `GetMapSprites`
    GetMapSprites(GetMapSpritesRequest),
    /// `GetMapStyleDescriptor`
    GetMapStyleDescriptor(GetMapStyleDescriptorRequest),
    /// `AssociateTrackerConsumer`
    AssociateTrackerConsumer(AssociateTrackerConsumerRequest),
    /// `BatchDeleteDevicePositionHistory`
    BatchDeleteDevicePositionHistory(BatchDeleteDevicePositionHistoryRequest),
    /// `BatchDeleteGeofence`
    BatchDeleteGeofence(BatchDeleteGeofenceRequest),
}

impl RecordedRequest {
    /// Service operation name.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::ListGeofences(_) => "ListGeofences",
            Self::GetMapSprites(_) => "GetMapSprites",
            Self::GetMapStyleDescriptor(_) => "GetMapStyleDescriptor",
            Self::AssociateTrackerConsumer(_) => "AssociateTrackerConsumer",
            Self::BatchDeleteDevicePositionHistory(_) => "BatchDeleteDevicePositionHistory",
            Self::BatchDeleteGeofence(_) => "BatchDeleteGeofence",
        }
    }
}

#[derive(Debug, Default)]
struct Tracker {
    consumers: Vec<String>,
    devices: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct MapAssets {
    style: Vec<u8>,
    sprites: BTreeMap<String, Vec<u8>>,
}

#[derive(Debug, Default)]
struct State {
    collections: BTreeMap<String, Vec<GeofenceEntry>>,
    trackers: BTreeMap<String, Tracker>,
    maps: BTreeMap<String, MapAssets>,
    requests: Vec<RecordedRequest>,
    failures: Vec<ServiceError>,
}

/// A [`LocationClient`] backed by in-memory resources.
///
/// # Examples
///
/// ```
/// use loc_client::{LocationClient, MemoryLocationClient};
/// use loc_client::model::geofencing::{GeofenceGeometry, ListGeofencesRequest};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), loc_core::ServiceError> {
/// let client = MemoryLocationClient::new()
///     .with_geofence("fleet-A", "depot", GeofenceGeometry::default());
///
/// let response = client
///     .list_geofences(ListGeofencesRequest {
///         collection_name: Some("fleet-A".into()),
///         ..Default::default()
///     })
///     .await?;
/// assert_eq!(response.entries[0].geofence_id, "depot");
/// assert_eq!(client.requests().await.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryLocationClient {
    state: Mutex<State>,
    page_size: usize,
    delay: Option<Duration>,
}

impl Default for MemoryLocationClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLocationClient {
    /// Creates an empty client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size: DEFAULT_PAGE_SIZE,
            delay: None,
        }
    }

    /// Adds an empty geofence collection.
    #[must_use]
    pub fn with_collection(mut self, name: &str) -> Self {
        self.state.get_mut().collections.entry(name.to_string()).or_default();
        self
    }

    /// Adds an active geofence, creating the collection if needed.
    #[must_use]
    pub fn with_geofence(mut self, collection: &str, id: &str, geometry: GeofenceGeometry) -> Self {
        let now = Utc::now();
        self.state
            .get_mut()
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(GeofenceEntry {
                geofence_id: id.to_string(),
                geometry,
                status: "ACTIVE".to_string(),
                create_time: now,
                update_time: now,
                geofence_properties: BTreeMap::new(),
            });
        self
    }

    /// Adds a tracker with position history for `devices`.
    #[must_use]
    pub fn with_tracker(mut self, name: &str, devices: &[&str]) -> Self {
        let tracker = self.state.get_mut().trackers.entry(name.to_string()).or_default();
        tracker
            .devices
            .extend(devices.iter().map(ToString::to_string));
        self
    }

    /// Adds a map with a style descriptor and sprite files.
    #[must_use]
    pub fn with_map(mut self, name: &str, style: &[u8], sprites: &[(&str, &[u8])]) -> Self {
        self.state.get_mut().maps.insert(
            name.to_string(),
            MapAssets {
                style: style.to_vec(),
                sprites: sprites
                    .iter()
                    .map(|(file, bytes)| ((*file).to_string(), bytes.to_vec()))
                    .collect(),
            },
        );
        self
    }

    /// Limits `ListGeofences` pages to `size` entries.
    #[must_use]
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Delays every response by `delay`.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes the next call fail with `error`. Queued failures are used in
    /// order.
    pub async fn fail_next(&self, error: ServiceError) {
        self.state.lock().await.failures.push(error);
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }

    /// Consumers associated with a tracker.
    pub async fn consumers(&self, tracker: &str) -> Vec<String> {
        self.state
            .lock()
            .await
            .trackers
            .get(tracker)
            .map(|t| t.consumers.clone())
            .unwrap_or_default()
    }

    /// Geofence ids of a collection.
    pub async fn geofence_ids(&self, collection: &str) -> Vec<String> {
        self.state
            .lock()
            .await
            .collections
            .get(collection)
            .map(|entries| entries.iter().map(|e| e.geofence_id.clone()).collect())
            .unwrap_or_default()
    }

    /// Devices with position history in a tracker.
    pub async fn devices(&self, tracker: &str) -> Vec<String> {
        self.state
            .lock()
            .await
            .trackers
            .get(tracker)
            .map(|t| t.devices.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn begin(&self, request: RecordedRequest) -> ServiceResult<()> {
        debug!(operation = request.operation(), "memory client call");
        let failure = {
            let mut state = self.state.lock().await;
            state.requests.push(request);
            (!state.failures.is_empty()).then(|| state.failures.remove(0))
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        failure.map_or(Ok(()), Err)
    }
}

fn required<'a>(name: &str, value: Option<&'a str>) -> ServiceResult<&'a str> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| {
        ServiceError::remote(
            "ValidationException",
            format!("{name} is required"),
            400,
        )
    })
}

fn not_found(kind: &str, name: &str) -> ServiceError {
    ServiceError::remote(
        "ResourceNotFoundException",
        format!("{kind} '{name}' not found"),
        404,
    )
}

fn content_type(file: &str) -> &'static str {
    if file.ends_with(".png") {
        "image/png"
    } else {
        "application/json"
    }
}

#[async_trait]
impl LocationClient for MemoryLocationClient {
    async fn list_geofences(
        &self,
        request: ListGeofencesRequest,
    ) -> ServiceResult<ListGeofencesResponse> {
        self.begin(RecordedRequest::ListGeofences(request.clone()))
            .await?;

        let name = required("CollectionName", request.collection_name.as_deref())?;
        let limit = match request.max_results {
            None => self.page_size,
            Some(n @ 1..=100) => usize::try_from(n).unwrap_or(self.page_size).min(self.page_size),
            Some(n) => {
                return Err(ServiceError::remote(
                    "ValidationException",
                    format!("MaxResults must be between 1 and 100, got {n}"),
                    400,
                ));
            }
        };
        let start = match request.next_token.as_deref() {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| {
                ServiceError::remote("ValidationException", "invalid NextToken", 400)
            })?,
        };

        let state = self.state.lock().await;
        let entries = state
            .collections
            .get(name)
            .ok_or_else(|| not_found("geofence collection", name))?;

        let page: Vec<GeofenceEntry> = entries.iter().skip(start).take(limit).cloned().collect();
        let end = start + page.len();
        Ok(ListGeofencesResponse {
            entries: page,
            next_token: (end < entries.len()).then(|| end.to_string()),
        })
    }

    async fn get_map_sprites(
        &self,
        request: GetMapSpritesRequest,
    ) -> ServiceResult<GetMapSpritesResponse> {
        self.begin(RecordedRequest::GetMapSprites(request.clone()))
            .await?;

        let map = required("MapName", request.map_name.as_deref())?;
        let file = required("FileName", request.file_name.as_deref())?;
        let state = self.state.lock().await;
        let blob = state
            .maps
            .get(map)
            .ok_or_else(|| not_found("map", map))?
            .sprites
            .get(file)
            .ok_or_else(|| not_found("sprite file", file))?;

        Ok(MapBlobResponse {
            blob: blob.clone(),
            content_type: Some(content_type(file).to_string()),
            cache_control: Some("max-age=86400".to_string()),
        })
    }

    async fn get_map_style_descriptor(
        &self,
        request: GetMapStyleDescriptorRequest,
    ) -> ServiceResult<GetMapStyleDescriptorResponse> {
        self.begin(RecordedRequest::GetMapStyleDescriptor(request.clone()))
            .await?;

        let map = required("MapName", request.map_name.as_deref())?;
        let state = self.state.lock().await;
        let assets = state.maps.get(map).ok_or_else(|| not_found("map", map))?;

        Ok(MapBlobResponse {
            blob: assets.style.clone(),
            content_type: Some("application/json".to_string()),
            cache_control: Some("max-age=86400".to_string()),
        })
    }

    async fn associate_tracker_consumer(
        &self,
        request: AssociateTrackerConsumerRequest,
    ) -> ServiceResult<AssociateTrackerConsumerResponse> {
        self.begin(RecordedRequest::AssociateTrackerConsumer(request.clone()))
            .await?;

        let name = required("TrackerName", request.tracker_name.as_deref())?;
        let arn = required("ConsumerArn", request.consumer_arn.as_deref())?;
        let mut state = self.state.lock().await;
        let tracker = state
            .trackers
            .get_mut(name)
            .ok_or_else(|| not_found("tracker", name))?;

        if tracker.consumers.iter().any(|c| c == arn) {
            return Err(ServiceError::remote(
                "ConflictException",
                format!("'{arn}' is already associated with tracker '{name}'"),
                409,
            ));
        }
        tracker.consumers.push(arn.to_string());
        Ok(AssociateTrackerConsumerResponse {})
    }

    async fn batch_delete_device_position_history(
        &self,
        request: BatchDeleteDevicePositionHistoryRequest,
    ) -> ServiceResult<BatchDeleteDevicePositionHistoryResponse> {
        self.begin(RecordedRequest::BatchDeleteDevicePositionHistory(request.clone()))
            .await?;

        let name = required("TrackerName", request.tracker_name.as_deref())?;
        let mut state = self.state.lock().await;
        let tracker = state
            .trackers
            .get_mut(name)
            .ok_or_else(|| not_found("tracker", name))?;

        let errors = request
            .device_ids
            .unwrap_or_default()
            .into_iter()
            .filter(|device| !tracker.devices.remove(device))
            .map(|device| BatchDeleteDevicePositionHistoryError {
                error: BatchItemError::new(
                    "ResourceNotFoundError",
                    format!("no position history for device '{device}'"),
                ),
                device_id: device,
            })
            .collect();

        Ok(BatchDeleteDevicePositionHistoryResponse { errors })
    }

    async fn batch_delete_geofence(
        &self,
        request: BatchDeleteGeofenceRequest,
    ) -> ServiceResult<BatchDeleteGeofenceResponse> {
        self.begin(RecordedRequest::BatchDeleteGeofence(request.clone()))
            .await?;

        let name = required("CollectionName", request.collection_name.as_deref())?;
        let mut state = self.state.lock().await;
        let entries = state
            .collections
            .get_mut(name)
            .ok_or_else(|| not_found("geofence collection", name))?;

        let mut errors = Vec::new();
        for id in request.geofence_ids.unwrap_or_default() {
            match entries.iter().position(|e| e.geofence_id == id) {
                Some(index) => {
                    entries.remove(index);
                }
                None => errors.push(BatchDeleteGeofenceError {
                    error: BatchItemError::new(
                        "ResourceNotFoundError",
                        format!("geofence '{id}' not found"),
                    ),
                    geofence_id: id,
                }),
            }
        }

        Ok(BatchDeleteGeofenceResponse { errors })
    }
}
