//! The client trait cmdlets call.

use crate::model::geofencing::{
    BatchDeleteGeofenceRequest, BatchDeleteGeofenceResponse, ListGeofencesRequest,
    ListGeofencesResponse,
};
use crate::model::maps::{
    GetMapSpritesRequest, GetMapSpritesResponse, GetMapStyleDescriptorRequest,
    GetMapStyleDescriptorResponse,
};
use crate::model::tracking::{
    AssociateTrackerConsumerRequest, AssociateTrackerConsumerResponse,
    BatchDeleteDevicePositionHistoryRequest, BatchDeleteDevicePositionHistoryResponse,
};
use async_trait::async_trait;
use loc_core::ServiceError;

/// Result of one service call.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// One method per supported Location Service operation.
///
/// Implementations must be safe to share across tasks; each call is
/// independent and carries everything it needs in its request.
#[async_trait]
pub trait LocationClient: Send + Sync {
    /// `ListGeofences`: one page of geofences in a collection.
    async fn list_geofences(
        &self,
        request: ListGeofencesRequest,
    ) -> ServiceResult<ListGeofencesResponse>;

    /// `GetMapSprites`: a sprite sheet or its JSON index.
    async fn get_map_sprites(
        &self,
        request: GetMapSpritesRequest,
    ) -> ServiceResult<GetMapSpritesResponse>;

    /// `GetMapStyleDescriptor`: the map's style JSON.
    async fn get_map_style_descriptor(
        &self,
        request: GetMapStyleDescriptorRequest,
    ) -> ServiceResult<GetMapStyleDescriptorResponse>;

    /// `AssociateTrackerConsumer`: links a geofence collection to a tracker.
    async fn associate_tracker_consumer(
        &self,
        request: AssociateTrackerConsumerRequest,
    ) -> ServiceResult<AssociateTrackerConsumerResponse>;

    /// `BatchDeleteDevicePositionHistory`: erases stored device positions.
    async fn batch_delete_device_position_history(
        &self,
        request: BatchDeleteDevicePositionHistoryRequest,
    ) -> ServiceResult<BatchDeleteDevicePositionHistoryResponse>;

    /// `BatchDeleteGeofence`: deletes geofences from a collection.
    async fn batch_delete_geofence(
        &self,
        request: BatchDeleteGeofenceRequest,
    ) -> ServiceResult<BatchDeleteGeofenceResponse>;
}
