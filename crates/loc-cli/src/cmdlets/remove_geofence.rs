//! `Remove-LOCGeofence` (`BatchDeleteGeofence`).

use loc_client::LocationClient;
use loc_client::model::geofencing::{BatchDeleteGeofenceRequest, BatchDeleteGeofenceResponse};
use loc_core::{
    Cmdlet, ConfirmImpact, ExecutionContext, ParameterDescriptor, ParameterType, Result,
    ServiceFuture,
};

static PARAMETERS: &[ParameterDescriptor] = &[
    ParameterDescriptor::new("CollectionName", ParameterType::String)
        .required()
        .position(0)
        .from_pipeline()
        .help("Geofence collection the geofences belong to."),
    ParameterDescriptor::new("GeofenceId", ParameterType::StringList)
        .required()
        .position(1)
        .aliases(&["GeofenceIds"])
        .help("Geofences to delete."),
];

fn build_request(ctx: &ExecutionContext) -> Result<BatchDeleteGeofenceRequest> {
    Ok(BatchDeleteGeofenceRequest {
        collection_name: ctx.string("CollectionName")?,
        geofence_ids: ctx.string_list("GeofenceId")?,
    })
}

fn send(
    client: &dyn LocationClient,
    request: BatchDeleteGeofenceRequest,
) -> ServiceFuture<'_, BatchDeleteGeofenceResponse> {
    client.batch_delete_geofence(request)
}

/// Deletes geofences from a collection.
pub static CMDLET: Cmdlet<dyn LocationClient, BatchDeleteGeofenceRequest, BatchDeleteGeofenceResponse> =
    Cmdlet {
        name: "Remove-LOCGeofence",
        operation: "BatchDeleteGeofence",
        synopsis: "Deletes a batch of geofences from a geofence collection.",
        parameters: PARAMETERS,
        response_fields: &["Errors"],
        default_select: "Errors",
        primary_parameter: Some("CollectionName"),
        impact: ConfirmImpact::High,
        build_request,
        send,
        pagination: None,
    };
