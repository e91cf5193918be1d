//! `Remove-LOCDevicePositionHistory` (`BatchDeleteDevicePositionHistory`).

use loc_client::LocationClient;
use loc_client::model::tracking::{
    BatchDeleteDevicePositionHistoryRequest, BatchDeleteDevicePositionHistoryResponse,
};
use loc_core::{
    Cmdlet, ConfirmImpact, ExecutionContext, ParameterDescriptor, ParameterType, Result,
    ServiceFuture,
};

static PARAMETERS: &[ParameterDescriptor] = &[
    ParameterDescriptor::new("TrackerName", ParameterType::String)
        .required()
        .position(0)
        .from_pipeline()
        .help("Tracker holding the position history."),
    ParameterDescriptor::new("DeviceId", ParameterType::StringList)
        .required()
        .position(1)
        .aliases(&["DeviceIds"])
        .help("Devices whose position history is deleted."),
];

fn build_request(ctx: &ExecutionContext) -> Result<BatchDeleteDevicePositionHistoryRequest> {
    Ok(BatchDeleteDevicePositionHistoryRequest {
        tracker_name: ctx.string("TrackerName")?,
        device_ids: ctx.string_list("DeviceId")?,
    })
}

fn send(
    client: &dyn LocationClient,
    request: BatchDeleteDevicePositionHistoryRequest,
) -> ServiceFuture<'_, BatchDeleteDevicePositionHistoryResponse> {
    client.batch_delete_device_position_history(request)
}

/// Deletes the position history of devices.
pub static CMDLET: Cmdlet<
    dyn LocationClient,
    BatchDeleteDevicePositionHistoryRequest,
    BatchDeleteDevicePositionHistoryResponse,
> = Cmdlet {
    name: "Remove-LOCDevicePositionHistory",
    operation: "BatchDeleteDevicePositionHistory",
    synopsis: "Deletes the position history of one or more devices from a tracker.",
    parameters: PARAMETERS,
    response_fields: &["Errors"],
    default_select: "Errors",
    primary_parameter: Some("TrackerName"),
    impact: ConfirmImpact::High,
    build_request,
    send,
    pagination: None,
};
