//! `Add-LOCTrackerConsumer` (`AssociateTrackerConsumer`).

use loc_client::LocationClient;
use loc_client::model::tracking::{
    AssociateTrackerConsumerRequest, AssociateTrackerConsumerResponse,
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
        .help("Tracker to associate the consumer with."),
    ParameterDescriptor::new("ConsumerArn", ParameterType::String)
        .required()
        .position(1)
        .help("ARN of the geofence collection that consumes position updates."),
];

fn build_request(ctx: &ExecutionContext) -> Result<AssociateTrackerConsumerRequest> {
    Ok(AssociateTrackerConsumerRequest {
        tracker_name: ctx.string("TrackerName")?,
        consumer_arn: ctx.string("ConsumerArn")?,
    })
}

fn send(
    client: &dyn LocationClient,
    request: AssociateTrackerConsumerRequest,
) -> ServiceFuture<'_, AssociateTrackerConsumerResponse> {
    client.associate_tracker_consumer(request)
}

/// Associates a geofence collection with a tracker.
pub static CMDLET: Cmdlet<
    dyn LocationClient,
    AssociateTrackerConsumerRequest,
    AssociateTrackerConsumerResponse,
> = Cmdlet {
    name: "Add-LOCTrackerConsumer",
    operation: "AssociateTrackerConsumer",
    synopsis: "Creates an association between a geofence collection and a tracker.",
    parameters: PARAMETERS,
    response_fields: &[],
    default_select: "*",
    primary_parameter: Some("TrackerName"),
    impact: ConfirmImpact::Medium,
    build_request,
    send,
    pagination: None,
};
