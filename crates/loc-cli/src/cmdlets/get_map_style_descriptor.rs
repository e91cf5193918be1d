//! `Get-LOCMapStyleDescriptor` (`GetMapStyleDescriptor`).

use loc_client::LocationClient;
use loc_client::model::maps::{GetMapStyleDescriptorRequest, GetMapStyleDescriptorResponse};
use loc_core::{
    Cmdlet, ConfirmImpact, ExecutionContext, ParameterDescriptor, ParameterType, Result,
    ServiceFuture,
};

static PARAMETERS: &[ParameterDescriptor] = &[ParameterDescriptor::new(
    "MapName",
    ParameterType::String,
)
.required()
.position(0)
.from_pipeline()
.help("Map resource whose style descriptor is fetched.")];

fn build_request(ctx: &ExecutionContext) -> Result<GetMapStyleDescriptorRequest> {
    Ok(GetMapStyleDescriptorRequest {
        map_name: ctx.string("MapName")?,
    })
}

fn send(
    client: &dyn LocationClient,
    request: GetMapStyleDescriptorRequest,
) -> ServiceFuture<'_, GetMapStyleDescriptorResponse> {
    client.get_map_style_descriptor(request)
}

/// Fetches the style descriptor of a map.
pub static CMDLET: Cmdlet<
    dyn LocationClient,
    GetMapStyleDescriptorRequest,
    GetMapStyleDescriptorResponse,
> = Cmdlet {
    name: "Get-LOCMapStyleDescriptor",
    operation: "GetMapStyleDescriptor",
    synopsis: "Retrieves the map style descriptor of a map resource.",
    parameters: PARAMETERS,
    response_fields: &["Blob", "ContentType", "CacheControl"],
    default_select: "*",
    primary_parameter: Some("MapName"),
    impact: ConfirmImpact::None,
    build_request,
    send,
    pagination: None,
};
