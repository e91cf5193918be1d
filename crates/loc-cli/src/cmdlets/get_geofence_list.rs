//! `Get-LOCGeofenceList` (`ListGeofences`).

use loc_client::LocationClient;
use loc_client::model::geofencing::{ListGeofencesRequest, ListGeofencesResponse};
use loc_core::{
    Cmdlet, ConfirmImpact, ExecutionContext, Pagination, ParameterDescriptor, ParameterType,
    Result, ServiceFuture,
};

static PARAMETERS: &[ParameterDescriptor] = &[
    ParameterDescriptor::new("CollectionName", ParameterType::String)
        .required()
        .position(0)
        .from_pipeline()
        .help("Name of the geofence collection to list."),
    ParameterDescriptor::new("MaxResult", ParameterType::Integer)
        .aliases(&["MaxItems", "MaxResults"])
        .range(1, 100)
        .help("Maximum number of geofences returned per page."),
    ParameterDescriptor::new("NextToken", ParameterType::String)
        .help("Token of the page to start from. Disables automatic paging."),
];

fn build_request(ctx: &ExecutionContext) -> Result<ListGeofencesRequest> {
    Ok(ListGeofencesRequest {
        collection_name: ctx.string("CollectionName")?,
        max_results: ctx.integer("MaxResult")?,
        next_token: ctx.string("NextToken")?,
    })
}

fn send(
    client: &dyn LocationClient,
    request: ListGeofencesRequest,
) -> ServiceFuture<'_, ListGeofencesResponse> {
    client.list_geofences(request)
}

fn set_token(request: &mut ListGeofencesRequest, token: String) {
    request.next_token = Some(token);
}

fn next_token(response: &ListGeofencesResponse) -> Option<String> {
    response.next_token.clone()
}

fn merge(acc: &mut ListGeofencesResponse, page: ListGeofencesResponse) {
    acc.entries.extend(page.entries);
    acc.next_token = page.next_token;
}

/// Lists the geofences stored in a collection.
pub static CMDLET: Cmdlet<dyn LocationClient, ListGeofencesRequest, ListGeofencesResponse> =
    Cmdlet {
        name: "Get-LOCGeofenceList",
        operation: "ListGeofences",
        synopsis: "Lists geofences stored in a given geofence collection.",
        parameters: PARAMETERS,
        response_fields: &["Entries", "NextToken"],
        default_select: "Entries",
        primary_parameter: Some("CollectionName"),
        impact: ConfirmImpact::None,
        build_request,
        send,
        pagination: Some(Pagination {
            token_parameter: "NextToken",
            set_token,
            next_token,
            merge,
        }),
    };
