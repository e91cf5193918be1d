//! `Get-LOCMapSprite` (`GetMapSprites`).

use loc_client::LocationClient;
use loc_client::model::maps::{GetMapSpritesRequest, GetMapSpritesResponse};
use loc_core::{
    Cmdlet, ConfirmImpact, ExecutionContext, ParameterDescriptor, ParameterType, Result,
    ServiceFuture,
};

static PARAMETERS: &[ParameterDescriptor] = &[
    ParameterDescriptor::new("MapName", ParameterType::String)
        .required()
        .position(0)
        .from_pipeline()
        .help("Map resource to fetch the sprite from."),
    ParameterDescriptor::new("FileName", ParameterType::String)
        .required()
        .position(1)
        .help("Sprite file name, e.g. sprites@2x.png or sprites.json."),
];

fn build_request(ctx: &ExecutionContext) -> Result<GetMapSpritesRequest> {
    Ok(GetMapSpritesRequest {
        map_name: ctx.string("MapName")?,
        file_name: ctx.string("FileName")?,
    })
}

fn send(
    client: &dyn LocationClient,
    request: GetMapSpritesRequest,
) -> ServiceFuture<'_, GetMapSpritesResponse> {
    client.get_map_sprites(request)
}

/// Fetches a sprite sheet or its JSON offsets.
pub static CMDLET: Cmdlet<dyn LocationClient, GetMapSpritesRequest, GetMapSpritesResponse> =
    Cmdlet {
        name: "Get-LOCMapSprite",
        operation: "GetMapSprites",
        synopsis: "Retrieves the sprite sheet or sprite offsets of a map resource.",
        parameters: PARAMETERS,
        response_fields: &["Blob", "ContentType", "CacheControl"],
        default_select: "*",
        primary_parameter: Some("MapName"),
        impact: ConfirmImpact::None,
        build_request,
        send,
        pagination: None,
    };
