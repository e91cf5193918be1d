//! Map resource operations. Both return raw bytes.

use serde::{Deserialize, Serialize};

/// `GetMapSprites` input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetMapSpritesRequest {
    /// Map resource (path member).
    pub map_name: Option<String>,
    /// Sprite file, e.g. `sprites@2x.png` (path member).
    pub file_name: Option<String>,
}

/// `GetMapStyleDescriptor` input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetMapStyleDescriptorRequest {
    /// Map resource (path member).
    pub map_name: Option<String>,
}

/// A binary map resource and its HTTP metadata.
///
/// Shared by `GetMapSprites` and `GetMapStyleDescriptor`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MapBlobResponse {
    /// Body bytes; base64 in JSON.
    #[serde(with = "super::blob")]
    pub blob: Vec<u8>,
    /// `Content-Type` of the body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// `Cache-Control` of the body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
}

/// `GetMapSprites` output.
pub type GetMapSpritesResponse = MapBlobResponse;

/// `GetMapStyleDescriptor` output.
pub type GetMapStyleDescriptorResponse = MapBlobResponse;
