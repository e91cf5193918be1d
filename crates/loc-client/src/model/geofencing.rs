//! Geofence collection operations.

use super::BatchItemError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `ListGeofences` input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListGeofencesRequest {
    /// Collection to list (path member).
    #[serde(skip)]
    pub collection_name: Option<String>,
    /// Page size, 1 to 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<i64>,
    /// Token from a previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// `ListGeofences` output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListGeofencesResponse {
    /// Geofences on this page.
    #[serde(default)]
    pub entries: Vec<GeofenceEntry>,
    /// Token for the next page, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// One stored geofence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeofenceEntry {
    /// Geofence identifier.
    pub geofence_id: String,
    /// Shape of the geofence.
    pub geometry: GeofenceGeometry,
    /// `ACTIVE`, `PENDING`, `FAILED`, `DELETED` or `DELETING`.
    pub status: String,
    /// Creation timestamp.
    pub create_time: DateTime<Utc>,
    /// Last update timestamp.
    pub update_time: DateTime<Utc>,
    /// User-defined metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub geofence_properties: BTreeMap<String, String>,
}

/// A polygon or a circle. Exactly one member is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeofenceGeometry {
    /// Linear rings of `[longitude, latitude]` positions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<Vec<[f64; 2]>>>,
    /// A circle around a center point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle: Option<Circle>,
}

/// Circular geofence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Circle {
    /// `[longitude, latitude]`.
    pub center: [f64; 2],
    /// Radius in meters.
    pub radius: f64,
}

/// `BatchDeleteGeofence` input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchDeleteGeofenceRequest {
    /// Collection holding the geofences (path member).
    #[serde(skip)]
    pub collection_name: Option<String>,
    /// Geofences to delete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geofence_ids: Option<Vec<String>>,
}

/// `BatchDeleteGeofence` output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchDeleteGeofenceResponse {
    /// Geofences that could not be deleted.
    #[serde(default)]
    pub errors: Vec<BatchDeleteGeofenceError>,
}

/// Failure for one geofence of a batch delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchDeleteGeofenceError {
    /// Geofence that failed.
    pub geofence_id: String,
    /// Reason.
    pub error: BatchItemError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_body_omits_path_and_unset_members() {
        let request = ListGeofencesRequest {
            collection_name: Some("fleet-A".to_string()),
            max_results: Some(50),
            next_token: None,
        };
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({"MaxResults": 50}));
    }

    #[test]
    fn test_list_response_parses_service_document() {
        let body = json!({
            "Entries": [{
                "GeofenceId": "depot",
                "Geometry": {"Circle": {"Center": [-123.1, 49.2], "Radius": 250.0}},
                "Status": "ACTIVE",
                "CreateTime": "2024-03-01T10:00:00Z",
                "UpdateTime": "2024-03-02T10:00:00.123Z",
                "GeofenceProperties": {"zone": "north"}
            }],
            "NextToken": "abc"
        });
        let response: ListGeofencesResponse = serde_json::from_value(body).unwrap();

        assert_eq!(response.next_token.as_deref(), Some("abc"));
        let entry = &response.entries[0];
        assert_eq!(entry.geofence_id, "depot");
        assert_eq!(entry.geometry.circle.unwrap().radius, 250.0);
        assert!(entry.geometry.polygon.is_none());
        assert_eq!(entry.geofence_properties["zone"], "north");
    }

    #[test]
    fn test_missing_entries_defaults_to_empty() {
        let response: ListGeofencesResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.entries.is_empty());
        assert_eq!(serde_json::to_value(&response).unwrap(), json!({"Entries": []}));
    }

    #[test]
    fn test_batch_delete_body() {
        let request = BatchDeleteGeofenceRequest {
            collection_name: Some("fleet-A".to_string()),
            geofence_ids: Some(vec!["g1".to_string(), "g2".to_string()]),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"GeofenceIds": ["g1", "g2"]})
        );
    }
}
