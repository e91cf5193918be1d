//! Tracker operations.

use super::BatchItemError;
use serde::{Deserialize, Serialize};

/// `AssociateTrackerConsumer` input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssociateTrackerConsumerRequest {
    /// Tracker resource (path member).
    #[serde(skip)]
    pub tracker_name: Option<String>,
    /// ARN of the geofence collection that consumes tracker positions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_arn: Option<String>,
}

/// `AssociateTrackerConsumer` output. The service returns no members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociateTrackerConsumerResponse {}

/// `BatchDeleteDevicePositionHistory` input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchDeleteDevicePositionHistoryRequest {
    /// Tracker resource (path member).
    #[serde(skip)]
    pub tracker_name: Option<String>,
    /// Devices whose history is deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_ids: Option<Vec<String>>,
}

/// `BatchDeleteDevicePositionHistory` output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchDeleteDevicePositionHistoryResponse {
    /// Devices whose history could not be deleted.
    #[serde(default)]
    pub errors: Vec<BatchDeleteDevicePositionHistoryError>,
}

/// Failure for one device of a batch delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchDeleteDevicePositionHistoryError {
    /// Device that failed.
    pub device_id: String,
    /// Reason.
    pub error: BatchItemError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_associate_body() {
        let request = AssociateTrackerConsumerRequest {
            tracker_name: Some("delivery".to_string()),
            consumer_arn: Some("arn:aws:geo:eu-west-1:123456789012:geofence-collection/fleet-A".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"ConsumerArn": "arn:aws:geo:eu-west-1:123456789012:geofence-collection/fleet-A"})
        );
    }

    #[test]
    fn test_empty_response_is_an_empty_object() {
        let response: AssociateTrackerConsumerResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(serde_json::to_value(response).unwrap(), json!({}));
    }

    #[test]
    fn test_batch_delete_errors() {
        let body = json!({"Errors": [{"DeviceId": "truck-7", "Error": {"Code": "ResourceNotFoundError"}}]});
        let response: BatchDeleteDevicePositionHistoryResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.errors[0].device_id, "truck-7");
        assert_eq!(response.errors[0].error.code.as_deref(), Some("ResourceNotFoundError"));
    }
}
