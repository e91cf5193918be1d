//! Location Service client.
//!
//! Provides the [`LocationClient`] trait the cmdlets call, the request and
//! response models of the supported operations, an HTTP implementation
//! speaking the service's REST-JSON protocol and an in-memory
//! implementation for tests.
//!
//! # Examples
//!
//! ```no_run
//! use loc_client::{ClientConfig, HttpLocationClient, LocationClient};
//! use loc_client::model::geofencing::ListGeofencesRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpLocationClient::new(ClientConfig {
//!     region: Some("eu-west-1".into()),
//!     ..ClientConfig::default()
//! })?;
//!
//! let page = client
//!     .list_geofences(ListGeofencesRequest {
//!         collection_name: Some("fleet-A".into()),
//!         max_results: Some(50),
//!         next_token: None,
//!     })
//!     .await?;
//! println!("{} geofences", page.entries.len());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod client;
mod config;
mod http;
mod memory;

pub mod model;

pub use client::{LocationClient, ServiceResult};
pub use config::{ClientConfig, ServiceKind};
pub use http::{parse_error, HttpLocationClient};
pub use memory::{MemoryLocationClient, RecordedRequest, DEFAULT_PAGE_SIZE};
