//! Data Transfer Objects for the HTTP API.
//!
//! Page payloads reuse the binding layer types directly since they already
//! derive Serialize/Deserialize.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use crate::bindings::{ControlEvent, PageUpdate};
pub use crate::db::DatasetSummary;
pub use crate::routes::{PageLayout, Shell};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    pub dataset: DatasetSummary,
}

/// Request body for one control event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageEventRequest {
    /// Current control state; missing fields take the page defaults.
    #[serde(default)]
    pub controls: Option<Value>,
    pub event: ControlEvent,
}
