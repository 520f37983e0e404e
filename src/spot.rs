//! Persisted spot records as authored by the external store.
//!
//! A spot row is read-only from the viewer's side: processing-status
//! transitions are driven by the importer pipeline, never originated here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ViewerResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }

    /// Only a completed spot has payloads worth fetching.
    pub fn is_ready(&self) -> bool {
        matches!(self, ProcessingStatus::Completed)
    }
}

/// The subset of the store row the viewer consumes. Timestamps are opaque
/// strings; `settings` stays raw until normalized at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub settings: Value,
    pub status: ProcessingStatus,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub tree_locator: Option<String>,
    #[serde(default)]
    pub strategy_locator: Option<String>,
}

impl SpotRecord {
    pub fn from_json(bytes: &[u8]) -> ViewerResult<SpotRecord> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
