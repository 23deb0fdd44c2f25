use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sync::status::SaveStatus;

/// Events emitted by the editor and the autosave synchronizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// The current document changed (edit, undo, redo or load).
    DocumentChanged { revision: u64 },
    SaveStatusChanged { status: SaveStatus },
    Saved(SaveEvent),
    SaveFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEvent {
    /// Editor revision the write was taken from.
    pub revision: u64,
    /// `updatedAt` reported by the storage endpoint.
    pub updated_at: String,
    pub timestamp: DateTime<Utc>,
}
