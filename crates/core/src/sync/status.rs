use serde::{Deserialize, Serialize};

use super::transport::{SavedDocument, SyncError};

/// Save indicator shown to the editor user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    /// Transient; reverts to `Idle` after the display window.
    Saved,
    /// Sticky until the next save attempt.
    Error,
}

/// How a single save attempt ended.
#[derive(Debug)]
pub enum SaveOutcome {
    Saved(SavedDocument),
    /// Superseded by a newer save, or the synchronizer shut down.
    /// Not an error.
    Cancelled,
    Failed(SyncError),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SaveOutcome::Cancelled)
    }
}
