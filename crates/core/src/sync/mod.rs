pub mod autosave;
pub mod status;
pub mod transport;

pub use autosave::{Autosave, AutosaveConfig};
pub use status::{SaveOutcome, SaveStatus};
pub use transport::{HttpTransport, MemoryTransport, SaveTransport, SavedDocument, SyncError};
