pub mod engine;
pub mod history;
pub mod types;

pub use engine::{Editor, SharedEditor};
pub use history::{History, HISTORY_LIMIT};
pub use types::{Mutation, MutationOutcome, SectionPatch};
