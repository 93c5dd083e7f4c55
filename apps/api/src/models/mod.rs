pub mod artifact;
pub mod generation;
pub mod history;

pub use artifact::ArtifactKind;
pub use generation::{GenerationRequest, GenerationResponse};
pub use history::{HistoryEntry, HistoryRow, Identity, LocalHistoryRecord};
