pub mod loader;
pub mod store;

pub use loader::{load_snapshot, LoadedSnapshot};
pub use store::{DimensionEvidence, EvidenceStore};
