pub mod pipeline;
pub mod state;
pub mod store;
pub mod workspace;

pub use pipeline::{recompute, Views};
pub use state::{EditSession, Outcome, SessionData, SessionState, SESSION_DATA_VERSION};
pub use store::{get_snapshot_path, CacheStore, MemoryStore, Snapshot, SnapshotStore};
pub use workspace::{get_workspace_path, load_workspace, remove_workspace, save_workspace};
