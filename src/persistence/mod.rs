//! Progress persistence
//!
//! The snapshot is stored as one opaque JSON blob behind a `BlobStore`.
//! Loading never fails outward: a missing, unreadable or malformed blob
//! yields the default snapshot.

mod store;

#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;
#[cfg(target_arch = "wasm32")]
pub use store::LocalStorageStore;
pub use store::MemoryStore;

use crate::progress::ProgressSnapshot;
use crate::progress::rules::reconcile_derived;

/// Errors at the storage boundary
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to encode progress: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode progress: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("stored progress has an unexpected shape: {0}")]
    Shape(String),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Byte-level storage for the single progress blob
pub trait BlobStore {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<Vec<u8>>, PersistError>;

    fn save(&mut self, bytes: &[u8]) -> Result<(), PersistError>;
}

pub fn encode(snapshot: &ProgressSnapshot) -> Result<Vec<u8>, PersistError> {
    serde_json::to_vec(snapshot).map_err(PersistError::Encode)
}

/// Parse a blob and check it matches the fixed catalogue layout.
///
/// Counters and milestone fields are rebuilt from the levels; a blob that
/// still breaks an invariant afterwards is rejected.
pub fn decode(bytes: &[u8]) -> Result<ProgressSnapshot, PersistError> {
    let mut snapshot: ProgressSnapshot =
        serde_json::from_slice(bytes).map_err(PersistError::Decode)?;
    snapshot.check_shape().map_err(PersistError::Shape)?;
    if reconcile_derived(&mut snapshot) {
        log::warn!("Saved progress counters disagreed with its levels, rebuilt them");
    }
    if let Some(violation) = snapshot.invariant_violation() {
        return Err(PersistError::Shape(violation));
    }
    Ok(snapshot)
}

/// Load the saved snapshot, falling back to a fresh one
pub fn load_snapshot(store: &impl BlobStore) -> ProgressSnapshot {
    match store.load() {
        Ok(Some(bytes)) => match decode(&bytes) {
            Ok(snapshot) => {
                log::info!(
                    "Loaded progress ({} levels completed)",
                    snapshot.total_levels_completed
                );
                snapshot
            }
            Err(e) => {
                log::warn!("Discarding saved progress: {e}");
                ProgressSnapshot::default()
            }
        },
        Ok(None) => {
            log::info!("No saved progress found, starting fresh");
            ProgressSnapshot::default()
        }
        Err(e) => {
            log::warn!("Could not read saved progress: {e}");
            ProgressSnapshot::default()
        }
    }
}

pub fn save_snapshot(
    store: &mut impl BlobStore,
    snapshot: &ProgressSnapshot,
) -> Result<(), PersistError> {
    let bytes = encode(snapshot)?;
    store.save(&bytes)?;
    log::debug!("Progress saved ({} bytes)", bytes.len());
    Ok(())
}
