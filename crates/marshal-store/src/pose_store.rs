//! Single-slot store for the most recent pose.

use std::sync::{Mutex, PoisonError};

use marshal_types::Pose;

/// Thread-safe holder of the most recent [`Pose`].
///
/// `set` and `get` are linearizable with respect to each other: a reader
/// never observes fields from two different writes. No history is kept.
#[derive(Debug, Default)]
pub struct PoseStore {
    slot: Mutex<Option<Pose>>,
}

impl PoseStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored pose. Always succeeds.
    pub fn set(&self, pose: Pose) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(pose);
    }

    /// Snapshot of the current pose.
    ///
    /// Before the first `set` this is the zero pose: origin position,
    /// identity rotation, epoch timestamp, `frame = "scanner"`,
    /// `source = "fk"`.
    pub fn get(&self) -> Pose {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.clone().unwrap_or_default()
    }
}
