use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// Single static counter for all scene objects
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a scene object, unique within a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub fn generate_id() -> ObjectId {
    ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::SeqCst))
}

/// Make sure ids handed out later never collide with `id`.
///
/// Needed when objects come from a document written by another process.
pub(crate) fn reserve_past(id: ObjectId) {
    NEXT_OBJECT_ID.fetch_max(successor(id), Ordering::SeqCst);
}

// Saturates: a document may carry any u64
fn successor(id: ObjectId) -> u64 {
    id.0.saturating_add(1)
}
