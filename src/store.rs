//! In-memory cache of the last successful snapshot.
//!
//! `FeedStore` itself does no locking; the refresh coordinator is its only
//! writer and wraps it in a mutex held just for the read or write.

use std::sync::Arc;

use crate::feed::Snapshot;

/// Last successful snapshot plus whether any refresh has ever succeeded.
#[derive(Debug, Default)]
pub struct FeedStore {
    snapshot: Option<Arc<Snapshot>>,
    has_value: bool,
}

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents: the snapshot (if any) and the has-ever-succeeded
    /// flag. The flag never reverts to `false` once set.
    pub fn read(&self) -> (Option<Arc<Snapshot>>, bool) {
        (self.snapshot.clone(), self.has_value)
    }

    /// Install a successfully produced snapshot.
    pub fn write(&mut self, snapshot: Snapshot) {
        self.snapshot = Some(Arc::new(snapshot));
        self.has_value = true;
    }
}
