//! Per-room mutual exclusion.
//!
//! One async mutex per live room: all mutations of a room serialize on
//! it while distinct rooms proceed in parallel. Acquisition is always
//! bounded by a timeout, and a caller that abandons the wait (drops the
//! future) leaves nothing half-done because mutations only write back
//! after the full new state is computed.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::timeout;

use crate::errors::{EngineError, UnavailableKind};
use crate::room::RoomId;

#[derive(Default)]
pub(crate) struct RoomLocks {
    locks: DashMap<RoomId, Arc<Mutex<()>>>,
}

impl RoomLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Acquire the room's exclusion slot, waiting at most `wait`.
    pub(crate) async fn acquire(
        &self,
        id: &RoomId,
        wait: Duration,
    ) -> Result<OwnedMutexGuard<()>, EngineError> {
        let lock = self
            .locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        timeout(wait, lock.lock_owned()).await.map_err(|_| {
            EngineError::unavailable(
                UnavailableKind::Timeout,
                format!("room {id} is busy, gave up after {wait:?}"),
            )
        })
    }

    /// Drop the lock entry of a garbage-collected room.
    pub(crate) fn discard(&self, id: &RoomId) {
        self.locks.remove(id);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.len()
    }
}
