//! Persistence/transport collaborator boundary.
//!
//! The engine is storage-agnostic: anything offering atomic
//! insert-if-absent and conditional (compare-and-swap on version)
//! update can back the room registry. [`memory::MemoryStore`] is the
//! reference implementation and what the tests run against.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::errors::EngineError;
use crate::room::{Room, RoomId};

/// Room storage keyed by room id.
///
/// Implementations must support concurrent lookups while one room is
/// being mutated, and readers must never observe a torn room.
#[async_trait]
pub trait RoomStore: Send + Sync + 'static {
    /// Insert the room only if no live room uses its id. Returns whether
    /// the insert happened.
    async fn insert_if_absent(&self, room: Room) -> Result<bool, EngineError>;

    async fn get(&self, id: &RoomId) -> Result<Option<Room>, EngineError>;

    async fn list(&self) -> Result<Vec<Room>, EngineError>;

    /// Replace the stored room only when its current version equals
    /// `expected_version`. Returns whether the swap happened.
    async fn update_if_version(
        &self,
        room: Room,
        expected_version: u64,
    ) -> Result<bool, EngineError>;

    async fn remove(&self, id: &RoomId) -> Result<(), EngineError>;
}
