//! In-memory room store backed by a concurrent map.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::errors::EngineError;
use crate::room::{Room, RoomId};
use crate::store::RoomStore;

/// Process-local [`RoomStore`]. Rooms are cloned in and out, so readers
/// always see a complete room even while a writer holds the room's
/// exclusion slot.
#[derive(Default)]
pub struct MemoryStore {
    rooms: DashMap<RoomId, Room>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn insert_if_absent(&self, room: Room) -> Result<bool, EngineError> {
        match self.rooms.entry(room.id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(room);
                Ok(true)
            }
        }
    }

    async fn get(&self, id: &RoomId) -> Result<Option<Room>, EngineError> {
        Ok(self.rooms.get(id).map(|r| r.clone()))
    }

    async fn list(&self) -> Result<Vec<Room>, EngineError> {
        Ok(self.rooms.iter().map(|r| r.clone()).collect())
    }

    async fn update_if_version(
        &self,
        room: Room,
        expected_version: u64,
    ) -> Result<bool, EngineError> {
        match self.rooms.entry(room.id.clone()) {
            Entry::Occupied(mut slot) => {
                if slot.get().version != expected_version {
                    return Ok(false);
                }
                slot.insert(room);
                Ok(true)
            }
            Entry::Vacant(_) => Ok(false),
        }
    }

    async fn remove(&self, id: &RoomId) -> Result<(), EngineError> {
        self.rooms.remove(id);
        Ok(())
    }
}
