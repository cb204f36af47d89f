//! In-process publish/subscribe for room state and the lobby directory.
//!
//! Events carry the room version, never private state: a subscriber
//! reacts by fetching its own redacted view at that version, and can
//! discard anything older than what it already rendered. Channels are
//! lossy for lagging subscribers by design; the latest snapshot is
//! always recoverable from the service.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::state::PlayerId;
use crate::room::RoomId;

const ROOM_CHANNEL_CAPACITY: usize = 64;
const DIRECTORY_CHANNEL_CAPACITY: usize = 64;

/// Events published to subscribers of a single room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    /// A new authoritative state exists at this version.
    StateAvailable { version: u64 },
    /// The named player is now to act.
    YourTurn { player_id: PlayerId, version: u64 },
    /// The round ended; `game_over` marks the winning-score threshold.
    RoundEnded {
        winner: PlayerId,
        points_awarded: u32,
        game_over: bool,
        version: u64,
    },
    /// The room was emptied and garbage-collected.
    RoomClosed,
}

/// Events published to lobby observers watching the room directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DirectoryEvent {
    Changed,
}

/// Owns one broadcast channel per room plus the directory channel.
pub struct RealtimeBroker {
    rooms: DashMap<RoomId, broadcast::Sender<RoomEvent>>,
    directory: broadcast::Sender<DirectoryEvent>,
}

impl Default for RealtimeBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeBroker {
    pub fn new() -> Self {
        let (directory, _) = broadcast::channel(DIRECTORY_CHANNEL_CAPACITY);
        Self {
            rooms: DashMap::new(),
            directory,
        }
    }

    /// Subscribe to one room's event stream.
    pub fn subscribe_room(&self, id: &RoomId) -> broadcast::Receiver<RoomEvent> {
        self.rooms
            .entry(id.clone())
            .or_insert_with(|| broadcast::channel(ROOM_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Subscribe to directory changes.
    pub fn subscribe_directory(&self) -> broadcast::Receiver<DirectoryEvent> {
        self.directory.subscribe()
    }

    /// Publish an event to a room's subscribers. A send error only means
    /// nobody is listening right now, which is fine.
    pub fn publish_room(&self, id: &RoomId, event: RoomEvent) {
        if let Some(sender) = self.rooms.get(id) {
            let delivered = sender.send(event).unwrap_or(0);
            debug!(room = %id, delivered, "room event published");
        }
    }

    /// Publish a room event and drop the channel: the room is gone.
    pub fn close_room(&self, id: &RoomId) {
        if let Some((_, sender)) = self.rooms.remove(id) {
            let _ = sender.send(RoomEvent::RoomClosed);
        }
    }

    pub fn publish_directory_changed(&self) {
        let _ = self.directory.send(DirectoryEvent::Changed);
    }
}
