//! Room registry and concurrency controller.
//!
//! [`RoomService`] is the single entry point for everything that
//! mutates a room: creation, membership, game start, and move
//! application. Each room's mutations serialize on its own async lock;
//! reads go straight to the store and always see a complete room.

mod locks;
mod moves;
mod rooms;

pub use moves::{Move, MoveApplied};

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::domain::snapshot::{DirectoryEntry, PlayerView, RoomSnapshot};
use crate::domain::state::PlayerId;
use crate::errors::{EngineError, NotFoundKind};
use crate::realtime::RealtimeBroker;
use crate::room::{Room, RoomId};
use crate::service::locks::RoomLocks;
use crate::store::RoomStore;

pub struct RoomService<S> {
    store: S,
    locks: RoomLocks,
    broker: Arc<RealtimeBroker>,
    cfg: EngineConfig,
}

impl<S: RoomStore> RoomService<S> {
    pub fn new(store: S, broker: Arc<RealtimeBroker>, cfg: EngineConfig) -> Self {
        Self {
            store,
            locks: RoomLocks::new(),
            broker,
            cfg,
        }
    }

    pub fn broker(&self) -> Arc<RealtimeBroker> {
        self.broker.clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Public snapshot of one room at its current version.
    pub async fn room_snapshot(&self, id: &RoomId) -> Result<RoomSnapshot, EngineError> {
        let room = self.require_room(id).await?;
        Ok(RoomSnapshot::of(&room))
    }

    /// Snapshot for one player, including their own hand only.
    pub async fn player_view(
        &self,
        id: &RoomId,
        player: PlayerId,
    ) -> Result<PlayerView, EngineError> {
        let room = self.require_room(id).await?;
        Ok(RoomSnapshot::for_player(&room, player))
    }

    /// The lobby directory, ordered by room code for stable listings.
    pub async fn directory(&self) -> Result<Vec<DirectoryEntry>, EngineError> {
        let mut rooms = self.store.list().await?;
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rooms.iter().map(DirectoryEntry::of).collect())
    }

    pub(crate) async fn require_room(&self, id: &RoomId) -> Result<Room, EngineError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| EngineError::not_found(NotFoundKind::Room, format!("room {id}")))
    }

    /// Acquire the room's exclusion slot for an operation that needs an
    /// existing room. The existence check runs first so lookups of bogus
    /// ids never grow the lock table; `require_room` is re-checked under
    /// the lock by every caller.
    pub(crate) async fn lock_existing(
        &self,
        id: &RoomId,
    ) -> Result<tokio::sync::OwnedMutexGuard<()>, EngineError> {
        self.require_room(id).await?;
        self.locks.acquire(id, self.cfg.lock_timeout).await
    }
}
