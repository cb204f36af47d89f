//! Room lifecycle: create, join, leave, start, presence.

use rand::Rng;
use tracing::{debug, info};

use crate::domain::state::GameState;
use crate::errors::{ConflictKind, EngineError, JoinRejection, NotFoundKind};
use crate::realtime::RoomEvent;
use crate::room::{Room, RoomId, RoomMember, RoomSpec};
use crate::service::RoomService;
use crate::store::RoomStore;

/// Generated-code collision retries before giving up on room creation.
const CODE_RETRIES: usize = 8;

const MIN_CAPACITY: usize = 2;
// A single deck cannot deal opening hands to more than ten seats.
const MAX_CAPACITY: usize = 10;

impl<S: RoomStore> RoomService<S> {
    /// Create a room with the creator as sole member and host.
    ///
    /// An explicit colliding code fails with `AlreadyExists`; generated
    /// codes retry on collision.
    pub async fn create_room(
        &self,
        spec: RoomSpec,
        creator: RoomMember,
    ) -> Result<Room, EngineError> {
        validate_spec(&spec)?;
        let explicit = spec.id.clone();

        for _ in 0..CODE_RETRIES {
            let id = match &explicit {
                Some(id) => id.clone(),
                None => RoomId::generate(&mut rand::rng()),
            };
            let room = Room::new(spec.clone(), id, creator.clone());
            if self.store.insert_if_absent(room.clone()).await? {
                info!(room = %room.id, host = %room.host, "room created");
                self.broker.publish_directory_changed();
                return Ok(room);
            }
            if let Some(id) = &explicit {
                return Err(EngineError::conflict(
                    ConflictKind::AlreadyExists,
                    format!("room {id} already exists"),
                ));
            }
        }
        Err(EngineError::unavailable(
            crate::errors::UnavailableKind::Store,
            "could not find a free room code",
        ))
    }

    /// Join an existing room.
    pub async fn join_room(
        &self,
        id: &RoomId,
        member: RoomMember,
        password: Option<&str>,
    ) -> Result<Room, EngineError> {
        let _slot = self.lock_existing(id).await?;
        let room = self.require_room(id).await?;
        self.admit(room, member, password).await
    }

    /// Join the room, or create it when it does not exist — as one
    /// atomic operation, so two callers cannot both find "not found"
    /// and both create.
    pub async fn join_or_create(
        &self,
        id: &RoomId,
        member: RoomMember,
        spec: RoomSpec,
    ) -> Result<Room, EngineError> {
        let _slot = self.locks.acquire(id, self.cfg.lock_timeout).await?;
        match self.store.get(id).await? {
            Some(room) => {
                let password = spec.password.clone();
                self.admit(room, member, password.as_deref()).await
            }
            None => {
                validate_spec(&spec)?;
                let room = Room::new(spec, id.clone(), member);
                if !self.store.insert_if_absent(room.clone()).await? {
                    // Lost an unlocked create race; surface it as a conflict.
                    return Err(EngineError::conflict(
                        ConflictKind::AlreadyExists,
                        format!("room {id} already exists"),
                    ));
                }
                info!(room = %room.id, "room created via join-or-create");
                self.broker.publish_directory_changed();
                Ok(room)
            }
        }
    }

    /// Remove a member. Reassigns the host when needed, returns the room
    /// to the lobby when fewer than two members remain mid-game, and
    /// garbage-collects the room when it empties.
    pub async fn leave_room(&self, id: &RoomId, player: crate::domain::PlayerId) -> Result<(), EngineError> {
        let _slot = self.lock_existing(id).await?;
        let mut room = self.require_room(id).await?;
        let expected = room.version;

        if !room.remove_member(player) {
            return Err(EngineError::not_found(
                NotFoundKind::Player,
                format!("player {player} is not in room {id}"),
            ));
        }

        if room.members.is_empty() {
            self.store.remove(id).await?;
            self.locks.discard(id);
            self.broker.close_room(id);
            self.broker.publish_directory_changed();
            info!(room = %id, "empty room removed");
            return Ok(());
        }

        if let Some(game) = room.game.as_mut() {
            if let Some(seat) = game.seat_of(player) {
                game.connected[seat] = false;
            }
        }
        if room.in_progress() && room.members.len() < 2 {
            debug!(room = %id, "all but one member left, game cleared");
            fold_scores(&mut room);
            room.game = None;
        }

        self.commit(room, expected).await?;
        self.broker.publish_directory_changed();
        Ok(())
    }

    /// Start a round. Host-only, needs at least two members.
    pub async fn start_game(
        &self,
        id: &RoomId,
        by: crate::domain::PlayerId,
    ) -> Result<Room, EngineError> {
        let _slot = self.lock_existing(id).await?;
        let mut room = self.require_room(id).await?;
        let expected = room.version;

        if by != room.host {
            return Err(EngineError::validation(format!(
                "only the host may start room {id}"
            )));
        }
        if room.in_progress() {
            return Err(EngineError::validation(format!(
                "room {id} already has a round in progress"
            )));
        }
        if room.members.len() < MIN_CAPACITY {
            return Err(EngineError::validation(
                "at least two players are needed to start",
            ));
        }

        let seats: Vec<_> = room.members.iter().map(|m| m.id).collect();
        let carried = seats
            .iter()
            .map(|p| room.scores.get(p).copied().unwrap_or(0))
            .collect();
        let seed = rand::rng().random::<u64>();
        let round_no = room.rounds_played + 1;
        room.game = Some(GameState::deal(
            seats,
            self.cfg.starting_hand_size,
            seed,
            round_no,
            carried,
        ));
        info!(room = %id, round = round_no, "round dealt");

        let room = self.commit(room, expected).await?;
        self.broker.publish_directory_changed();
        Ok(room)
    }

    /// Flip a member's presence flag, in the lobby and in any round in
    /// flight. A reconnecting player resumes their seat.
    pub async fn set_connected(
        &self,
        id: &RoomId,
        player: crate::domain::PlayerId,
        connected: bool,
    ) -> Result<(), EngineError> {
        let _slot = self.lock_existing(id).await?;
        let mut room = self.require_room(id).await?;
        let expected = room.version;

        let member = room
            .members
            .iter_mut()
            .find(|m| m.id == player)
            .ok_or_else(|| {
                EngineError::not_found(
                    NotFoundKind::Player,
                    format!("player {player} is not in room {id}"),
                )
            })?;
        member.connected = connected;
        if let Some(game) = room.game.as_mut() {
            if let Some(seat) = game.seat_of(player) {
                game.connected[seat] = connected;
            }
        }

        self.commit(room, expected).await?;
        Ok(())
    }

    /// Membership admission checks plus the actual join, under the
    /// caller-held room lock.
    async fn admit(
        &self,
        mut room: Room,
        member: RoomMember,
        password: Option<&str>,
    ) -> Result<Room, EngineError> {
        let expected = room.version;

        if room.members.len() >= room.capacity {
            return Err(EngineError::join(
                JoinRejection::RoomFull,
                format!("room {} is full", room.id),
            ));
        }
        if room.in_progress() {
            return Err(EngineError::join(
                JoinRejection::RoomInProgress,
                format!("room {} has a round in progress", room.id),
            ));
        }
        if room.private && room.password.as_deref() != password {
            return Err(EngineError::join(
                JoinRejection::BadPassword,
                "incorrect password",
            ));
        }
        if room.is_member(member.id) {
            return Err(EngineError::conflict(
                ConflictKind::AlreadyMember,
                format!("player {} is already in room {}", member.id, room.id),
            ));
        }

        debug!(room = %room.id, player = %member.id, "member joined");
        room.members.push(member);
        let room = self.commit(room, expected).await?;
        self.broker.publish_directory_changed();
        Ok(room)
    }

    /// Bump the version and conditionally write back. Under the room
    /// lock the swap can only fail if the store itself lost the room.
    pub(crate) async fn commit(&self, mut room: Room, expected: u64) -> Result<Room, EngineError> {
        room.version = expected + 1;
        let swapped = self.store.update_if_version(room.clone(), expected).await?;
        if !swapped {
            tracing::warn!(room = %room.id, expected, "version swap failed under the room lock");
            return Err(EngineError::conflict(
                ConflictKind::VersionConflict,
                format!("room {} changed underneath the write", room.id),
            ));
        }
        self.broker.publish_room(
            &room.id,
            RoomEvent::StateAvailable {
                version: room.version,
            },
        );
        Ok(room)
    }
}

/// Carry per-seat round scores back onto the room before the game state
/// is dropped.
pub(crate) fn fold_scores(room: &mut Room) {
    if let Some(game) = &room.game {
        for (seat, &player) in game.seats.iter().enumerate() {
            room.scores.insert(player, game.scores_total[seat]);
        }
    }
}


fn validate_spec(spec: &RoomSpec) -> Result<(), EngineError> {
    if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&spec.capacity) {
        return Err(EngineError::validation(format!(
            "capacity must be between {MIN_CAPACITY} and {MAX_CAPACITY}, got {}",
            spec.capacity
        )));
    }
    if spec.name.trim().is_empty() {
        return Err(EngineError::validation("room name must not be blank"));
    }
    if spec.private && spec.password.is_none() {
        return Err(EngineError::validation("private rooms need a password"));
    }
    Ok(())
}
