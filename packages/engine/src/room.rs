//! Room aggregate: identity, membership, configuration, and the
//! optionally embedded game state.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::rules::HouseRules;
use crate::domain::state::{GameState, PlayerId};
use crate::errors::EngineError;

const ROOM_CODE_LEN: usize = 6;
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Human-shareable room code: six characters from A-Z and 0-9.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    /// Parse and validate a candidate code.
    pub fn parse(raw: &str) -> Result<Self, EngineError> {
        let ok = raw.len() == ROOM_CODE_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        if !ok {
            return Err(EngineError::validation(format!(
                "room code must be {ROOM_CODE_LEN} characters A-Z or 0-9, got '{raw}'"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    /// Generate a fresh random code.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let code: String = (0..ROOM_CODE_LEN)
            .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A player seated in (or waiting in) a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMember {
    pub id: PlayerId,
    pub display_name: String,
    /// Presence flag; a disconnected member keeps their seat mid-round.
    pub connected: bool,
}

/// Parameters for creating a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSpec {
    /// Explicit code, or `None` to generate one.
    pub id: Option<RoomId>,
    pub name: String,
    pub private: bool,
    pub password: Option<String>,
    pub capacity: usize,
    pub rules: HouseRules,
}

impl Default for RoomSpec {
    fn default() -> Self {
        Self {
            id: None,
            name: "New Room".to_string(),
            private: false,
            password: None,
            capacity: 10,
            rules: HouseRules::default(),
        }
    }
}

/// One game room. Mutated only under the room's exclusion slot; every
/// successful mutation bumps `version` by exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub private: bool,
    pub password: Option<String>,
    pub capacity: usize,
    /// Ordered membership; the join order decides host succession.
    pub members: Vec<RoomMember>,
    pub host: PlayerId,
    pub rules: HouseRules,
    /// Cumulative scores across rounds, kept when the game state is
    /// cleared between rounds.
    pub scores: HashMap<PlayerId, u32>,
    /// Completed rounds since the game began; resets when a game ends.
    pub rounds_played: u32,
    pub game: Option<GameState>,
    /// Monotonic optimistic-concurrency counter.
    pub version: u64,
    pub created_at: OffsetDateTime,
}

impl Room {
    pub fn new(spec: RoomSpec, id: RoomId, creator: RoomMember) -> Self {
        let host = creator.id;
        Self {
            id,
            name: spec.name,
            private: spec.private,
            password: spec.password,
            capacity: spec.capacity,
            members: vec![creator],
            host,
            rules: spec.rules,
            scores: HashMap::new(),
            rounds_played: 0,
            game: None,
            version: 0,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn in_progress(&self) -> bool {
        self.game.is_some()
    }

    pub fn member(&self, player: PlayerId) -> Option<&RoomMember> {
        self.members.iter().find(|m| m.id == player)
    }

    pub fn is_member(&self, player: PlayerId) -> bool {
        self.member(player).is_some()
    }

    /// Remove a member, reassigning the host to the earliest remaining
    /// member when the host leaves. Returns whether the member existed.
    pub fn remove_member(&mut self, player: PlayerId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.id != player);
        if self.members.len() == before {
            return false;
        }
        if self.host == player {
            if let Some(next) = self.members.first() {
                self.host = next.id;
            }
        }
        true
    }
}
