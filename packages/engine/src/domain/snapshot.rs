//! Public snapshots of room state.
//!
//! A [`RoomSnapshot`] never carries another player's cards, only hand
//! sizes; [`PlayerView`] adds the owning player's full hand. Every
//! snapshot is tagged with the room version so subscribers can discard
//! stale deliveries.

use serde::{Deserialize, Serialize};

use crate::domain::cards::{Card, Color};
use crate::domain::rules::HouseRules;
use crate::domain::state::{Awaiting, Phase, PlayerId, Seat};
use crate::room::Room;

/// Public info about a single seat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeatPublic {
    pub seat: Seat,
    pub player_id: PlayerId,
    pub display_name: String,
    pub hand_size: usize,
    pub declared_low_hand: bool,
    pub connected: bool,
    pub score: u32,
}

/// Phase as exposed to observers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "data")]
pub enum PhaseSnapshot {
    WaitingForPlayers,
    AwaitingMove { to_act: Seat },
    AwaitingColorChoice { to_act: Seat },
    AwaitingChallengeDecision { to_act: Seat },
    AwaitingDrawOrPlay { to_act: Seat },
    RoundEnded { winner: Seat },
    GameEnded { winner: Seat },
}

/// Version-tagged public view of one room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: String,
    pub version: u64,
    pub name: String,
    pub host: PlayerId,
    pub rules: HouseRules,
    pub in_progress: bool,
    pub phase: PhaseSnapshot,
    pub seats: Vec<SeatPublic>,
    pub direction: i8,
    pub top_card: Option<Card>,
    pub active_color: Option<Color>,
    pub pending_draw: u8,
}

/// A [`RoomSnapshot`] plus the requesting player's own hand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub snapshot: RoomSnapshot,
    pub hand: Vec<Card>,
}

/// Lobby directory line for one room. No game internals leak here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub id: String,
    pub name: String,
    pub private: bool,
    pub occupancy: usize,
    pub capacity: usize,
    pub host: PlayerId,
    pub rules: HouseRules,
    pub in_progress: bool,
}

impl RoomSnapshot {
    pub fn of(room: &Room) -> Self {
        let (phase, seats, direction, top_card, active_color, pending_draw) = match &room.game {
            Some(game) => {
                let phase = match game.phase {
                    Phase::WaitingForPlayers => PhaseSnapshot::WaitingForPlayers,
                    Phase::InProgress { awaiting } => match awaiting {
                        Awaiting::Move => PhaseSnapshot::AwaitingMove { to_act: game.turn },
                        Awaiting::ColorChoice { .. } => {
                            PhaseSnapshot::AwaitingColorChoice { to_act: game.turn }
                        }
                        Awaiting::ChallengeDecision { challenger, .. } => {
                            PhaseSnapshot::AwaitingChallengeDecision { to_act: challenger }
                        }
                        Awaiting::DrawOrPlay { .. } => {
                            PhaseSnapshot::AwaitingDrawOrPlay { to_act: game.turn }
                        }
                    },
                    Phase::RoundEnded { winner } => PhaseSnapshot::RoundEnded { winner },
                    Phase::GameEnded { winner } => PhaseSnapshot::GameEnded { winner },
                };
                let seats = game
                    .seats
                    .iter()
                    .enumerate()
                    .map(|(seat, &player_id)| SeatPublic {
                        seat,
                        player_id,
                        display_name: room
                            .member(player_id)
                            .map(|m| m.display_name.clone())
                            .unwrap_or_default(),
                        hand_size: game.hands[seat].len(),
                        declared_low_hand: game.declared[seat],
                        connected: game.connected[seat],
                        score: game.scores_total[seat],
                    })
                    .collect();
                (
                    phase,
                    seats,
                    game.direction,
                    game.piles.top_discard().copied(),
                    game.active_color,
                    game.pending_draw,
                )
            }
            None => {
                let seats = room
                    .members
                    .iter()
                    .enumerate()
                    .map(|(seat, m)| SeatPublic {
                        seat,
                        player_id: m.id,
                        display_name: m.display_name.clone(),
                        hand_size: 0,
                        declared_low_hand: false,
                        connected: m.connected,
                        score: room.scores.get(&m.id).copied().unwrap_or(0),
                    })
                    .collect();
                (PhaseSnapshot::WaitingForPlayers, seats, 1, None, None, 0)
            }
        };

        Self {
            room_id: room.id.to_string(),
            version: room.version,
            name: room.name.clone(),
            host: room.host,
            rules: room.rules,
            in_progress: room.in_progress(),
            phase,
            seats,
            direction,
            top_card,
            active_color,
            pending_draw,
        }
    }

    /// The snapshot plus the requesting player's own hand. Other hands
    /// stay opaque regardless of who asks.
    pub fn for_player(room: &Room, player: PlayerId) -> PlayerView {
        let snapshot = Self::of(room);
        let hand = room
            .game
            .as_ref()
            .and_then(|game| game.seat_of(player).map(|seat| game.hands[seat].clone()))
            .unwrap_or_default();
        PlayerView { snapshot, hand }
    }
}

impl DirectoryEntry {
    pub fn of(room: &Room) -> Self {
        Self {
            id: room.id.to_string(),
            name: room.name.clone(),
            private: room.private,
            occupancy: room.members.len(),
            capacity: room.capacity,
            host: room.host,
            rules: room.rules,
            in_progress: room.in_progress(),
        }
    }
}
