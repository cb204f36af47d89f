//! Move application: optimistic-version command path for a round in
//! flight.

use tracing::{debug, info};

use crate::domain::machine::{self, MoveOutcome, PlayRequest};
use crate::domain::state::GameState;
use crate::domain::{Color, PlayerId};
use crate::errors::{ConflictKind, EngineError, MoveRejection};
use crate::realtime::RoomEvent;
use crate::room::RoomId;
use crate::service::rooms::fold_scores;
use crate::service::RoomService;
use crate::store::RoomStore;

/// A player command against a round in flight.
#[derive(Debug, Clone)]
pub enum Move {
    Play(PlayRequest),
    Draw,
    Pass,
    ChooseColor { color: Color },
    DeclareLowHand,
    /// `true` challenges the last wild draw four, `false` accepts it.
    ResolveChallenge { challenge: bool },
    /// Server-issued: resolve the current seat's turn without input.
    SkipInactive,
}

/// Result of a committed move.
#[derive(Debug, Clone)]
pub struct MoveApplied {
    /// Room version after the write.
    pub version: u64,
    /// Outcome for moves that resolve effects; `None` for declarations
    /// and mid-move states such as a pending color choice.
    pub outcome: Option<MoveOutcome>,
}

impl<S: RoomStore> RoomService<S> {
    /// Apply one move, serialized under the room lock.
    ///
    /// `expected_version` is the version the caller's view was built
    /// from; a mismatch fails with a retriable `VersionConflict` before
    /// anything is touched. The game state is mutated on a clone and
    /// swapped in whole, so a rejected or abandoned move never leaves a
    /// half-applied round behind.
    pub async fn apply_move(
        &self,
        id: &RoomId,
        player: PlayerId,
        expected_version: u64,
        mv: Move,
    ) -> Result<MoveApplied, EngineError> {
        let _slot = self.lock_existing(id).await?;
        let mut room = self.require_room(id).await?;
        let expected = room.version;

        if expected_version != expected {
            debug!(room = %id, expected, got = expected_version, "stale move submission");
            return Err(EngineError::conflict(
                ConflictKind::VersionConflict,
                format!(
                    "room {id} is at version {expected}, caller expected {expected_version}"
                ),
            ));
        }

        let mut game = match room.game.clone() {
            Some(game) => game,
            None => {
                return Err(EngineError::rejected(
                    MoveRejection::PhaseMismatch,
                    format!("room {id} has no round in progress"),
                ));
            }
        };
        let seat = game.seat_of(player).ok_or_else(|| {
            EngineError::rejected(
                MoveRejection::NotSeated,
                format!("player {player} holds no seat in room {id}"),
            )
        })?;

        let rules = room.rules;
        let outcome = match mv {
            Move::Play(req) => Some(machine::play_card(&mut game, seat, req, &rules, &self.cfg)?),
            Move::Draw => Some(machine::draw_card(&mut game, seat, &rules, &self.cfg)?),
            Move::Pass => Some(machine::pass(&mut game, seat)?),
            Move::ChooseColor { color } => Some(machine::choose_color(
                &mut game, seat, color, &rules, &self.cfg,
            )?),
            Move::DeclareLowHand => {
                machine::declare_low_hand(&mut game, seat)?;
                None
            }
            Move::ResolveChallenge { challenge } => Some(machine::resolve_challenge(
                &mut game, seat, challenge, &self.cfg,
            )?),
            Move::SkipInactive => Some(machine::skip_inactive(&mut game, seat, &self.cfg)?),
        };
        debug!(room = %id, player = %player, seat, "move accepted");

        let round_end = outcome.as_ref().and_then(|o| o.round_end.clone());
        let round_over = round_end.is_some();
        if let Some(end) = &round_end {
            room.game = Some(game);
            fold_scores(&mut room);
            room.rounds_played += 1;
            if end.game_over {
                room.scores.clear();
                room.rounds_played = 0;
                room.game = None;
            } else if self.cfg.auto_redeal {
                room.game = Some(self.redeal(&room));
            } else {
                room.game = None;
            }
            info!(
                room = %id,
                winner = %end.winner_id,
                points = end.points_awarded,
                game_over = end.game_over,
                "round ended"
            );
        } else {
            room.game = Some(game);
        }

        let room = self.commit(room, expected).await?;

        if let Some(end) = round_end {
            self.broker.publish_room(
                id,
                RoomEvent::RoundEnded {
                    winner: end.winner_id,
                    points_awarded: end.points_awarded,
                    game_over: end.game_over,
                    version: room.version,
                },
            );
            self.broker.publish_directory_changed();
        } else if let Some(next) = outcome.as_ref().and_then(|o| o.turn_after) {
            if let Some(game) = &room.game {
                self.broker.publish_room(
                    id,
                    RoomEvent::YourTurn {
                        player_id: game.seats[next],
                        version: room.version,
                    },
                );
            }
        }
        if round_over && self.cfg.auto_redeal {
            self.broker.publish_directory_changed();
        }

        Ok(MoveApplied {
            version: room.version,
            outcome,
        })
    }

    /// Fresh round over the same seats, scores carried from the room.
    fn redeal(&self, room: &crate::room::Room) -> GameState {
        let seats: Vec<_> = room.members.iter().map(|m| m.id).collect();
        let carried = seats
            .iter()
            .map(|p| room.scores.get(p).copied().unwrap_or(0))
            .collect();
        use rand::Rng;
        let seed = rand::rng().random::<u64>();
        GameState::deal(
            seats,
            self.cfg.starting_hand_size,
            seed,
            room.rounds_played + 1,
            carried,
        )
    }
}
