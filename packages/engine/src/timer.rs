//! Turn grace timers.
//!
//! When a seat comes on turn the caller arms a timer; a move from that
//! seat disarms it. If the grace period (the service's configured
//! `turn_grace`) lapses the timer resolves the turn server-side through
//! the same move path every player uses, so an expired timer racing a
//! real move loses cleanly on the version check.

use std::sync::Arc;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::errors::EngineError;
use crate::room::RoomId;
use crate::service::{Move, RoomService};
use crate::store::RoomStore;

#[derive(Default)]
pub struct TurnTimers {
    tokens: Arc<DashMap<RoomId, Arc<CancellationToken>>>,
}

impl TurnTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the timer for a room, using the service's
    /// configured grace period. Any previously armed timer for the same
    /// room is cancelled. A fired timer removes its own entry.
    pub fn arm<S: RoomStore>(&self, service: Arc<RoomService<S>>, id: RoomId) {
        let grace = service.config().turn_grace;
        let token = Arc::new(CancellationToken::new());
        if let Some(prev) = self.tokens.insert(id.clone(), token.clone()) {
            prev.cancel();
        }
        let tokens = Arc::clone(&self.tokens);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(grace) => {
                    match expire_turn(&service, &id).await {
                        Ok(()) => {}
                        Err(err) if err.is_retriable() => {
                            // A real move beat the timer to the write.
                            debug!(room = %id, %err, "turn timer lost the race");
                        }
                        Err(err) => {
                            warn!(room = %id, %err, "turn timer could not resolve the turn");
                        }
                    }
                    // Only remove the entry this task still owns; a
                    // re-arm may have replaced it already.
                    tokens.remove_if(&id, |_, current| Arc::ptr_eq(current, &token));
                }
            }
        });
    }

    pub fn disarm(&self, id: &RoomId) {
        if let Some((_, token)) = self.tokens.remove(id) {
            token.cancel();
        }
    }
}

/// Resolve the turn of whichever seat is on turn right now.
async fn expire_turn<S: RoomStore>(
    service: &RoomService<S>,
    id: &RoomId,
) -> Result<(), EngineError> {
    let room = service.require_room(id).await?;
    let game = match &room.game {
        Some(game) => game,
        None => return Ok(()),
    };
    let player = game.seats[game.turn];
    debug!(room = %id, %player, "turn grace expired");
    service
        .apply_move(id, player, room.version, Move::SkipInactive)
        .await
        .map(|_| ())
}
