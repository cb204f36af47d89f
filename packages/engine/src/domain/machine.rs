//! The turn state machine: applies validated moves to a [`GameState`],
//! resolves card effects and house-rule variants, and detects terminal
//! conditions.
//!
//! Every operation validates fully before mutating, so a rejection is an
//! atomic no-op. Concurrency, versioning, and distribution live a layer
//! up in the service; everything here is synchronous and deterministic.

use tracing::debug;

use crate::config::EngineConfig;
use crate::domain::cards::{Card, CardId, CardKind, Color};
use crate::domain::rules::{can_play, is_jump_in, HouseRules};
use crate::domain::scoring::round_award;
use crate::domain::state::{seat_offset, Awaiting, GameState, Phase, PlayerId, Seat};
use crate::errors::{EngineError, MoveRejection};

/// Terminal information when a move ends the round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundEnd {
    pub winner: Seat,
    pub winner_id: PlayerId,
    /// Sum of the point values of all other seats' remaining hands.
    pub points_awarded: u32,
    /// The winner's cumulative score reached the winning threshold.
    pub game_over: bool,
}

/// What a successfully applied move did to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Seat on turn after the move, `None` when the round ended.
    pub turn_after: Option<Seat>,
    pub round_end: Option<RoundEnd>,
}

/// A play-card request as submitted by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayRequest {
    pub card: CardId,
    /// Required eventually for wild cards; may be supplied inline or via
    /// a follow-up color choice.
    pub chosen_color: Option<Color>,
    /// Required when seven-swap is live and the card is a 7.
    pub swap_target: Option<Seat>,
}

impl PlayRequest {
    pub fn card(card: CardId) -> Self {
        Self {
            card,
            chosen_color: None,
            swap_target: None,
        }
    }

    pub fn with_color(card: CardId, color: Color) -> Self {
        Self {
            card,
            chosen_color: Some(color),
            swap_target: None,
        }
    }
}

/// Play a card, resolving its effects and advancing the turn.
pub fn play_card(
    state: &mut GameState,
    who: Seat,
    req: PlayRequest,
    rules: &HouseRules,
    cfg: &EngineConfig,
) -> Result<MoveOutcome, EngineError> {
    let awaiting = require_in_progress(state)?;

    let pos = state.hands[who]
        .iter()
        .position(|c| c.id == req.card)
        .ok_or_else(|| {
            EngineError::rejected(MoveRejection::CardNotInHand, format!("card {:?}", req.card))
        })?;
    let card = state.hands[who][pos];
    let top = *state.piles.top_discard().ok_or_else(|| {
        EngineError::rejected(MoveRejection::PhaseMismatch, "discard pile is empty")
    })?;

    let jumped_in = match awaiting {
        Awaiting::Move => {
            if who == state.turn {
                if !can_play(
                    &card,
                    &top,
                    state.active_color,
                    state.pending_draw,
                    rules,
                ) {
                    return Err(EngineError::rejected(
                        MoveRejection::IllegalCard,
                        "card does not match the discard pile",
                    ));
                }
                false
            } else if is_jump_in(&card, &top, rules) {
                true
            } else {
                return Err(EngineError::rejected(
                    MoveRejection::NotYourTurn,
                    format!("seat {} is to act", state.turn),
                ));
            }
        }
        Awaiting::DrawOrPlay { drawn } => {
            if who != state.turn {
                return Err(EngineError::rejected(
                    MoveRejection::NotYourTurn,
                    format!("seat {} is to act", state.turn),
                ));
            }
            if req.card != drawn {
                return Err(EngineError::rejected(
                    MoveRejection::IllegalCard,
                    "only the just-drawn card may be played now",
                ));
            }
            if !can_play(&card, &top, state.active_color, state.pending_draw, rules) {
                return Err(EngineError::rejected(
                    MoveRejection::IllegalCard,
                    "drawn card does not match the discard pile",
                ));
            }
            false
        }
        Awaiting::ColorChoice { .. } => {
            return Err(EngineError::rejected(
                MoveRejection::PhaseMismatch,
                "a color choice is pending",
            ));
        }
        Awaiting::ChallengeDecision { .. } => {
            return Err(EngineError::rejected(
                MoveRejection::PhaseMismatch,
                "a wild-draw-four challenge is pending",
            ));
        }
    };

    // Seven-swap needs its target up front so a rejection stays a no-op.
    let swap_target = if rules.seven_swap && card.kind == CardKind::Number && card.value == Some(7)
    {
        let target = req.swap_target.ok_or_else(|| {
            EngineError::rejected(MoveRejection::SwapTargetRequired, "seven-swap is live")
        })?;
        if target == who || target >= state.seat_count() {
            return Err(EngineError::rejected(
                MoveRejection::BadSwapTarget,
                format!("seat {target} is not a valid opponent"),
            ));
        }
        Some(target)
    } else {
        None
    };

    let prior_color = state.color_in_force();

    if card.kind == CardKind::WildDrawFour && rules.no_bluffing {
        let holds_match = state.hands[who]
            .iter()
            .filter(|c| c.id != card.id)
            .any(|c| c.color.is_some() && c.color == prior_color);
        if holds_match {
            return Err(EngineError::rejected(
                MoveRejection::BluffDisallowed,
                "wild-draw-four played while holding a matching color",
            ));
        }
    }

    // All checks passed; from here on the move applies atomically.
    apply_low_hand_penalty(state, cfg, who);

    let played = state.hands[who].remove(pos);
    state.piles.discard.push(played);
    if jumped_in {
        debug!(seat = who, "jump-in interrupts turn order");
        state.turn = who;
    }

    if played.is_wild() {
        match req.chosen_color {
            Some(color) => state.active_color = Some(color),
            None => {
                // Effects resolve once the color arrives.
                state.phase = Phase::InProgress {
                    awaiting: Awaiting::ColorChoice { prior_color },
                };
                state.turn = who;
                state.last_mover = Some(who);
                return Ok(MoveOutcome {
                    turn_after: Some(who),
                    round_end: None,
                });
            }
        }
    } else {
        state.active_color = None;
    }

    Ok(resolve_effects(state, who, &played, prior_color, swap_target, rules, cfg))
}

/// Complete a pending wild color choice and resolve the wild's effects.
pub fn choose_color(
    state: &mut GameState,
    who: Seat,
    color: Color,
    rules: &HouseRules,
    cfg: &EngineConfig,
) -> Result<MoveOutcome, EngineError> {
    let awaiting = require_in_progress(state)?;
    let Awaiting::ColorChoice { prior_color } = awaiting else {
        return Err(EngineError::rejected(
            MoveRejection::PhaseMismatch,
            "no color choice is pending",
        ));
    };
    if who != state.turn {
        return Err(EngineError::rejected(
            MoveRejection::NotYourTurn,
            format!("seat {} owes the color choice", state.turn),
        ));
    }

    state.active_color = Some(color);
    let top = *state.piles.top_discard().ok_or_else(|| {
        EngineError::rejected(MoveRejection::PhaseMismatch, "discard pile is empty")
    })?;
    Ok(resolve_effects(state, who, &top, prior_color, None, rules, cfg))
}

/// Draw from the pile: the full pending penalty, or one voluntary card.
pub fn draw_card(
    state: &mut GameState,
    who: Seat,
    rules: &HouseRules,
    cfg: &EngineConfig,
) -> Result<MoveOutcome, EngineError> {
    let awaiting = require_in_progress(state)?;
    if !matches!(awaiting, Awaiting::Move) {
        return Err(EngineError::rejected(
            MoveRejection::PhaseMismatch,
            "drawing is only legal when a move is awaited",
        ));
    }
    if who != state.turn {
        return Err(EngineError::rejected(
            MoveRejection::NotYourTurn,
            format!("seat {} is to act", state.turn),
        ));
    }

    apply_low_hand_penalty(state, cfg, who);

    let forced = state.pending_draw > 0;
    let amount = state.pending_draw.max(1) as usize;
    state.pending_draw = 0;
    let drawn = draw_n(state, who, amount);
    state.last_mover = Some(who);

    if forced {
        debug!(seat = who, amount, "forced draw, turn passes");
        state.turn = state.advance_from(who, 1);
        state.phase = Phase::InProgress {
            awaiting: Awaiting::Move,
        };
        return Ok(MoveOutcome {
            turn_after: Some(state.turn),
            round_end: None,
        });
    }

    // A voluntary draw may be played immediately when it fits.
    let top = *state.piles.top_discard().ok_or_else(|| {
        EngineError::rejected(MoveRejection::PhaseMismatch, "discard pile is empty")
    })?;
    if let Some(card) = drawn.first() {
        if can_play(card, &top, state.active_color, 0, rules) {
            state.phase = Phase::InProgress {
                awaiting: Awaiting::DrawOrPlay { drawn: card.id },
            };
            return Ok(MoveOutcome {
                turn_after: Some(who),
                round_end: None,
            });
        }
    }

    state.turn = state.advance_from(who, 1);
    state.phase = Phase::InProgress {
        awaiting: Awaiting::Move,
    };
    Ok(MoveOutcome {
        turn_after: Some(state.turn),
        round_end: None,
    })
}

/// Decline to play a just-drawn card.
pub fn pass(state: &mut GameState, who: Seat) -> Result<MoveOutcome, EngineError> {
    let awaiting = require_in_progress(state)?;
    if !matches!(awaiting, Awaiting::DrawOrPlay { .. }) {
        return Err(EngineError::rejected(
            MoveRejection::PhaseMismatch,
            "passing is only legal after a voluntary draw",
        ));
    }
    if who != state.turn {
        return Err(EngineError::rejected(
            MoveRejection::NotYourTurn,
            format!("seat {} is to act", state.turn),
        ));
    }

    state.last_mover = Some(who);
    state.turn = state.advance_from(who, 1);
    state.phase = Phase::InProgress {
        awaiting: Awaiting::Move,
    };
    Ok(MoveOutcome {
        turn_after: Some(state.turn),
        round_end: None,
    })
}

/// Declare a low hand ("final card"). Idempotent; legal whenever the
/// hand is down to at most one card.
pub fn declare_low_hand(state: &mut GameState, who: Seat) -> Result<(), EngineError> {
    require_in_progress(state)?;
    if state.hands[who].len() > 1 {
        return Err(EngineError::rejected(
            MoveRejection::NotLowHand,
            format!("hand still holds {} cards", state.hands[who].len()),
        ));
    }
    state.declared[who] = true;
    Ok(())
}

/// Resolve a pending wild-draw-four challenge.
///
/// Challenging a bluff makes the offender swallow the pending draw;
/// a failed challenge costs the challenger the pending draw plus a
/// configured penalty. Declining simply accepts the pending draw.
pub fn resolve_challenge(
    state: &mut GameState,
    who: Seat,
    challenge: bool,
    cfg: &EngineConfig,
) -> Result<MoveOutcome, EngineError> {
    let awaiting = require_in_progress(state)?;
    let Awaiting::ChallengeDecision {
        challenger,
        prior_color,
    } = awaiting
    else {
        return Err(EngineError::rejected(
            MoveRejection::PhaseMismatch,
            "no challenge is pending",
        ));
    };
    if who != challenger {
        return Err(EngineError::rejected(
            MoveRejection::NotYourTurn,
            format!("seat {challenger} owns the challenge decision"),
        ));
    }
    let offender = state.last_mover.ok_or_else(|| {
        EngineError::rejected(MoveRejection::PhaseMismatch, "challenge without an offender")
    })?;

    // Judge the bluff against the hand as it stood when the four was
    // played, before any penalty draw lands in it.
    let bluffed = state.hands[offender]
        .iter()
        .any(|c| c.color.is_some() && c.color == prior_color);

    apply_low_hand_penalty(state, cfg, who);

    let pending = state.pending_draw as usize;
    state.pending_draw = 0;

    if challenge {
        if bluffed {
            debug!(seat = offender, "wild-draw-four challenge upheld");
            draw_n(state, offender, pending);
            state.turn = challenger;
        } else {
            debug!(seat = challenger, "wild-draw-four challenge failed");
            draw_n(
                state,
                challenger,
                pending + cfg.challenge_loss_penalty as usize,
            );
            state.turn = state.advance_from(challenger, 1);
        }
    } else {
        draw_n(state, challenger, pending);
        state.turn = state.advance_from(challenger, 1);
    }

    state.last_mover = Some(challenger);
    state.phase = Phase::InProgress {
        awaiting: Awaiting::Move,
    };
    Ok(MoveOutcome {
        turn_after: Some(state.turn),
        round_end: None,
    })
}

/// Forfeit the turn of an inactive or disconnected player. Invoked by
/// the external timer collaborator through the normal move pipeline;
/// the engine itself never consults a wall clock.
pub fn skip_inactive(
    state: &mut GameState,
    who: Seat,
    cfg: &EngineConfig,
) -> Result<MoveOutcome, EngineError> {
    let awaiting = require_in_progress(state)?;
    if who != state.turn {
        return Err(EngineError::rejected(
            MoveRejection::NotYourTurn,
            format!("seat {} is to act", state.turn),
        ));
    }

    apply_low_hand_penalty(state, cfg, who);

    match awaiting {
        Awaiting::ColorChoice { .. } => {
            // Pick the skipped player's most common color so play can go on.
            let color = dominant_color(&state.hands[who]);
            state.active_color = Some(color);
        }
        Awaiting::Move | Awaiting::DrawOrPlay { .. } | Awaiting::ChallengeDecision { .. } => {
            let pending = state.pending_draw as usize;
            state.pending_draw = 0;
            if pending > 0 {
                draw_n(state, who, pending);
            }
        }
    }

    debug!(seat = who, "turn skipped for inactivity");
    state.last_mover = Some(who);
    state.turn = state.advance_from(who, 1);
    state.phase = Phase::InProgress {
        awaiting: Awaiting::Move,
    };
    Ok(MoveOutcome {
        turn_after: Some(state.turn),
        round_end: None,
    })
}

fn require_in_progress(state: &GameState) -> Result<Awaiting, EngineError> {
    match state.phase {
        Phase::InProgress { awaiting } => Ok(awaiting),
        _ => Err(EngineError::rejected(
            MoveRejection::PhaseMismatch,
            "no round is in progress",
        )),
    }
}

/// Resolve the kind-specific effect of a just-played card, check for
/// round termination, and advance the turn pointer.
fn resolve_effects(
    state: &mut GameState,
    who: Seat,
    card: &Card,
    prior_color: Option<Color>,
    swap_target: Option<Seat>,
    rules: &HouseRules,
    cfg: &EngineConfig,
) -> MoveOutcome {
    state.last_mover = Some(who);

    let mut advance = 1usize;
    match card.kind {
        CardKind::Number => {
            if let Some(target) = swap_target {
                debug!(seat = who, target, "seven-swap exchanges hands");
                state.hands.swap(who, target);
            } else if rules.zero_rotate && card.value == Some(0) {
                rotate_hands(state);
            }
        }
        CardKind::Skip => advance = 2,
        CardKind::Reverse => {
            state.flip_direction();
            // With two seats a reverse skips the opponent.
            if state.seat_count() == 2 {
                advance = 2;
            }
        }
        CardKind::DrawTwo | CardKind::WildDrawFour => {
            let amount = card.draw_amount();
            if card.kind == CardKind::WildDrawFour && rules.challenge_wild_four {
                state.pending_draw += amount;
                let victim = state.advance_from(who, 1);
                state.turn = victim;
                state.phase = Phase::InProgress {
                    awaiting: Awaiting::ChallengeDecision {
                        challenger: victim,
                        prior_color,
                    },
                };
                reset_stale_declarations(state);
                if let Some(end) = check_round_end(state, who, cfg) {
                    return MoveOutcome {
                        turn_after: None,
                        round_end: Some(end),
                    };
                }
                return MoveOutcome {
                    turn_after: Some(victim),
                    round_end: None,
                };
            }
            if rules.stack_draw_cards {
                state.pending_draw += amount;
            } else {
                let victim = state.advance_from(who, 1);
                draw_n(state, victim, amount as usize);
                advance = 2;
            }
        }
        CardKind::Wild => {}
    }

    reset_stale_declarations(state);

    if let Some(end) = check_round_end(state, who, cfg) {
        return MoveOutcome {
            turn_after: None,
            round_end: Some(end),
        };
    }

    state.turn = state.advance_from(who, advance);
    state.phase = Phase::InProgress {
        awaiting: Awaiting::Move,
    };
    MoveOutcome {
        turn_after: Some(state.turn),
        round_end: None,
    }
}

fn check_round_end(state: &mut GameState, who: Seat, cfg: &EngineConfig) -> Option<RoundEnd> {
    if !state.hands[who].is_empty() {
        return None;
    }

    // Going out on a draw card still lands the penalty on the next
    // player, and those cards count into the award. A final
    // wild-draw-four is not challengeable.
    let pending = state.pending_draw as usize;
    state.pending_draw = 0;
    if pending > 0 {
        let victim = state.advance_from(who, 1);
        draw_n(state, victim, pending);
    }

    let award = round_award(state, who);
    state.scores_total[who] += award;
    let game_over = cfg.winning_score > 0 && state.scores_total[who] >= cfg.winning_score;
    state.phase = if game_over {
        Phase::GameEnded { winner: who }
    } else {
        Phase::RoundEnded { winner: who }
    };
    debug!(
        seat = who,
        award,
        game_over,
        total = state.scores_total[who],
        "round ended"
    );
    Some(RoundEnd {
        winner: who,
        winner_id: state.seats[who],
        points_awarded: award,
        game_over,
    })
}

/// Apply the lazy low-hand penalty: if the previous mover was left on a
/// single undeclared card, the next applied move forces their penalty
/// draw. The engine never runs this off a clock.
fn apply_low_hand_penalty(state: &mut GameState, cfg: &EngineConfig, actor: Seat) {
    if let Some(prev) = state.last_mover {
        if prev != actor && state.hands[prev].len() == 1 && !state.declared[prev] {
            debug!(seat = prev, "missed low-hand declaration, applying penalty");
            draw_n(state, prev, cfg.low_hand_penalty as usize);
        }
    }
}

/// Move `n` cards from the piles into a seat's hand, reshuffling the
/// discard pile underneath the top card whenever the draw pile runs dry.
fn draw_n(state: &mut GameState, seat: Seat, n: usize) -> Vec<Card> {
    let mut drawn = Vec::with_capacity(n);
    for _ in 0..n {
        let seed = state.next_shuffle_seed();
        match state.piles.draw_one(seed) {
            Some(card) => {
                state.hands[seat].push(card);
                drawn.push(card);
            }
            // Every other card is held in hands; nothing left to draw.
            None => break,
        }
    }
    if state.hands[seat].len() > 1 {
        state.declared[seat] = false;
    }
    drawn
}

/// Zero-rotate: every hand moves one seat in the play direction.
fn rotate_hands(state: &mut GameState) {
    let n = state.seat_count();
    let mut rotated: Vec<Vec<Card>> = vec![Vec::new(); n];
    for seat in 0..n {
        let dest = seat_offset(seat, state.direction, n);
        rotated[dest] = std::mem::take(&mut state.hands[seat]);
    }
    state.hands = rotated;
    debug!(direction = state.direction, "zero-rotate moved all hands");
}

/// Declarations only stand while the hand is actually low.
fn reset_stale_declarations(state: &mut GameState) {
    for seat in 0..state.seat_count() {
        if state.hands[seat].len() > 1 {
            state.declared[seat] = false;
        }
    }
}

/// Most common color in a hand, for auto-resolving an abandoned color
/// choice. Falls back to red for an all-wild hand.
fn dominant_color(hand: &[Card]) -> Color {
    let mut best = (Color::Red, 0usize);
    for color in Color::ALL {
        let count = hand.iter().filter(|c| c.color == Some(color)).count();
        if count > best.1 {
            best = (color, count);
        }
    }
    best.0
}
