//! Play-legality rules and per-room house rule toggles.
//!
//! Everything here is a pure function of its inputs so the validator can
//! be tested exhaustively, independent of the state machine.

use serde::{Deserialize, Serialize};

use crate::domain::cards::{Card, CardKind, Color};

/// Independently toggleable rule variants, fixed at room creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseRules {
    /// Draw-effect cards may be answered with another of the same kind,
    /// accumulating the penalty onto the next player.
    pub stack_draw_cards: bool,
    /// An attribute-identical card may be played out of turn.
    pub jump_in: bool,
    /// Playing a 7 swaps hands with a chosen opponent.
    pub seven_swap: bool,
    /// Playing a 0 rotates all hands one step in the play direction.
    pub zero_rotate: bool,
    /// The victim of a wild-draw-four may challenge it.
    pub challenge_wild_four: bool,
    /// Playing a wild-draw-four while holding a matching color is rejected
    /// outright instead of being a challengeable bluff.
    pub no_bluffing: bool,
}

impl Default for HouseRules {
    fn default() -> Self {
        // Mirrors the default room configuration of the lobby.
        Self {
            stack_draw_cards: true,
            jump_in: false,
            seven_swap: false,
            zero_rotate: false,
            challenge_wild_four: true,
            no_bluffing: false,
        }
    }
}

/// Decide whether `candidate` is legal on `top` under the current state.
///
/// `active_color` is the color constraint left by a prior wild play; it
/// overrides the top card's own color. `pending_draw` is the accumulated
/// draw penalty awaiting the player to act.
pub fn can_play(
    candidate: &Card,
    top: &Card,
    active_color: Option<Color>,
    pending_draw: u8,
    rules: &HouseRules,
) -> bool {
    // A pending penalty narrows the legal set to stack extensions, and
    // only when stacking is on; otherwise the holder must draw.
    if pending_draw > 0 {
        return rules.stack_draw_cards
            && candidate.is_draw_effect()
            && candidate.kind == top.kind;
    }

    if candidate.is_wild() {
        return true;
    }

    if let Some(active) = active_color {
        return candidate.color == Some(active);
    }

    if candidate.color == top.color {
        return true;
    }

    match (candidate.kind, top.kind) {
        (CardKind::Number, CardKind::Number) => candidate.value == top.value,
        (a, b) => a == b,
    }
}

/// Jump-in legality: an attribute-identical card beats turn order.
///
/// The turn-order interrupt itself is resolved by the concurrency layer
/// (first intent to acquire the room wins); this only answers whether the
/// card qualifies.
pub fn is_jump_in(candidate: &Card, top: &Card, rules: &HouseRules) -> bool {
    rules.jump_in && candidate.matches(top)
}
