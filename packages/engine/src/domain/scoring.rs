//! Hand scoring: number cards at face value, action cards at 20,
//! wild cards at 50.

use crate::domain::cards::Card;
use crate::domain::state::{GameState, Seat};

/// Total point value of the cards remaining in a hand.
pub fn hand_points(hand: &[Card]) -> u32 {
    hand.iter().map(Card::point_value).sum()
}

/// Points awarded to the round winner: the sum of every other seat's
/// remaining hand.
pub fn round_award(state: &GameState, winner: Seat) -> u32 {
    state
        .hands
        .iter()
        .enumerate()
        .filter(|(seat, _)| *seat != winner)
        .map(|(_, hand)| hand_points(hand))
        .sum()
}
