//! Domain layer: pure game logic, no I/O and no locking.

pub mod cards;
pub mod deck;
pub mod machine;
pub mod rules;
pub mod scoring;
pub mod snapshot;
pub mod state;

#[cfg(test)]
mod tests_machine;
#[cfg(test)]
mod tests_props_legality;

// Re-exports for ergonomics
pub use cards::{canonical_deck, Card, CardId, CardKind, Color, DECK_SIZE};
pub use machine::{MoveOutcome, PlayRequest, RoundEnd};
pub use rules::{can_play, is_jump_in, HouseRules};
pub use state::{Awaiting, GameState, Phase, PlayerId, Seat};
