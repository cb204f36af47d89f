//! Draw and discard piles with deterministic, seed-driven shuffling.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::domain::cards::{canonical_deck, Card};

/// The two ordered piles of a round. Together with the players' hands
/// they always hold exactly the canonical card multiset: cards move
/// between piles and hands but are never created or destroyed mid-round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piles {
    /// Face-down draw pile; cards are drawn from the back.
    pub draw: Vec<Card>,
    /// Face-up discard pile; the last element is the top card.
    pub discard: Vec<Card>,
}

impl Piles {
    /// The full canonical deck, shuffled into the draw pile.
    pub fn shuffled(seed: u64) -> Self {
        let mut draw = canonical_deck();
        shuffle_with_seed(&mut draw, seed);
        Self {
            draw,
            discard: Vec::new(),
        }
    }

    pub fn top_discard(&self) -> Option<&Card> {
        self.discard.last()
    }

    /// Draw one card, replenishing from the discard pile if the draw
    /// pile is exhausted. Returns `None` only when every other card in
    /// the round is held in hands, which legal play cannot reach with
    /// bounded hand sizes.
    pub fn draw_one(&mut self, reshuffle_seed: u64) -> Option<Card> {
        if self.draw.is_empty() {
            self.replenish(reshuffle_seed);
        }
        self.draw.pop()
    }

    /// Reshuffle the discard pile back into the draw pile, keeping the
    /// top discard in place. Never drops or duplicates a card.
    pub fn replenish(&mut self, seed: u64) {
        if self.discard.len() <= 1 {
            return;
        }
        if let Some(top) = self.discard.pop() {
            self.draw.append(&mut self.discard);
            shuffle_with_seed(&mut self.draw, seed);
            self.discard.push(top);
        }
    }
}

/// Fisher-Yates shuffle with a seeded ChaCha RNG, so a room's entire
/// round is reproducible from its seed.
pub fn shuffle_with_seed(cards: &mut [Card], seed: u64) {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    cards.shuffle(&mut rng);
}
