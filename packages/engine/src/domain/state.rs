//! Authoritative per-room game state and seat/turn math.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cards::{Card, CardId, CardKind, Color};
use crate::domain::deck::Piles;

/// Stable, opaque player identity supplied by the identity collaborator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Seat index into the ordered seat list of a round.
pub type Seat = usize;

/// Pending interaction within an in-progress round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Awaiting {
    /// The seat on turn may play or draw.
    Move,
    /// A wild was played without a color; its effects resolve once the
    /// player who played it chooses one. `prior_color` is the color that
    /// was in force before the wild, kept for a later bluff check.
    ColorChoice { prior_color: Option<Color> },
    /// A wild-draw-four was played and the victim may challenge it.
    /// `prior_color` is the color that was in force before the play and
    /// is what the bluff check is judged against.
    ChallengeDecision {
        challenger: Seat,
        prior_color: Option<Color>,
    },
    /// The seat on turn drew voluntarily and may play the drawn card or pass.
    DrawOrPlay { drawn: CardId },
}

/// Round lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    WaitingForPlayers,
    InProgress { awaiting: Awaiting },
    RoundEnded { winner: Seat },
    GameEnded { winner: Seat },
}

impl Phase {
    pub fn in_progress(&self) -> bool {
        matches!(self, Phase::InProgress { .. })
    }
}

/// One room's authoritative game state for a round in flight.
///
/// Seats are fixed at deal time; a member who leaves mid-round keeps a
/// seat but is marked disconnected and auto-skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Ordered seating, fixed when the round was dealt.
    pub seats: Vec<PlayerId>,
    /// One hand per seat. Order inside a hand is insignificant for the
    /// rules but kept stable for presentation.
    pub hands: Vec<Vec<Card>>,
    pub piles: Piles,
    /// Seat whose move the engine is waiting for.
    pub turn: Seat,
    /// +1 or -1.
    pub direction: i8,
    /// Color constraint left by a wild play; overrides the top card.
    pub active_color: Option<Color>,
    /// Accumulated draw penalty awaiting the seat on turn.
    pub pending_draw: u8,
    /// Low-hand ("final card") declarations, per seat.
    pub declared: Vec<bool>,
    /// Presence flags, per seat.
    pub connected: Vec<bool>,
    /// Cumulative scores across rounds, per seat.
    pub scores_total: Vec<u32>,
    pub phase: Phase,
    /// 1-based round counter within the game.
    pub round_no: u32,
    /// Seat that applied the previous successful move, for the lazy
    /// low-hand penalty check.
    pub last_mover: Option<Seat>,
    /// Seed all shuffles for this round derive from.
    pub rng_seed: u64,
    /// Number of shuffles performed; combined with `rng_seed` to give
    /// each reshuffle a fresh deterministic stream.
    pub shuffle_count: u32,
}

impl GameState {
    /// Deal a fresh round: shuffle, deal `hand_size` cards per seat, and
    /// flip the starting discard. Action and wild cards are rejected as
    /// the starting flip and tucked under the draw pile, so every round
    /// opens on a plain number card.
    pub fn deal(
        seats: Vec<PlayerId>,
        hand_size: usize,
        seed: u64,
        round_no: u32,
        carried_scores: Vec<u32>,
    ) -> Self {
        debug_assert!(seats.len() >= 2);
        debug_assert_eq!(seats.len(), carried_scores.len());

        let n = seats.len();
        let mut piles = Piles::shuffled(seed);
        let mut hands = vec![Vec::with_capacity(hand_size); n];
        for _ in 0..hand_size {
            for hand in hands.iter_mut() {
                if let Some(card) = piles.draw.pop() {
                    hand.push(card);
                }
            }
        }

        // Flip the starting card, rejecting non-number flips. With at
        // most ten seats dealt, number cards always remain in the pile,
        // so one cycle is enough.
        for _ in 0..piles.draw.len() {
            match piles.draw.pop() {
                Some(card) if card.kind == CardKind::Number => {
                    piles.discard.push(card);
                    break;
                }
                Some(card) => piles.draw.insert(0, card),
                None => break,
            }
        }

        Self {
            seats,
            hands,
            piles,
            turn: 0,
            direction: 1,
            active_color: None,
            pending_draw: 0,
            declared: vec![false; n],
            connected: vec![true; n],
            scores_total: carried_scores,
            phase: Phase::InProgress {
                awaiting: Awaiting::Move,
            },
            round_no,
            last_mover: None,
            rng_seed: seed,
            shuffle_count: 0,
        }
    }

    pub fn seat_of(&self, player: PlayerId) -> Option<Seat> {
        self.seats.iter().position(|&p| p == player)
    }

    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    /// Fresh deterministic seed for the next reshuffle.
    pub fn next_shuffle_seed(&mut self) -> u64 {
        self.shuffle_count += 1;
        self.rng_seed
            .wrapping_add(0x9E37_79B9_7F4A_7C15_u64.wrapping_mul(u64::from(self.shuffle_count)))
    }

    /// The seat `steps` connected players away from `from` in the
    /// current direction. Disconnected seats are passed over without
    /// consuming a step; if every other seat is disconnected the turn
    /// stays where it is.
    pub fn advance_from(&self, from: Seat, steps: usize) -> Seat {
        let n = self.seat_count();
        let mut seat = from;
        for _ in 0..steps {
            let mut hops = 0;
            loop {
                seat = seat_offset(seat, self.direction, n);
                hops += 1;
                if self.connected[seat] || hops >= n {
                    break;
                }
            }
        }
        seat
    }

    pub fn flip_direction(&mut self) {
        self.direction = -self.direction;
    }

    /// The color a play must satisfy right now: the active color when a
    /// wild is in force, otherwise the top card's own color.
    pub fn color_in_force(&self) -> Option<Color> {
        self.active_color
            .or_else(|| self.piles.top_discard().and_then(|c| c.color))
    }
}

/// Wrapping seat arithmetic for an `n`-seat table.
#[inline]
pub fn seat_offset(seat: Seat, delta: i8, n: usize) -> Seat {
    let seat_i = seat as i64;
    let delta_i = i64::from(delta);
    (seat_i + delta_i).rem_euclid(n as i64) as Seat
}
