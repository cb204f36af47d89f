//! Core card types: Color, CardKind, Card, and the canonical deck.

use serde::{Deserialize, Serialize};

/// The four suit colors. Wild cards carry no color of their own.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Yellow,
    Green,
    Blue,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Yellow, Color::Green, Color::Blue];
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    Number,
    Skip,
    Reverse,
    DrawTwo,
    Wild,
    WildDrawFour,
}

/// Stable identity of a physical card: its index in the canonical deck.
///
/// Two red fives are distinct cards with distinct ids.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct CardId(pub u16);

/// An immutable card. Equality is by identity ([`CardId`]), never by
/// attributes; use [`Card::matches`] for attribute comparison.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// `None` for wild cards.
    pub color: Option<Color>,
    pub kind: CardKind,
    /// `Some(0..=9)` when `kind` is `Number`, `None` otherwise.
    pub value: Option<u8>,
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Card {}

impl std::hash::Hash for Card {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Card {
    pub fn is_wild(&self) -> bool {
        matches!(self.kind, CardKind::Wild | CardKind::WildDrawFour)
    }

    /// Cards that force the next player to draw.
    pub fn is_draw_effect(&self) -> bool {
        matches!(self.kind, CardKind::DrawTwo | CardKind::WildDrawFour)
    }

    /// How many cards this card forces the next player to draw.
    pub fn draw_amount(&self) -> u8 {
        match self.kind {
            CardKind::DrawTwo => 2,
            CardKind::WildDrawFour => 4,
            _ => 0,
        }
    }

    /// Attribute identity: same color, kind, and value. This is the
    /// jump-in criterion, deliberately ignoring [`CardId`].
    pub fn matches(&self, other: &Card) -> bool {
        self.color == other.color && self.kind == other.kind && self.value == other.value
    }

    /// Score weight of a card left in a losing hand.
    pub fn point_value(&self) -> u32 {
        match self.kind {
            CardKind::Number => u32::from(self.value.unwrap_or(0)),
            CardKind::Skip | CardKind::Reverse | CardKind::DrawTwo => 20,
            CardKind::Wild | CardKind::WildDrawFour => 50,
        }
    }
}

/// Size of the canonical card set.
pub const DECK_SIZE: usize = 108;

/// Build the canonical 108-card set in a fixed order.
///
/// Per color: one 0, two each of 1-9, two each of Skip/Reverse/DrawTwo.
/// Plus four Wild and four WildDrawFour. Ids are dense `0..108`.
pub fn canonical_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    let mut next_id = 0u16;
    let mut push = |deck: &mut Vec<Card>, color: Option<Color>, kind: CardKind, value: Option<u8>| {
        deck.push(Card {
            id: CardId(next_id),
            color,
            kind,
            value,
        });
        next_id += 1;
    };

    for color in Color::ALL {
        push(&mut deck, Some(color), CardKind::Number, Some(0));
        for value in 1..=9u8 {
            for _ in 0..2 {
                push(&mut deck, Some(color), CardKind::Number, Some(value));
            }
        }
        for kind in [CardKind::Skip, CardKind::Reverse, CardKind::DrawTwo] {
            for _ in 0..2 {
                push(&mut deck, Some(color), kind, None);
            }
        }
    }
    for _ in 0..4 {
        push(&mut deck, None, CardKind::Wild, None);
    }
    for _ in 0..4 {
        push(&mut deck, None, CardKind::WildDrawFour, None);
    }

    debug_assert_eq!(deck.len(), DECK_SIZE);
    deck
}
