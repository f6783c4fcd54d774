//! Declarative card decks drawn when a token lands on a deck square.

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::board::SquareFeature;
use crate::constants::{GO_SQUARE, JAIL_SQUARE, STANDARD_DECK_SIZE};
use crate::error::OddsError;
use crate::numbers::card_ratio;

/// Effect printed on a card, before it is resolved against a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum CardEffect {
    Stay,
    MoveTo { square: usize },
    MoveRelative { delta: i64 },
    NearestAhead { feature: SquareFeature },
}

/// `cards` identical cards carrying the same effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardGroup {
    pub cards: u8,
    #[serde(flatten)]
    pub effect: CardEffect,
}

impl CardGroup {
    #[must_use]
    pub const fn new(cards: u8, effect: CardEffect) -> Self {
        Self { cards, effect }
    }
}

pub type CardGroups = SmallVec<[CardGroup; 12]>;

/// A deck of `size` cards split into groups. Each group's weight is the exact
/// rational `cards / size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckSpec {
    pub name: String,
    pub size: u8,
    pub groups: CardGroups,
}

impl DeckSpec {
    /// Sixteen-card Chance deck of the reference board.
    #[must_use]
    pub fn standard_chance() -> Self {
        Self {
            name: String::from("chance"),
            size: STANDARD_DECK_SIZE,
            groups: smallvec![
                CardGroup::new(6, CardEffect::Stay),
                CardGroup::new(1, CardEffect::MoveTo { square: GO_SQUARE }),
                CardGroup::new(1, CardEffect::MoveTo { square: 5 }),
                CardGroup::new(1, CardEffect::MoveTo { square: JAIL_SQUARE }),
                CardGroup::new(1, CardEffect::MoveTo { square: 11 }),
                CardGroup::new(1, CardEffect::MoveTo { square: 24 }),
                CardGroup::new(1, CardEffect::MoveTo { square: 39 }),
                CardGroup::new(1, CardEffect::MoveRelative { delta: -3 }),
                CardGroup::new(
                    2,
                    CardEffect::NearestAhead {
                        feature: SquareFeature::Railroad
                    }
                ),
                CardGroup::new(
                    1,
                    CardEffect::NearestAhead {
                        feature: SquareFeature::Utility
                    }
                ),
            ],
        }
    }

    /// Sixteen-card Community Chest deck of the reference board.
    #[must_use]
    pub fn standard_community_chest() -> Self {
        Self {
            name: String::from("community_chest"),
            size: STANDARD_DECK_SIZE,
            groups: smallvec![
                CardGroup::new(14, CardEffect::Stay),
                CardGroup::new(1, CardEffect::MoveTo { square: GO_SQUARE }),
                CardGroup::new(1, CardEffect::MoveTo { square: JAIL_SQUARE }),
            ],
        }
    }

    #[must_use]
    pub fn card_count(&self) -> u32 {
        self.groups.iter().map(|group| u32::from(group.cards)).sum()
    }

    /// Probability of drawing a card from `group`.
    #[must_use]
    pub fn weight(&self, group: &CardGroup) -> f64 {
        card_ratio(group.cards, self.size)
    }

    /// Check that the card groups exactly fill the deck.
    ///
    /// # Errors
    ///
    /// Returns [`OddsError::EmptyDeck`] for a zero-sized deck and
    /// [`OddsError::DeckClosure`] when card counts do not add up to `size`.
    pub fn validate(&self) -> Result<(), OddsError> {
        if self.size == 0 {
            return Err(OddsError::EmptyDeck {
                deck: self.name.clone(),
            });
        }
        let cards = self.card_count();
        if cards != u32::from(self.size) {
            return Err(OddsError::DeckClosure {
                deck: self.name.clone(),
                cards,
                size: self.size,
            });
        }
        Ok(())
    }
}
