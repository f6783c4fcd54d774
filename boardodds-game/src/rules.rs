//! Per-square movement rules with every card effect resolved to a square.

use smallvec::SmallVec;

use crate::board::{BoardLayout, SquareFeature};
use crate::config::BoardConfig;
use crate::constants::BOARD_SIZE;
use crate::deck::{CardEffect, DeckSpec};
use crate::error::OddsError;
use crate::numbers::{card_ratio, wrap_square};

/// Where a drawn card leaves the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Stay,
    Square(usize),
}

impl Destination {
    /// Concrete square for a card drawn on `origin`.
    #[must_use]
    pub const fn resolve(self, origin: usize) -> usize {
        match self {
            Self::Stay => origin,
            Self::Square(square) => square,
        }
    }
}

/// One resolved card group of a deck square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub cards: u8,
    pub deck_size: u8,
    pub destination: Destination,
}

impl Outcome {
    #[must_use]
    pub fn weight(&self) -> f64 {
        card_ratio(self.cards, self.deck_size)
    }
}

pub type Outcomes = SmallVec<[Outcome; 12]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquareRule {
    Plain,
    DirectJump { target: usize },
    Deck { deck: String, outcomes: Outcomes },
}

/// Immutable rule for every square of one board configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRuleTable {
    layout: BoardLayout,
    rules: Vec<SquareRule>,
}

impl EventRuleTable {
    /// Rules of the reference board.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in board itself is inconsistent.
    pub fn standard() -> Result<Self, OddsError> {
        Self::from_config(&BoardConfig::standard())
    }

    /// Validate `config` and resolve every square's rule against its layout.
    ///
    /// # Errors
    ///
    /// Returns any [`BoardConfig::validate`] error, or
    /// [`OddsError::MissingFeature`] when a nearest-ahead card has no target.
    pub fn from_config(config: &BoardConfig) -> Result<Self, OddsError> {
        config.validate()?;
        let layout = &config.layout;
        let jail = layout.squares_with(SquareFeature::Jail).next();
        let mut rules = Vec::with_capacity(BOARD_SIZE);
        for square in 0..BOARD_SIZE {
            let feature = layout.feature(square).ok_or(OddsError::LayoutSize {
                expected: BOARD_SIZE,
                found: layout.len(),
            })?;
            let rule = match (feature, config.deck_for(feature)) {
                (SquareFeature::GoToJail, _) => SquareRule::DirectJump {
                    target: jail.ok_or(OddsError::JailCount { found: 0 })?,
                },
                (_, Some(deck)) => SquareRule::Deck {
                    deck: deck.name.clone(),
                    outcomes: resolve_deck(deck, layout, square)?,
                },
                _ => SquareRule::Plain,
            };
            rules.push(rule);
        }
        log::debug!(
            "resolved rule table: {} deck squares, {} jump squares",
            rules
                .iter()
                .filter(|r| matches!(r, SquareRule::Deck { .. }))
                .count(),
            rules
                .iter()
                .filter(|r| matches!(r, SquareRule::DirectJump { .. }))
                .count()
        );
        Ok(Self {
            layout: layout.clone(),
            rules,
        })
    }

    /// # Panics
    ///
    /// Panics if `square` is not below [`BOARD_SIZE`].
    #[must_use]
    pub fn rule(&self, square: usize) -> &SquareRule {
        &self.rules[square]
    }

    #[must_use]
    pub const fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &SquareRule)> {
        self.rules.iter().enumerate()
    }

    #[must_use]
    pub fn is_deck(&self, square: usize) -> bool {
        matches!(self.rule(square), SquareRule::Deck { .. })
    }
}

fn resolve_deck(
    deck: &DeckSpec,
    layout: &BoardLayout,
    origin: usize,
) -> Result<Outcomes, OddsError> {
    deck.groups
        .iter()
        .filter(|group| group.cards > 0)
        .map(|group| {
            let destination = match group.effect {
                CardEffect::Stay => Destination::Stay,
                CardEffect::MoveTo { square } => Destination::Square(square),
                CardEffect::MoveRelative { delta } => {
                    Destination::Square(wrap_square(origin, delta, layout.len()))
                }
                CardEffect::NearestAhead { feature } => Destination::Square(
                    layout
                        .nearest_ahead(origin, feature)
                        .ok_or(OddsError::MissingFeature {
                            feature,
                            from: origin,
                        })?,
                ),
            };
            Ok(Outcome {
                cards: group.cards,
                deck_size: deck.size,
                destination,
            })
        })
        .collect()
}
