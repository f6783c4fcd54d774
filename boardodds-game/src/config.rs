//! Serializable board configuration: layout plus the two card decks.

use serde::{Deserialize, Serialize};

use crate::board::{BoardLayout, SquareFeature};
use crate::constants::BOARD_SIZE;
use crate::deck::{CardEffect, DeckSpec};
use crate::error::OddsError;

/// Reference board in its on-disk form.
pub const STANDARD_BOARD_JSON: &str = include_str!("../assets/standard_board.json");

/// Everything needed to derive an [`crate::EventRuleTable`].
///
/// Missing fields fall back to the reference board, so a file only needs to
/// spell out what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "BoardLayout::standard")]
    pub layout: BoardLayout,
    #[serde(default = "DeckSpec::standard_chance")]
    pub chance: DeckSpec,
    #[serde(default = "DeckSpec::standard_community_chest")]
    pub community_chest: DeckSpec,
}

impl BoardConfig {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            layout: BoardLayout::standard(),
            chance: DeckSpec::standard_chance(),
            community_chest: DeckSpec::standard_community_chest(),
        }
    }

    /// Parse and validate a JSON board description.
    ///
    /// # Errors
    ///
    /// Returns [`OddsError::Json`] for malformed JSON and any validation
    /// error from [`BoardConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, OddsError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check layout size, jail placement, deck closure and card targets.
    ///
    /// # Errors
    ///
    /// Returns the first configuration invariant found to be violated.
    pub fn validate(&self) -> Result<(), OddsError> {
        if self.layout.len() != BOARD_SIZE {
            return Err(OddsError::LayoutSize {
                expected: BOARD_SIZE,
                found: self.layout.len(),
            });
        }
        if self.layout.squares_with(SquareFeature::GoToJail).next().is_some() {
            let jails = self.layout.squares_with(SquareFeature::Jail).count();
            if jails != 1 {
                return Err(OddsError::JailCount { found: jails });
            }
        }
        for deck in [&self.chance, &self.community_chest] {
            deck.validate()?;
            for group in &deck.groups {
                if let CardEffect::MoveTo { square } = group.effect
                    && square >= BOARD_SIZE
                {
                    return Err(OddsError::UnknownSquare {
                        field: "deck.move_to",
                        square,
                    });
                }
            }
        }
        Ok(())
    }

    /// Deck drawn on squares carrying `feature`, if that feature has one.
    #[must_use]
    pub const fn deck_for(&self, feature: SquareFeature) -> Option<&DeckSpec> {
        match feature {
            SquareFeature::Chance => Some(&self.chance),
            SquareFeature::CommunityChest => Some(&self.community_chest),
            _ => None,
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::standard()
    }
}
