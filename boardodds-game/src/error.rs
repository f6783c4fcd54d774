use thiserror::Error;

use crate::board::SquareFeature;

/// Errors raised when board configuration or engine preconditions are violated.
///
/// Every variant is fatal for the request that produced it: a rule table,
/// matrix or distribution is never handed out in a partially valid state.
#[derive(Debug, Error, PartialEq)]
pub enum OddsError {
    #[error("dice must have between 1 and {max} sides (got {sides})")]
    InvalidDice { sides: u32, max: u32 },
    #[error("board layout must have {expected} squares (got {found})")]
    LayoutSize { expected: usize, found: usize },
    #[error("{field} references square {square}, outside the board")]
    UnknownSquare { field: &'static str, square: usize },
    #[error("deck `{deck}` holds {cards} cards but declares a size of {size}")]
    DeckClosure { deck: String, cards: u32, size: u8 },
    #[error("deck `{deck}` has no cards")]
    EmptyDeck { deck: String },
    #[error("no {feature:?} square ahead of square {from}")]
    MissingFeature { feature: SquareFeature, from: usize },
    #[error("board must contain exactly one jail square when it has a go-to-jail square (found {found})")]
    JailCount { found: usize },
    #[error("relocations starting at square {origin} chain deeper than {max} steps")]
    ChainTooDeep { origin: usize, max: u8 },
    #[error("transition row {row} sums to {sum:.12}, expected 1")]
    RowNotStochastic { row: usize, sum: f64 },
    #[error("initial distribution sums to {sum:.12}, expected 1")]
    NotNormalized { sum: f64 },
    #[error("square {square} has negative probability {value}")]
    NegativeProbability { square: usize, value: f64 },
    #[error("distribution drifted to {sum:.12} after turn {turn}")]
    DistributionDrift { turn: u32, sum: f64 },
    #[error("top-k must be between 1 and {max} (got {k})")]
    InvalidTopK { k: usize, max: usize },
    #[error("convergence tolerance must be positive and finite (got {tolerance})")]
    InvalidTolerance { tolerance: f64 },
    #[error("board config is not valid JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for OddsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
