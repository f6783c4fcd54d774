//! Boardodds Engine
//!
//! Long-run square occupancy for a token circling a cyclic board under
//! two-dice rolls, where some squares relocate the token directly and others
//! draw from weighted card decks. The engine builds the one-turn transition
//! matrix, propagates a start distribution by power iteration and ranks the
//! most visited squares. It performs no I/O.

pub mod board;
pub mod config;
pub mod constants;
pub mod deck;
pub mod dice;
pub mod error;
pub mod matrix;
pub mod numbers;
pub mod propagation;
pub mod ranking;
pub mod rules;

// Re-export commonly used types
pub use board::{BoardLayout, SquareFeature, SquareInfo};
pub use config::{BoardConfig, STANDARD_BOARD_JSON};
pub use constants::{BOARD_SIZE, DEFAULT_TOP_K, DEFAULT_TURNS};
pub use deck::{CardEffect, CardGroup, DeckSpec};
pub use dice::{DiceDistribution, DiceSpec};
pub use error::OddsError;
pub use matrix::{DeparturePolicy, TransitionMatrix, TransitionMatrixBuilder};
pub use propagation::{PropagationReport, Propagator, ProbabilityVector, Stopping, propagate};
pub use ranking::{RankedSquare, encode, rank};
pub use rules::{Destination, EventRuleTable, Outcome, SquareRule};

use serde::{Deserialize, Serialize};

/// Trait for abstracting where a board description comes from.
/// Callers with files or network sources provide their own implementation.
pub trait BoardSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the board configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the board description cannot be read or parsed.
    fn load_board(&self) -> Result<BoardConfig, Self::Error>;
}

/// The built-in reference board.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardBoard;

impl BoardSource for StandardBoard {
    type Error = OddsError;

    fn load_board(&self) -> Result<BoardConfig, Self::Error> {
        Ok(BoardConfig::standard())
    }
}

/// A board held as JSON text.
#[derive(Debug, Clone)]
pub struct JsonBoard {
    json: String,
}

impl JsonBoard {
    #[must_use]
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }
}

impl BoardSource for JsonBoard {
    type Error = OddsError;

    fn load_board(&self) -> Result<BoardConfig, Self::Error> {
        BoardConfig::from_json(&self.json)
    }
}

/// Parameters of one occupancy analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub sides: u32,
    pub top_k: usize,
    pub stopping: Stopping,
    pub departure: DeparturePolicy,
    pub start_square: usize,
}

impl Query {
    #[must_use]
    pub fn new(sides: u32) -> Self {
        Self {
            sides,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[must_use]
    pub const fn with_turns(mut self, turns: u32) -> Self {
        self.stopping = Stopping::Fixed { turns };
        self
    }

    #[must_use]
    pub const fn with_stopping(mut self, stopping: Stopping) -> Self {
        self.stopping = stopping;
        self
    }

    #[must_use]
    pub const fn with_departure(mut self, departure: DeparturePolicy) -> Self {
        self.departure = departure;
        self
    }
}

impl Default for Query {
    fn default() -> Self {
        Self {
            sides: constants::DEFAULT_DICE_SIDES,
            top_k: DEFAULT_TOP_K,
            stopping: Stopping::default(),
            departure: DeparturePolicy::default(),
            start_square: constants::GO_SQUARE,
        }
    }
}

/// Result of [`OddsEngine::analyze`].
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub query: Query,
    pub ranked: Vec<RankedSquare>,
    pub encoded: String,
    pub distribution: ProbabilityVector,
    pub turns_run: u32,
    pub last_delta: f64,
    pub converged: bool,
    pub matrix_fingerprint: u64,
}

/// Entry point wiring dice, rules, matrix, propagation and ranking together.
#[derive(Debug, Clone)]
pub struct OddsEngine {
    rules: EventRuleTable,
}

impl OddsEngine {
    #[must_use]
    pub const fn new(rules: EventRuleTable) -> Self {
        Self { rules }
    }

    /// Engine over the reference board.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in board itself is inconsistent.
    pub fn standard() -> Result<Self, OddsError> {
        EventRuleTable::standard().map(Self::new)
    }

    /// Engine over whatever board `source` provides.
    ///
    /// # Errors
    ///
    /// Returns an error if the board cannot be loaded or fails validation.
    pub fn from_source<S>(source: &S) -> Result<Self, anyhow::Error>
    where
        S: BoardSource,
    {
        let config = source.load_board()?;
        let rules = EventRuleTable::from_config(&config)?;
        Ok(Self::new(rules))
    }

    #[must_use]
    pub const fn rules(&self) -> &EventRuleTable {
        &self.rules
    }

    /// One-turn matrix for `sides`-faced dice.
    ///
    /// # Errors
    ///
    /// Returns dice range and matrix construction errors.
    pub fn matrix(
        &self,
        sides: u32,
        departure: DeparturePolicy,
    ) -> Result<TransitionMatrix, OddsError> {
        let dice = DiceDistribution::for_sides(sides)?;
        TransitionMatrixBuilder::new()
            .with_departure(departure)
            .build(&dice, &self.rules)
    }

    /// Run the whole pipeline for `query`.
    ///
    /// # Errors
    ///
    /// Returns configuration errors from matrix construction and precondition
    /// errors for `top_k`, `start_square` or the stopping rule.
    pub fn analyze(&self, query: &Query) -> Result<Analysis, OddsError> {
        if query.top_k == 0 || query.top_k > BOARD_SIZE {
            return Err(OddsError::InvalidTopK {
                k: query.top_k,
                max: BOARD_SIZE,
            });
        }
        if query.start_square >= BOARD_SIZE {
            return Err(OddsError::UnknownSquare {
                field: "query.start_square",
                square: query.start_square,
            });
        }
        let matrix = self.matrix(query.sides, query.departure)?;
        let initial = ProbabilityVector::one_hot(query.start_square)?;
        let report = Propagator::new(query.stopping).run(&matrix, &initial)?;
        let ranked = rank(&report.distribution, query.top_k)?;
        let encoded = encode(&ranked);
        log::info!(
            "{}-sided dice: top {} squares {encoded} after {} turns",
            query.sides,
            query.top_k,
            report.turns_run
        );
        Ok(Analysis {
            query: *query,
            ranked,
            encoded,
            distribution: report.distribution,
            turns_run: report.turns_run,
            last_delta: report.last_delta,
            converged: report.converged,
            matrix_fingerprint: matrix.fingerprint(),
        })
    }

    /// Encoded top-`k` squares after `turns` turns from the start square.
    ///
    /// # Errors
    ///
    /// See [`OddsEngine::analyze`].
    pub fn top_squares(&self, sides: u32, k: usize, turns: u32) -> Result<String, OddsError> {
        let query = Query::new(sides).with_top_k(k).with_turns(turns);
        self.analyze(&query).map(|analysis| analysis.encoded)
    }
}
