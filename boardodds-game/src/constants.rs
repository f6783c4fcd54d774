//! Centralized board and numeric constants for the boardodds engine.
//!
//! The reference board is fixed at compile time so that matrices and
//! probability vectors can live in plain arrays. Tolerances are shared by
//! the builder, the propagator and the tests.

// Board geometry -----------------------------------------------------------
/// Number of squares on the cyclic board.
pub const BOARD_SIZE: usize = 40;
pub const GO_SQUARE: usize = 0;
pub const JAIL_SQUARE: usize = 10;
pub const GO_TO_JAIL_SQUARE: usize = 30;
pub const CHANCE_SQUARES: [usize; 3] = [7, 22, 36];
pub const COMMUNITY_CHEST_SQUARES: [usize; 3] = [2, 17, 33];
pub const RAILROAD_SQUARES: [usize; 4] = [5, 15, 25, 35];
pub const UTILITY_SQUARES: [usize; 2] = [12, 28];

// Decks --------------------------------------------------------------------
pub const STANDARD_DECK_SIZE: u8 = 16;

// Dice ---------------------------------------------------------------------
pub const DEFAULT_DICE_SIDES: u32 = 6;
pub const MAX_DICE_SIDES: u32 = 64;

// Propagation --------------------------------------------------------------
pub const DEFAULT_TURNS: u32 = 40;
pub const DEFAULT_TOP_K: usize = 3;
/// Allowed deviation of a row or vector sum from 1.0.
pub const STOCHASTIC_TOLERANCE: f64 = 1e-9;
pub const DEFAULT_CONVERGENCE_TOLERANCE: f64 = 1e-12;
pub const DEFAULT_CONVERGENCE_CAP: u32 = 10_000;

// Rule resolution ----------------------------------------------------------
/// Maximum number of chained relocations followed for a single arrival.
pub const MAX_CHAIN_DEPTH: u8 = 8;
