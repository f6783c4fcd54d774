//! Top-K ranking of squares and the compact two-digit encoding.

use std::cmp::Ordering;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::constants::BOARD_SIZE;
use crate::error::OddsError;
use crate::propagation::ProbabilityVector;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedSquare {
    pub index: usize,
    pub probability: f64,
}

/// Probability descending, then index ascending.
fn by_rank(a: &RankedSquare, b: &RankedSquare) -> Ordering {
    b.probability
        .total_cmp(&a.probability)
        .then_with(|| a.index.cmp(&b.index))
}

/// The `k` most occupied squares of `distribution`.
///
/// # Errors
///
/// Returns [`OddsError::InvalidTopK`] unless `1 <= k <= BOARD_SIZE`.
pub fn rank(distribution: &ProbabilityVector, k: usize) -> Result<Vec<RankedSquare>, OddsError> {
    if k == 0 || k > BOARD_SIZE {
        return Err(OddsError::InvalidTopK { k, max: BOARD_SIZE });
    }
    let mut ranked: Vec<RankedSquare> = distribution
        .values()
        .iter()
        .enumerate()
        .map(|(index, &probability)| RankedSquare { index, probability })
        .collect();
    ranked.sort_by(by_rank);
    ranked.truncate(k);
    Ok(ranked)
}

/// Concatenate zero-padded two-digit indices in rank order, e.g. `"102400"`.
#[must_use]
pub fn encode(ranked: &[RankedSquare]) -> String {
    ranked
        .iter()
        .fold(String::with_capacity(ranked.len() * 2), |mut out, square| {
            let _ = write!(out, "{:02}", square.index);
            out
        })
}
