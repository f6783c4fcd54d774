//! Probability mass of the sum of two identical fair dice.

use serde::{Deserialize, Serialize};

use crate::constants::MAX_DICE_SIDES;
use crate::error::OddsError;
use crate::numbers::u32_to_f64;

/// Face count of each of the two dice rolled per turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceSpec {
    sides: u32,
}

impl DiceSpec {
    /// Validate a face count.
    ///
    /// # Errors
    ///
    /// Returns [`OddsError::InvalidDice`] when `sides` is zero or above
    /// [`MAX_DICE_SIDES`].
    pub fn new(sides: u32) -> Result<Self, OddsError> {
        if sides == 0 || sides > MAX_DICE_SIDES {
            return Err(OddsError::InvalidDice {
                sides,
                max: MAX_DICE_SIDES,
            });
        }
        Ok(Self { sides })
    }

    #[must_use]
    pub const fn sides(self) -> u32 {
        self.sides
    }

    #[must_use]
    pub fn distribution(self) -> DiceDistribution {
        DiceDistribution::from_spec(self)
    }
}

/// PMF over two-dice sums, indexed by sum.
///
/// Index `s` holds `p(s)`; indices below 2 are always zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DiceDistribution {
    spec: DiceSpec,
    by_sum: Vec<f64>,
}

impl DiceDistribution {
    /// Build the distribution for two dice of `sides` faces each.
    ///
    /// # Errors
    ///
    /// Returns [`OddsError::InvalidDice`] when `sides` is out of range.
    pub fn for_sides(sides: u32) -> Result<Self, OddsError> {
        DiceSpec::new(sides).map(Self::from_spec)
    }

    fn from_spec(spec: DiceSpec) -> Self {
        let sides = spec.sides() as usize;
        let mut counts = vec![0_u32; 2 * sides + 1];
        for first in 1..=sides {
            for second in 1..=sides {
                counts[first + second] += 1;
            }
        }
        let outcomes = u32_to_f64(spec.sides() * spec.sides());
        let by_sum = counts
            .into_iter()
            .map(|count| u32_to_f64(count) / outcomes)
            .collect();
        Self { spec, by_sum }
    }

    #[must_use]
    pub const fn spec(&self) -> DiceSpec {
        self.spec
    }

    #[must_use]
    pub const fn min_sum(&self) -> usize {
        2
    }

    #[must_use]
    pub const fn max_sum(&self) -> usize {
        2 * self.spec.sides() as usize
    }

    /// Probability of rolling exactly `sum`; zero for unreachable sums.
    #[must_use]
    pub fn probability(&self, sum: usize) -> f64 {
        self.by_sum.get(sum).copied().unwrap_or(0.0)
    }

    /// Reachable `(sum, probability)` pairs in ascending sum order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.by_sum
            .iter()
            .copied()
            .enumerate()
            .skip(self.min_sum())
            .filter(|&(_, p)| p > 0.0)
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.by_sum.iter().sum()
    }
}
