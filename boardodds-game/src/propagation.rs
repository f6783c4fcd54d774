//! Power iteration of an occupancy distribution through a transition matrix.

use serde::{Deserialize, Serialize};

use crate::constants::{
    BOARD_SIZE, DEFAULT_CONVERGENCE_CAP, DEFAULT_CONVERGENCE_TOLERANCE, DEFAULT_TURNS, GO_SQUARE,
    STOCHASTIC_TOLERANCE,
};
use crate::error::OddsError;
use crate::matrix::TransitionMatrix;

/// Occupancy probability of every square; entries are non-negative and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityVector {
    values: [f64; BOARD_SIZE],
}

impl ProbabilityVector {
    /// One-hot vector on the start square.
    #[must_use]
    pub fn start() -> Self {
        let mut values = [0.0; BOARD_SIZE];
        values[GO_SQUARE] = 1.0;
        Self { values }
    }

    /// All mass on `square`.
    ///
    /// # Errors
    ///
    /// Returns [`OddsError::UnknownSquare`] when `square` is off the board.
    pub fn one_hot(square: usize) -> Result<Self, OddsError> {
        if square >= BOARD_SIZE {
            return Err(OddsError::UnknownSquare {
                field: "initial.square",
                square,
            });
        }
        let mut values = [0.0; BOARD_SIZE];
        values[square] = 1.0;
        Ok(Self { values })
    }

    /// Wrap raw values after checking they form a distribution.
    ///
    /// # Errors
    ///
    /// Returns [`OddsError::NegativeProbability`] or [`OddsError::NotNormalized`].
    pub fn from_values(values: [f64; BOARD_SIZE]) -> Result<Self, OddsError> {
        let vector = Self { values };
        vector.check()?;
        Ok(vector)
    }

    #[must_use]
    pub const fn values(&self) -> &[f64; BOARD_SIZE] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, square: usize) -> f64 {
        self.values[square]
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// L1 distance to `other`.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).abs())
            .sum()
    }

    fn check(&self) -> Result<(), OddsError> {
        if let Some((square, &value)) = self
            .values
            .iter()
            .enumerate()
            .find(|&(_, &p)| p < 0.0 || !p.is_finite())
        {
            return Err(OddsError::NegativeProbability { square, value });
        }
        let sum = self.total();
        if (sum - 1.0).abs() > STOCHASTIC_TOLERANCE {
            return Err(OddsError::NotNormalized { sum });
        }
        Ok(())
    }

    /// `self * matrix`: the distribution one turn later.
    #[must_use]
    pub fn step(&self, matrix: &TransitionMatrix) -> Self {
        let mut next = [0.0; BOARD_SIZE];
        for (from, &mass) in self.values.iter().enumerate() {
            if mass == 0.0 {
                continue;
            }
            for (to, &p) in matrix.row(from).iter().enumerate() {
                next[to] += mass * p;
            }
        }
        Self { values: next }
    }

    fn renormalize(&mut self, sum: f64) {
        for value in &mut self.values {
            *value /= sum;
        }
    }
}

impl Default for ProbabilityVector {
    fn default() -> Self {
        Self::start()
    }
}

/// When power iteration stops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stopping {
    /// Exactly this many turns.
    Fixed { turns: u32 },
    /// Until the L1 change of one turn drops below `tolerance`, or `max_turns`.
    Converged { tolerance: f64, max_turns: u32 },
}

impl Default for Stopping {
    fn default() -> Self {
        Self::Fixed {
            turns: DEFAULT_TURNS,
        }
    }
}

impl Stopping {
    #[must_use]
    pub const fn converged() -> Self {
        Self::Converged {
            tolerance: DEFAULT_CONVERGENCE_TOLERANCE,
            max_turns: DEFAULT_CONVERGENCE_CAP,
        }
    }

    const fn max_turns(self) -> u32 {
        match self {
            Self::Fixed { turns } => turns,
            Self::Converged { max_turns, .. } => max_turns,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagationReport {
    pub distribution: ProbabilityVector,
    pub turns_run: u32,
    /// L1 change during the last turn; zero when no turn ran.
    pub last_delta: f64,
    /// Always false for fixed stopping.
    pub converged: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Propagator {
    stopping: Stopping,
}

impl Propagator {
    #[must_use]
    pub const fn new(stopping: Stopping) -> Self {
        Self { stopping }
    }

    #[must_use]
    pub const fn fixed(turns: u32) -> Self {
        Self::new(Stopping::Fixed { turns })
    }

    #[must_use]
    pub const fn stopping(&self) -> Stopping {
        self.stopping
    }

    /// Iterate `initial` through `matrix` until the stopping rule fires.
    ///
    /// The working vector is renormalized after every turn; drift beyond
    /// [`STOCHASTIC_TOLERANCE`] is reported instead of being absorbed.
    ///
    /// # Errors
    ///
    /// Returns [`OddsError::NotNormalized`] or
    /// [`OddsError::NegativeProbability`] for a bad `initial` vector,
    /// [`OddsError::InvalidTolerance`] for a non-positive tolerance and
    /// [`OddsError::DistributionDrift`] when a turn loses or gains mass.
    pub fn run(
        &self,
        matrix: &TransitionMatrix,
        initial: &ProbabilityVector,
    ) -> Result<PropagationReport, OddsError> {
        initial.check()?;
        let tolerance = match self.stopping {
            Stopping::Fixed { .. } => None,
            Stopping::Converged { tolerance, .. } => {
                if !(tolerance.is_finite() && tolerance > 0.0) {
                    return Err(OddsError::InvalidTolerance { tolerance });
                }
                Some(tolerance)
            }
        };

        let mut current = *initial;
        let mut last_delta = 0.0;
        let mut turns_run = 0;
        let mut converged = false;
        for turn in 1..=self.stopping.max_turns() {
            let mut next = current.step(matrix);
            let sum = next.total();
            if (sum - 1.0).abs() > STOCHASTIC_TOLERANCE {
                return Err(OddsError::DistributionDrift { turn, sum });
            }
            next.renormalize(sum);
            last_delta = next.distance(&current);
            current = next;
            turns_run = turn;
            if tolerance.is_some_and(|tol| last_delta < tol) {
                converged = true;
                break;
            }
        }
        log::debug!(
            "propagated {turns_run} turns ({:?}), last delta {last_delta:.3e}, converged {converged}",
            self.stopping
        );
        Ok(PropagationReport {
            distribution: current,
            turns_run,
            last_delta,
            converged,
        })
    }
}

/// Apply `matrix` to `initial` exactly `turns` times.
///
/// # Errors
///
/// See [`Propagator::run`].
pub fn propagate(
    matrix: &TransitionMatrix,
    initial: &ProbabilityVector,
    turns: u32,
) -> Result<ProbabilityVector, OddsError> {
    Propagator::fixed(turns)
        .run(matrix, initial)
        .map(|report| report.distribution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::DiceDistribution;
    use crate::matrix::TransitionMatrixBuilder;
    use crate::rules::EventRuleTable;

    fn matrix(sides: u32) -> TransitionMatrix {
        let dice = DiceDistribution::for_sides(sides).unwrap();
        let rules = EventRuleTable::standard().unwrap();
        TransitionMatrixBuilder::new().build(&dice, &rules).unwrap()
    }

    #[test]
    fn zero_turns_returns_initial() {
        let m = matrix(6);
        let start = ProbabilityVector::start();
        assert_eq!(propagate(&m, &start, 0).unwrap(), start);
    }

    #[test]
    fn mass_is_conserved_every_turn() {
        let m = matrix(6);
        let mut v = ProbabilityVector::start();
        for turns in 0..100 {
            let out = propagate(&m, &v, turns).unwrap();
            assert!((out.total() - 1.0).abs() < STOCHASTIC_TOLERANCE, "turns {turns}");
            v = out;
        }
    }

    #[test]
    fn one_turn_from_start_is_first_matrix_row() {
        let m = matrix(6);
        let out = propagate(&m, &ProbabilityVector::start(), 1).unwrap();
        for to in 0..BOARD_SIZE {
            assert!((out.get(to) - m.get(0, to)).abs() < 1e-15);
        }
    }

    #[test]
    fn converged_stopping_reaches_fixed_point() {
        let m = matrix(6);
        let report = Propagator::new(Stopping::converged())
            .run(&m, &ProbabilityVector::start())
            .unwrap();
        assert!(report.converged);
        assert!(report.turns_run < DEFAULT_CONVERGENCE_CAP);
        let after = report.distribution.step(&m);
        assert!(after.distance(&report.distribution) < 1e-11);
    }

    #[test]
    fn stationary_distribution_is_independent_of_start() {
        let m = matrix(6);
        let from_go = Propagator::new(Stopping::converged())
            .run(&m, &ProbabilityVector::start())
            .unwrap();
        let from_jail = Propagator::new(Stopping::converged())
            .run(&m, &ProbabilityVector::one_hot(10).unwrap())
            .unwrap();
        assert!(from_go.distribution.distance(&from_jail.distribution) < 1e-9);
    }

    #[test]
    fn one_hot_rejects_off_board_square() {
        assert_eq!(
            ProbabilityVector::one_hot(BOARD_SIZE),
            Err(OddsError::UnknownSquare {
                field: "initial.square",
                square: BOARD_SIZE,
            })
        );
        let last = ProbabilityVector::one_hot(BOARD_SIZE - 1).unwrap();
        assert!((last.get(BOARD_SIZE - 1) - 1.0).abs() < f64::EPSILON);
        assert_eq!(ProbabilityVector::start(), ProbabilityVector::one_hot(0).unwrap());
    }

    #[test]
    fn rejects_unnormalized_initial_vector() {
        let m = matrix(6);
        let mut values = [0.0; BOARD_SIZE];
        values[0] = 0.5;
        assert!(matches!(
            ProbabilityVector::from_values(values),
            Err(OddsError::NotNormalized { .. })
        ));
        values[1] = 0.75;
        values[2] = -0.25;
        assert!(matches!(
            ProbabilityVector::from_values(values),
            Err(OddsError::NegativeProbability { square: 2, .. })
        ));
        let bogus = ProbabilityVector { values };
        assert!(propagate(&m, &bogus, 3).is_err());
    }

    #[test]
    fn rejects_non_positive_tolerance() {
        let m = matrix(6);
        let propagator = Propagator::new(Stopping::Converged {
            tolerance: 0.0,
            max_turns: 10,
        });
        assert_eq!(
            propagator.run(&m, &ProbabilityVector::start()),
            Err(OddsError::InvalidTolerance { tolerance: 0.0 })
        );
    }
}
