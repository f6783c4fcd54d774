//! One-turn transition matrix construction.
//!
//! Each row folds the dice distribution through the rule table: a roll moves
//! the token, and whatever it lands on (jump square, card square) relocates it
//! again until it settles. Rows are verified to be stochastic before the
//! matrix is handed out.

use std::hash::Hasher;

use serde::{Deserialize, Serialize};
use twox_hash::XxHash64;

use crate::constants::{BOARD_SIZE, MAX_CHAIN_DEPTH, STOCHASTIC_TOLERANCE};
use crate::dice::DiceDistribution;
use crate::error::OddsError;
use crate::rules::{Destination, EventRuleTable, SquareRule};

pub type Row = [f64; BOARD_SIZE];

/// How a turn that starts on a card square is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeparturePolicy {
    /// Every turn starts with a dice roll; cards only apply where the roll lands.
    #[default]
    RollDice,
    /// A turn starting on a card square draws from its deck instead of rolling.
    ResolveDeck,
}

/// Row-stochastic `BOARD_SIZE x BOARD_SIZE` matrix; entry `[i][j]` is the
/// probability of ending a turn on `j` after starting it on `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix {
    rows: Box<[Row; BOARD_SIZE]>,
}

impl TransitionMatrix {
    #[must_use]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.rows[from][to]
    }

    #[must_use]
    pub fn row(&self, from: usize) -> &Row {
        &self.rows[from]
    }

    #[must_use]
    pub fn row_sum(&self, from: usize) -> f64 {
        self.rows[from].iter().sum()
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Hash of every entry's bit pattern; equal fingerprints mean bit-identical matrices.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = XxHash64::with_seed(0);
        for value in self.rows.iter().flatten() {
            hasher.write_u64(value.to_bits());
        }
        hasher.finish()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionMatrixBuilder {
    departure: DeparturePolicy,
}

impl TransitionMatrixBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            departure: DeparturePolicy::RollDice,
        }
    }

    #[must_use]
    pub const fn with_departure(mut self, departure: DeparturePolicy) -> Self {
        self.departure = departure;
        self
    }

    #[must_use]
    pub const fn departure(&self) -> DeparturePolicy {
        self.departure
    }

    /// Build the one-turn matrix for `dice` on the board described by `rules`.
    ///
    /// # Errors
    ///
    /// Returns [`OddsError::ChainTooDeep`] when relocations loop, and
    /// [`OddsError::RowNotStochastic`] when a row does not sum to 1.
    pub fn build(
        &self,
        dice: &DiceDistribution,
        rules: &EventRuleTable,
    ) -> Result<TransitionMatrix, OddsError> {
        let mut rows = Box::new([[0.0; BOARD_SIZE]; BOARD_SIZE]);
        for (from, row) in rows.iter_mut().enumerate() {
            match rules.rule(from) {
                SquareRule::DirectJump { target } => row[*target] = 1.0,
                SquareRule::Deck { .. } if self.departure == DeparturePolicy::ResolveDeck => {
                    resolve_departure_deck(rules, from, row)?;
                }
                _ => {
                    for (sum, p) in dice.iter() {
                        let landing = (from + sum) % BOARD_SIZE;
                        resolve_arrival(rules, landing, landing, p, 0, row)?;
                    }
                }
            }
            let sum: f64 = row.iter().sum();
            if (sum - 1.0).abs() > STOCHASTIC_TOLERANCE {
                return Err(OddsError::RowNotStochastic { row: from, sum });
            }
        }
        let matrix = TransitionMatrix { rows };
        log::debug!(
            "built transition matrix for {}-sided dice ({:?}), fingerprint {:016x}",
            dice.spec().sides(),
            self.departure,
            matrix.fingerprint()
        );
        Ok(matrix)
    }
}

/// Add `mass` arriving on `square` to `row`, following any relocation the
/// square triggers. `origin` is the square the chain started from and is
/// only used for error reporting.
///
/// # Errors
///
/// Returns [`OddsError::ChainTooDeep`] after [`MAX_CHAIN_DEPTH`] relocations.
pub fn resolve_arrival(
    rules: &EventRuleTable,
    origin: usize,
    square: usize,
    mass: f64,
    depth: u8,
    row: &mut Row,
) -> Result<(), OddsError> {
    if depth > MAX_CHAIN_DEPTH {
        return Err(OddsError::ChainTooDeep {
            origin,
            max: MAX_CHAIN_DEPTH,
        });
    }
    match rules.rule(square) {
        SquareRule::Plain => row[square] += mass,
        SquareRule::DirectJump { target } => {
            resolve_arrival(rules, origin, *target, mass, depth + 1, row)?;
        }
        SquareRule::Deck { outcomes, .. } => {
            for outcome in outcomes {
                let share = mass * outcome.weight();
                match outcome.destination {
                    Destination::Square(next) if next != square => {
                        resolve_arrival(rules, origin, next, share, depth + 1, row)?;
                    }
                    _ => row[square] += share,
                }
            }
        }
    }
    Ok(())
}

/// Fill `row` for a turn that starts on deck square `from` and draws a card
/// without rolling.
///
/// # Errors
///
/// Returns [`OddsError::ChainTooDeep`] when the drawn card starts a loop.
pub fn resolve_departure_deck(
    rules: &EventRuleTable,
    from: usize,
    row: &mut Row,
) -> Result<(), OddsError> {
    let SquareRule::Deck { outcomes, .. } = rules.rule(from) else {
        row[from] += 1.0;
        return Ok(());
    };
    for outcome in outcomes {
        match outcome.destination {
            Destination::Square(next) if next != from => {
                resolve_arrival(rules, from, next, outcome.weight(), 1, row)?;
            }
            _ => row[from] += outcome.weight(),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{GO_TO_JAIL_SQUARE, JAIL_SQUARE};

    fn standard_matrix(sides: u32, departure: DeparturePolicy) -> TransitionMatrix {
        let dice = DiceDistribution::for_sides(sides).unwrap();
        let rules = EventRuleTable::standard().unwrap();
        TransitionMatrixBuilder::new()
            .with_departure(departure)
            .build(&dice, &rules)
            .unwrap()
    }

    #[test]
    fn rows_are_stochastic_for_tested_dice() {
        for sides in [1, 2, 4, 6, 12, 40] {
            let matrix = standard_matrix(sides, DeparturePolicy::RollDice);
            for from in 0..BOARD_SIZE {
                assert!(
                    (matrix.row_sum(from) - 1.0).abs() < STOCHASTIC_TOLERANCE,
                    "sides {sides} row {from}"
                );
                assert!(matrix.row(from).iter().all(|&p| p >= 0.0));
            }
        }
    }

    #[test]
    fn go_to_jail_row_is_absorbed_by_jail() {
        let matrix = standard_matrix(6, DeparturePolicy::RollDice);
        for to in 0..BOARD_SIZE {
            let expected = if to == JAIL_SQUARE { 1.0 } else { 0.0 };
            assert!((matrix.get(GO_TO_JAIL_SQUARE, to) - expected).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn landing_on_go_to_jail_is_never_recorded() {
        let matrix = standard_matrix(6, DeparturePolicy::RollDice);
        for from in 0..BOARD_SIZE {
            assert!(matrix.get(from, GO_TO_JAIL_SQUARE).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn plain_row_matches_dice_distribution() {
        let matrix = standard_matrix(6, DeparturePolicy::RollDice);
        // From square 10 every reachable landing (12..=22) except 17 and 22 is plain.
        assert!((matrix.get(10, 13) - 2.0 / 36.0).abs() < 1e-15);
        assert!((matrix.get(10, 16) - 5.0 / 36.0).abs() < 1e-15);
        let chest_stay = 6.0 / 36.0 * 14.0 / 16.0;
        assert!((matrix.get(10, 17) - chest_stay).abs() < 1e-15);
    }

    #[test]
    fn chained_back_three_reaches_community_chest_outcomes() {
        let matrix = standard_matrix(6, DeparturePolicy::RollDice);
        // 34 + 2 lands on CH3; "back 3" moves to CC3, whose "go" card reaches square 0.
        let chest_from_chance = 1.0 / 36.0 * (1.0 / 16.0) * (14.0 / 16.0);
        assert!((matrix.get(34, 33) - chest_from_chance).abs() < 1e-15);
        let rolled_onto_go = 5.0 / 36.0;
        let chance_card = 1.0 / 36.0 * (1.0 / 16.0);
        let via_chain = 1.0 / 36.0 * (1.0 / 16.0) * (1.0 / 16.0);
        let chest_on_cc1 = 5.0 / 36.0 * (1.0 / 16.0);
        let expected = rolled_onto_go + chance_card + via_chain + chest_on_cc1;
        assert!((matrix.get(34, 0) - expected).abs() < 1e-15);
    }

    #[test]
    fn single_face_dice_move_deterministically_onto_plain_squares() {
        let matrix = standard_matrix(1, DeparturePolicy::RollDice);
        let rules = EventRuleTable::standard().unwrap();
        for from in 0..BOARD_SIZE {
            let landing = (from + 2) % BOARD_SIZE;
            if rules.rule(from) == &SquareRule::Plain && rules.rule(landing) == &SquareRule::Plain
            {
                let nonzero: Vec<_> = (0..BOARD_SIZE)
                    .filter(|&to| matrix.get(from, to) > 0.0)
                    .collect();
                assert_eq!(nonzero, vec![landing], "row {from}");
                assert!((matrix.get(from, landing) - 1.0).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn resolve_deck_departure_uses_deck_distribution() {
        let rules = EventRuleTable::standard().unwrap();
        let matrix = standard_matrix(6, DeparturePolicy::ResolveDeck);
        // CC2 departure: stays with 14/16, otherwise go or jail.
        assert!((matrix.get(17, 17) - 14.0 / 16.0).abs() < 1e-15);
        assert!((matrix.get(17, 0) - 1.0 / 16.0).abs() < 1e-15);
        assert!((matrix.get(17, JAIL_SQUARE) - 1.0 / 16.0).abs() < 1e-15);
        // CH1 departure: nearest railroad R2 with 2/16.
        assert!((matrix.get(7, 15) - 2.0 / 16.0).abs() < 1e-15);
        assert!((matrix.get(7, 7) - 6.0 / 16.0).abs() < 1e-15);
        // Non-deck rows are unaffected by the policy.
        let rolled = standard_matrix(6, DeparturePolicy::RollDice);
        for from in (0..BOARD_SIZE).filter(|&s| !rules.is_deck(s)) {
            assert_eq!(matrix.row(from), rolled.row(from), "row {from}");
        }
    }

    #[test]
    fn build_is_bit_identical_across_calls() {
        let first = standard_matrix(6, DeparturePolicy::RollDice);
        let second = standard_matrix(6, DeparturePolicy::RollDice);
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(first, second);
        let other = standard_matrix(4, DeparturePolicy::RollDice);
        assert_ne!(first.fingerprint(), other.fingerprint());
    }
}
