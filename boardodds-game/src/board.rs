//! Physical board layout: labelled squares and their features.

use serde::{Deserialize, Serialize};

use crate::constants::BOARD_SIZE;

/// What sits on a square, independent of any movement rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SquareFeature {
    Go,
    Property,
    Railroad,
    Utility,
    Tax,
    Chance,
    CommunityChest,
    Jail,
    FreeParking,
    GoToJail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquareInfo {
    pub label: String,
    pub feature: SquareFeature,
}

impl SquareInfo {
    #[must_use]
    pub fn new(label: &str, feature: SquareFeature) -> Self {
        Self {
            label: label.to_string(),
            feature,
        }
    }
}

/// Ordered squares of a cyclic board. Index 0 is the start square.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardLayout {
    squares: Vec<SquareInfo>,
}

const STANDARD_SQUARES: [(&str, SquareFeature); BOARD_SIZE] = [
    ("GO", SquareFeature::Go),
    ("A1", SquareFeature::Property),
    ("CC1", SquareFeature::CommunityChest),
    ("A2", SquareFeature::Property),
    ("T1", SquareFeature::Tax),
    ("R1", SquareFeature::Railroad),
    ("B1", SquareFeature::Property),
    ("CH1", SquareFeature::Chance),
    ("B2", SquareFeature::Property),
    ("B3", SquareFeature::Property),
    ("JAIL", SquareFeature::Jail),
    ("C1", SquareFeature::Property),
    ("U1", SquareFeature::Utility),
    ("C2", SquareFeature::Property),
    ("C3", SquareFeature::Property),
    ("R2", SquareFeature::Railroad),
    ("D1", SquareFeature::Property),
    ("CC2", SquareFeature::CommunityChest),
    ("D2", SquareFeature::Property),
    ("D3", SquareFeature::Property),
    ("FP", SquareFeature::FreeParking),
    ("E1", SquareFeature::Property),
    ("CH2", SquareFeature::Chance),
    ("E2", SquareFeature::Property),
    ("E3", SquareFeature::Property),
    ("R3", SquareFeature::Railroad),
    ("F1", SquareFeature::Property),
    ("F2", SquareFeature::Property),
    ("U2", SquareFeature::Utility),
    ("F3", SquareFeature::Property),
    ("G2J", SquareFeature::GoToJail),
    ("G1", SquareFeature::Property),
    ("G2", SquareFeature::Property),
    ("CC3", SquareFeature::CommunityChest),
    ("G3", SquareFeature::Property),
    ("R4", SquareFeature::Railroad),
    ("CH3", SquareFeature::Chance),
    ("H1", SquareFeature::Property),
    ("T2", SquareFeature::Tax),
    ("H2", SquareFeature::Property),
];

impl BoardLayout {
    #[must_use]
    pub fn new(squares: Vec<SquareInfo>) -> Self {
        Self { squares }
    }

    /// The reference 40-square layout.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(
            STANDARD_SQUARES
                .iter()
                .map(|&(label, feature)| SquareInfo::new(label, feature))
                .collect(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.squares.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    #[must_use]
    pub fn square(&self, index: usize) -> Option<&SquareInfo> {
        self.squares.get(index)
    }

    #[must_use]
    pub fn feature(&self, index: usize) -> Option<SquareFeature> {
        self.square(index).map(|info| info.feature)
    }

    /// Label of a square, or `"?"` for an index outside the layout.
    #[must_use]
    pub fn label(&self, index: usize) -> &str {
        self.square(index).map_or("?", |info| info.label.as_str())
    }

    /// Indices carrying `feature`, in board order.
    pub fn squares_with(&self, feature: SquareFeature) -> impl Iterator<Item = usize> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter(move |(_, info)| info.feature == feature)
            .map(|(index, _)| index)
    }

    /// First square strictly ahead of `from` (wrapping) carrying `feature`.
    #[must_use]
    pub fn nearest_ahead(&self, from: usize, feature: SquareFeature) -> Option<usize> {
        let len = self.len();
        (1..=len)
            .map(|step| (from + step) % len)
            .find(|&index| self.squares[index].feature == feature)
    }
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        CHANCE_SQUARES, COMMUNITY_CHEST_SQUARES, GO_TO_JAIL_SQUARE, JAIL_SQUARE,
        RAILROAD_SQUARES, UTILITY_SQUARES,
    };

    #[test]
    fn standard_layout_places_special_squares() {
        let layout = BoardLayout::standard();
        assert_eq!(layout.len(), BOARD_SIZE);
        assert_eq!(
            layout.squares_with(SquareFeature::Chance).collect::<Vec<_>>(),
            CHANCE_SQUARES
        );
        assert_eq!(
            layout
                .squares_with(SquareFeature::CommunityChest)
                .collect::<Vec<_>>(),
            COMMUNITY_CHEST_SQUARES
        );
        assert_eq!(
            layout.squares_with(SquareFeature::Railroad).collect::<Vec<_>>(),
            RAILROAD_SQUARES
        );
        assert_eq!(
            layout.squares_with(SquareFeature::Utility).collect::<Vec<_>>(),
            UTILITY_SQUARES
        );
        assert_eq!(layout.feature(JAIL_SQUARE), Some(SquareFeature::Jail));
        assert_eq!(layout.feature(GO_TO_JAIL_SQUARE), Some(SquareFeature::GoToJail));
        assert_eq!(layout.label(24), "E3");
    }

    #[test]
    fn nearest_ahead_wraps_past_start() {
        let layout = BoardLayout::standard();
        assert_eq!(layout.nearest_ahead(7, SquareFeature::Railroad), Some(15));
        assert_eq!(layout.nearest_ahead(22, SquareFeature::Railroad), Some(25));
        assert_eq!(layout.nearest_ahead(36, SquareFeature::Railroad), Some(5));
        assert_eq!(layout.nearest_ahead(7, SquareFeature::Utility), Some(12));
        assert_eq!(layout.nearest_ahead(22, SquareFeature::Utility), Some(28));
        assert_eq!(layout.nearest_ahead(36, SquareFeature::Utility), Some(12));
    }

    #[test]
    fn nearest_ahead_is_strict() {
        let layout = BoardLayout::standard();
        assert_eq!(layout.nearest_ahead(5, SquareFeature::Railroad), Some(15));
        assert_eq!(layout.nearest_ahead(10, SquareFeature::Jail), Some(10));
        assert_eq!(layout.nearest_ahead(0, SquareFeature::Go), Some(0));
    }

    #[test]
    fn label_for_unknown_square_is_placeholder() {
        assert_eq!(BoardLayout::standard().label(99), "?");
    }
}
