//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a u32 into f64. Lossless, kept here so call sites read uniformly.
#[must_use]
pub fn u32_to_f64(value: u32) -> f64 {
    f64::from(value)
}

/// Ratio of two card counts as a probability, returning 0.0 for an empty deck.
#[must_use]
pub fn card_ratio(cards: u8, deck_size: u8) -> f64 {
    if deck_size == 0 {
        return 0.0;
    }
    f64::from(cards) / f64::from(deck_size)
}

/// Offset a square index by a signed delta around a board of `size` squares.
#[must_use]
pub fn wrap_square(square: usize, delta: i64, size: usize) -> usize {
    let Some(size_i) = cast::<usize, i64>(size) else {
        return square;
    };
    let Some(square_i) = cast::<usize, i64>(square) else {
        return square;
    };
    if size_i == 0 {
        return square;
    }
    let wrapped = (square_i.rem_euclid(size_i) + delta.rem_euclid(size_i)).rem_euclid(size_i);
    cast::<i64, usize>(wrapped).unwrap_or(square)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_ratio_handles_empty_deck() {
        assert!((card_ratio(1, 16) - 0.0625).abs() < f64::EPSILON);
        assert!(card_ratio(3, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn wrap_square_handles_negative_and_overflowing_offsets() {
        assert_eq!(wrap_square(7, -3, 40), 4);
        assert_eq!(wrap_square(2, -3, 40), 39);
        assert_eq!(wrap_square(38, 5, 40), 3);
        assert_eq!(wrap_square(0, -81, 40), 39);
    }

    #[test]
    fn wrap_square_survives_extreme_deltas() {
        assert_eq!(wrap_square(39, i64::MAX, 40), (39 + 7) % 40);
        assert_eq!(wrap_square(0, i64::MIN, 40), 32);
        assert_eq!(wrap_square(5, 40 * 1_000_000_007, 40), 5);
    }

    #[test]
    fn u32_conversion_is_exact() {
        assert!((u32_to_f64(40) - 40.0).abs() < f64::EPSILON);
        assert!((u32_to_f64(u32::MAX) - 4_294_967_295.0).abs() < f64::EPSILON);
    }
}
