//! Minimum segment length derived from the multiplier.
//!
//! When the multiplier `M` is even, every odd step multiplies by the `2^v` factor
//! of `M` (its 2-adic valuation `v`). Each segment must then halve at least
//! `v + 1` times, otherwise the solver's reduced pair degenerates and halvings
//! stop being exact. Odd multipliers (and zero) impose no extra bound.
use log::debug;
use num_bigint::BigInt;
use num_integer::Integer;

use crate::{
    segments::{EvenSegment, SegmentList},
    utils::{Error, Result},
};

/// Returns the smallest length every segment must have for the multiplier `multiplier`.
///
/// This is `1` for odd or zero multipliers, and `v + 1` otherwise where `v` is the
/// largest integer such that `2^v` divides `multiplier`. Divisibility does not depend
/// on sign, so `-8` and `8` share the same minimum.
pub fn minimum_segment_length(multiplier: &BigInt) -> EvenSegment {
    if multiplier.is_odd() {
        return EvenSegment::ONE;
    }

    match multiplier.trailing_zeros() {
        // `trailing_zeros` is below the bit length of a finite value, so `v + 1` never overflows.
        Some(valuation) => EvenSegment::new(valuation + 1).unwrap_or(EvenSegment::MAX),
        None => EvenSegment::ONE,
    }
}

/// Checks every segment of `segments` against [`minimum_segment_length`].
///
/// Fails with [`Error::SegmentBelowMinimum`] on the first segment (in traversal
/// order) that is too short. Nothing is adjusted; see [`SegmentList::raised_to`]
/// for the explicit correction.
pub fn validate_segments(multiplier: &BigInt, segments: &SegmentList) -> Result<()> {
    let minimum = minimum_segment_length(multiplier);
    debug!(
        "Validating {} segments against minimum length {} for multiplier {}",
        segments.len(),
        minimum,
        multiplier
    );

    match segments
        .iter()
        .enumerate()
        .find(|(_, segment)| *segment < minimum)
    {
        Some((index, segment)) => Err(Error::SegmentBelowMinimum {
            multiplier: multiplier.clone(),
            minimum: minimum.get(),
            index,
            length: segment.get(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts up from one while `2^min` divides `multiplier`, using floor modulo.
    fn minimum_by_search(multiplier: &BigInt) -> u64 {
        if multiplier.is_odd() || *multiplier == BigInt::ZERO {
            return 1;
        }

        let mut min = 1u32;
        while multiplier.mod_floor(&BigInt::from(2u8).pow(min)) == BigInt::ZERO {
            min += 1;
        }
        u64::from(min)
    }

    #[test]
    fn odd_and_zero_multipliers_need_one() {
        for m in [-7i64, -3, -1, 0, 1, 3, 5, 11, 97, 1_000_001] {
            assert_eq!(minimum_segment_length(&BigInt::from(m)), EvenSegment::ONE, "m = {m}");
        }
    }

    #[test]
    fn even_multipliers_follow_the_two_adic_valuation() {
        let cases = [(2i64, 2u64), (4, 3), (6, 2), (8, 4), (12, 3), (20, 3), (1000, 4), (-6, 2), (-8, 4)];
        for (m, expected) in cases {
            assert_eq!(minimum_segment_length(&BigInt::from(m)).get(), expected, "m = {m}");
        }
    }

    #[test]
    fn matches_divisibility_search() {
        for m in -300i64..=300 {
            let m = BigInt::from(m);
            assert_eq!(minimum_segment_length(&m).get(), minimum_by_search(&m), "m = {m}");
        }

        let large = BigInt::from(3u8) << 200u32;
        assert_eq!(minimum_segment_length(&large).get(), 201);
        assert_eq!(minimum_by_search(&large), 201);
    }

    #[test]
    fn segment_below_minimum_is_reported() {
        let segments = SegmentList::from_lengths([4, 3]).unwrap();
        let error = validate_segments(&BigInt::from(8), &segments).unwrap_err();
        assert_eq!(
            error,
            Error::SegmentBelowMinimum {
                multiplier: BigInt::from(8),
                minimum: 4,
                index: 1,
                length: 3,
            }
        );
    }

    #[test]
    fn valid_segments_pass() {
        let segments = SegmentList::from_lengths([4]).unwrap();
        assert!(validate_segments(&BigInt::from(8), &segments).is_ok());

        let short = SegmentList::from_lengths([1, 1, 1]).unwrap();
        assert!(validate_segments(&BigInt::from(-3), &short).is_ok());
    }
}
