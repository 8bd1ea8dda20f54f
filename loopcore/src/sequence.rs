//! Replays the map from the starting value to produce the explicit trace of a loop.
use num_bigint::BigInt;
use num_integer::Integer;

use crate::{
    segments::SegmentList,
    solver::LoopParameters,
    utils::{Error, Result},
};

const MAX_PREALLOCATED: usize = 1 << 16;

/// Produces the trace of the loop described by `params` and `segments`.
///
/// Starting from the numerator, each segment applies one odd step
/// (`x → M·x + D`) followed by as many halvings as the segment length, and every
/// intermediate value is recorded. A halving of an odd value, or a trace that does
/// not come back to its start, is reported as an error: neither can happen for
/// parameters produced by [`crate::solver::solve`] from validated segments.
pub fn generate(params: &LoopParameters, segments: &SegmentList) -> Result<Vec<BigInt>> {
    let capacity = usize::try_from(segments.sequence_len()?)
        .unwrap_or(MAX_PREALLOCATED)
        .min(MAX_PREALLOCATED);
    let mut sequence = Vec::with_capacity(capacity);

    let mut current = params.numerator.clone();
    sequence.push(current.clone());

    for segment in segments.iter() {
        current = &current * &params.multiplier + &params.denominator;
        sequence.push(current.clone());

        for _ in 0..segment.get() {
            let (half, remainder) = current.div_mod_floor(&BigInt::from(2u8));
            if remainder != BigInt::ZERO {
                return Err(Error::InexactHalving {
                    step: sequence.len(),
                    value: current,
                });
            }
            current = half;
            sequence.push(current.clone());
        }
    }

    if current != params.numerator {
        return Err(Error::OpenCycle {
            start: params.numerator.clone(),
            end: current,
        });
    }

    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::solve;

    fn params(m: i64, d: i64, n: i64) -> LoopParameters {
        LoopParameters {
            multiplier: BigInt::from(m),
            denominator: BigInt::from(d),
            numerator: BigInt::from(n),
        }
    }

    fn ints(values: &[i64]) -> Vec<BigInt> {
        values.iter().copied().map(BigInt::from).collect()
    }

    #[test]
    fn replays_a_closed_cycle() {
        let segments = SegmentList::from_lengths([3, 2]).unwrap();
        let sequence = generate(&params(5, 7, 13), &segments).unwrap();
        assert_eq!(sequence, ints(&[13, 72, 36, 18, 9, 52, 26, 13]));
        assert_eq!(sequence.len() as u64, segments.sequence_len().unwrap());
    }

    #[test]
    fn negative_values_halve_exactly() {
        let segments = SegmentList::from_lengths([1, 1, 4]).unwrap();
        let solved = solve(&BigInt::from(-3), &segments).unwrap();
        let sequence = generate(&solved, &segments).unwrap();
        assert_eq!(sequence, ints(&[1, 10, 5, -2, -1, 16, 8, 4, 2, 1]));
    }

    #[test]
    fn odd_halving_is_an_error() {
        // 1 → 3·1 + 2 = 5 is odd and cannot be halved exactly.
        let segments = SegmentList::from_lengths([1]).unwrap();
        let error = generate(&params(3, 2, 1), &segments).unwrap_err();
        assert_eq!(
            error,
            Error::InexactHalving {
                step: 2,
                value: BigInt::from(5),
            }
        );
    }

    #[test]
    fn open_trace_is_an_error() {
        // 1 → 3·1 + 1 = 4 → 2, which does not return to 1 after a single halving.
        let segments = SegmentList::from_lengths([1]).unwrap();
        let error = generate(&params(3, 1, 1), &segments).unwrap_err();
        assert!(error.is_open_cycle());
    }
}
