//! The result of building a loop: parameters in lowest terms plus the explicit trace.
use log::info;
use num_bigint::{BigInt, Sign};
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    classify::Parity,
    limits::Limits,
    segments::SegmentList,
    sequence::generate,
    solver::{LoopParameters, solve},
    utils::{Error, Result},
    validate::validate_segments,
};

/// A closed cycle of the map `odd → M·x + D`, `even → x / 2`.
///
/// A [`Loop`] is immutable once built: rebuilding with other inputs produces a new
/// value rather than updating this one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Loop {
    #[cfg_attr(feature = "serde", serde(with = "crate::utils::decimal"))]
    multiplier: BigInt,
    #[cfg_attr(feature = "serde", serde(with = "crate::utils::decimal"))]
    denominator: BigInt,
    #[cfg_attr(feature = "serde", serde(with = "crate::utils::decimal"))]
    numerator: BigInt,
    segments: SegmentList,
    #[cfg_attr(feature = "serde", serde(with = "crate::utils::decimal::seq"))]
    sequence: Vec<BigInt>,
}

impl Loop {
    /// Builds the loop for `multiplier` and `segments` with no size limits.
    ///
    /// Apart from malformed input, the only way this fails is an even multiplier
    /// meeting a segment shorter than [`minimum_segment_length`](crate::minimum_segment_length).
    pub fn build(multiplier: &BigInt, segments: &SegmentList) -> Result<Self> {
        Self::build_with(multiplier, segments, &Limits::unbounded())
    }

    /// Builds the loop for `multiplier` and `segments`.
    ///
    /// The steps run in a fixed order: the multiplier must be non-zero, the
    /// segments must fit `limits`, every segment must reach the minimum length for
    /// the multiplier, and only then are the parameters solved and the trace
    /// replayed. No partial result is returned on failure.
    pub fn build_with(multiplier: &BigInt, segments: &SegmentList, limits: &Limits) -> Result<Self> {
        if *multiplier == BigInt::ZERO {
            return Err(Error::ZeroMultiplier);
        }
        limits.check(segments)?;
        validate_segments(multiplier, segments)?;

        let params = solve(multiplier, segments)?;
        let sequence = generate(&params, segments)?;
        info!(
            "Built loop {} starting at {} ({} segments, {} values)",
            params.equation(),
            params.numerator,
            segments.len(),
            sequence.len()
        );

        let LoopParameters {
            multiplier,
            denominator,
            numerator,
        } = params;
        Ok(Self {
            multiplier,
            denominator,
            numerator,
            segments: segments.clone(),
            sequence,
        })
    }

    #[inline]
    pub fn multiplier(&self) -> &BigInt {
        &self.multiplier
    }

    /// The additive constant of the odd step, in lowest terms with the numerator.
    #[inline]
    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    /// The starting value of the loop.
    #[inline]
    pub fn numerator(&self) -> &BigInt {
        &self.numerator
    }

    #[inline]
    pub fn segments(&self) -> &SegmentList {
        &self.segments
    }

    /// Every value visited, starting and ending at the numerator.
    #[inline]
    pub fn sequence(&self) -> &[BigInt] {
        &self.sequence
    }

    /// Values of the trace paired with their parity.
    pub fn elements(&self) -> impl Iterator<Item = (&BigInt, Parity)> + '_ {
        self.sequence.iter().map(|value| (value, Parity::of(value)))
    }

    /// Number of odd steps in one traversal.
    #[inline]
    pub fn odd_steps(&self) -> usize {
        self.segments.len()
    }

    /// Number of halvings in one traversal.
    pub fn even_steps(&self) -> u64 {
        // The list was accepted by `Limits::check`, which already summed it.
        self.segments.iter().map(|segment| segment.get()).sum()
    }

    pub fn parameters(&self) -> LoopParameters {
        LoopParameters {
            multiplier: self.multiplier.clone(),
            denominator: self.denominator.clone(),
            numerator: self.numerator.clone(),
        }
    }

    /// The odd-step rule, e.g. `5x + 7` or `3x - 1`.
    pub fn equation(&self) -> Equation<'_> {
        Equation {
            multiplier: &self.multiplier,
            denominator: &self.denominator,
        }
    }
}

impl LoopParameters {
    /// The odd-step rule, e.g. `5x + 7` or `3x - 1`.
    pub fn equation(&self) -> Equation<'_> {
        Equation {
            multiplier: &self.multiplier,
            denominator: &self.denominator,
        }
    }
}

/// Display helper rendering `{M}x ± {|D|}`.
#[derive(Debug, Clone, Copy)]
pub struct Equation<'a> {
    multiplier: &'a BigInt,
    denominator: &'a BigInt,
}

impl std::fmt::Display for Equation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self.denominator.sign() {
            Sign::Minus => '-',
            Sign::NoSign | Sign::Plus => '+',
        };
        write!(
            f,
            "{}x {} {}",
            self.multiplier,
            operator,
            self.denominator.magnitude()
        )
    }
}
