//! Closed-form derivation of a loop's starting value and additive constant.
//!
//! One segment of the loop maps `x` to `(M·x + D) / 2^s`. Composing the `k`
//! segments and asking the composite map to fix `x` gives a linear equation
//! whose solution, written over the integers, is
//!
//! ```text
//! N' = Σ_{x=0}^{k-1} M^(k-x-1) · 2^(T_x)
//! D' = 2^(T_k) - M^k
//! ```
//!
//! where `T_x` is the number of halvings performed before the `x`-th odd step.
//! Dividing both by `gcd(N', |D'|)` yields the canonical pair in lowest terms.
use log::debug;
use num_bigint::BigInt;
use num_integer::Integer;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    segments::SegmentList,
    utils::{Error, Result},
};

/// The multiplier together with the reduced additive constant and starting value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoopParameters {
    #[cfg_attr(feature = "serde", serde(with = "crate::utils::decimal"))]
    pub multiplier: BigInt,
    #[cfg_attr(feature = "serde", serde(with = "crate::utils::decimal"))]
    pub denominator: BigInt,
    #[cfg_attr(feature = "serde", serde(with = "crate::utils::decimal"))]
    pub numerator: BigInt,
}

/// Unreduced numerator and denominator, as produced before the gcd reduction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawFraction {
    pub numerator: BigInt,
    pub denominator: BigInt,
}

/// Computes `N'` and `D'` for `multiplier` and `segments`.
///
/// `N'` is evaluated in Horner form (`acc = acc·M + 2^(T_x)`), which produces the same
/// sum with one multiplication per segment, and `M^k` is accumulated alongside it.
pub fn raw_fraction(multiplier: &BigInt, segments: &SegmentList) -> Result<RawFraction> {
    let decrease = segments.cumulative_decrease()?;

    let one = BigInt::from(1u8);
    let mut numerator = BigInt::ZERO;
    let mut power = one.clone();
    for &t in &decrease.prefix {
        numerator = numerator * multiplier + (&one << t);
        power *= multiplier;
    }

    let denominator = (&one << decrease.total) - power;
    Ok(RawFraction {
        numerator,
        denominator,
    })
}

/// Derives the reduced [`LoopParameters`] for `multiplier` and `segments`.
///
/// The caller is expected to have run [`crate::validate::validate_segments`];
/// no range check happens here. An unvalidated even multiplier can make both
/// `N'` and `D'` vanish, which is reported as [`Error::DegenerateLoop`] instead of
/// dividing by zero.
pub fn solve(multiplier: &BigInt, segments: &SegmentList) -> Result<LoopParameters> {
    let RawFraction {
        numerator,
        denominator,
    } = raw_fraction(multiplier, segments)?;

    let divisor = numerator.gcd(&denominator);
    debug!(
        "Solved {} segments for multiplier {}: N' has {} bits, D' has {} bits, gcd has {} bits",
        segments.len(),
        multiplier,
        numerator.bits(),
        denominator.bits(),
        divisor.bits()
    );

    if divisor == BigInt::ZERO {
        return Err(Error::DegenerateLoop {
            multiplier: multiplier.clone(),
            segments: segments.to_string(),
        });
    }

    Ok(LoopParameters {
        multiplier: multiplier.clone(),
        denominator: denominator / &divisor,
        numerator: numerator / &divisor,
    })
}
