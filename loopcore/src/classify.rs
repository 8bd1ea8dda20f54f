//! Numeric classification helpers.
//!
//! These predicates gate user input before it reaches the validator and the
//! solver: [`Classify::is_finite`] tells whether a raw value denotes a finite
//! number at all, and [`Classify::is_even`] applies the mathematical parity
//! convention (independent of sign, so both `4` and `-4` are even).
use bigdecimal::BigDecimal;
use chumsky::Parser;
use num_bigint::BigInt;
use num_integer::Integer;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIs};

use crate::{
    limits::Limits,
    parser::decimal_parser,
    utils::{Error, Result},
};

/// Parity of an element of a loop sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    #[inline]
    pub fn of(value: &BigInt) -> Self {
        if Integer::is_even(value) {
            Parity::Even
        } else {
            Parity::Odd
        }
    }
}

/// Finite-ness and parity tests over the value representations accepted as input.
pub trait Classify {
    /// Returns `true` if the value denotes a finite number.
    fn is_finite(&self) -> bool;

    /// Returns `true` if the value is finite, integral, and divisible by two.
    fn is_even(&self) -> bool;
}

impl Classify for BigInt {
    #[inline]
    fn is_finite(&self) -> bool {
        true
    }

    #[inline]
    fn is_even(&self) -> bool {
        Integer::is_even(self)
    }
}

impl Classify for BigDecimal {
    #[inline]
    fn is_finite(&self) -> bool {
        true
    }

    fn is_even(&self) -> bool {
        // After normalization a positive exponent means a fractional part remains, and a
        // negative one means the value is a multiple of ten.
        let (digits, exponent) = self.normalized().as_bigint_and_exponent();
        match exponent {
            e if e > 0 => false,
            0 => Integer::is_even(&digits),
            _ => true,
        }
    }
}

impl Classify for f64 {
    #[inline]
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }

    #[inline]
    fn is_even(&self) -> bool {
        f64::is_finite(*self) && *self % 2.0 == 0.0
    }
}

impl Classify for str {
    fn is_finite(&self) -> bool {
        parse_decimal(self).is_some()
    }

    fn is_even(&self) -> bool {
        parse_decimal(self).is_some_and(|value| value.is_even())
    }
}

impl Classify for String {
    fn is_finite(&self) -> bool {
        self.as_str().is_finite()
    }

    fn is_even(&self) -> bool {
        self.as_str().is_even()
    }
}

/// Returns `true` if `value` denotes a finite number.
#[inline]
pub fn is_finite<T: Classify + ?Sized>(value: &T) -> bool {
    value.is_finite()
}

/// Returns `true` if `value` is finite and even.
#[inline]
pub fn is_even<T: Classify + ?Sized>(value: &T) -> bool {
    value.is_even()
}

fn parse_decimal(text: &str) -> Option<BigDecimal> {
    decimal_parser()
        .then_ignore(chumsky::prelude::end())
        .parse(text)
        .into_result()
        .ok()
}

/// Converts a finite decimal into an exact integer, rejecting any fractional part.
///
/// The number of digits of the result is checked against `limits` before the
/// power of ten is expanded, so `1e20000000` is rejected without any big-integer work.
pub fn to_integer(value: &BigDecimal, limits: &Limits) -> Result<BigInt> {
    let normalized = value.normalized();
    let significant = normalized.digits();
    let (digits, exponent) = normalized.as_bigint_and_exponent();
    if exponent > 0 {
        return Err(Error::NotAnInteger {
            value: value.to_string(),
        });
    }

    let zeros = exponent.unsigned_abs();
    limits.check_multiplier_digits(significant.saturating_add(zeros))?;
    let zeros = usize::try_from(zeros).map_err(|_| Error::MultiplierTooLarge {
        digits: significant.saturating_add(zeros),
        max: limits.max_multiplier_digits,
    })?;
    Ok(digits * num_traits::pow(BigInt::from(10u8), zeros))
}
