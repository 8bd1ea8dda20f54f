//! Text front-ends for the numeric inputs of a loop.
//!
//! The grammars are deliberately small: an optionally signed numeric literal for
//! multipliers (decimal, or a `0x`/`0b`/`0o` prefixed integer) and a non-empty list
//! of positive lengths for the even segments.
//! Lists may be separated by commas and/or whitespace and may be wrapped in
//! brackets, so `3, 2`, `3 2` and `[3,2]` all describe the same pattern.
use bigdecimal::BigDecimal;
use chumsky::prelude::*;
use num_bigint::BigInt;
use std::str::FromStr;

use crate::{
    classify::to_integer,
    limits::Limits,
    segments::{EvenSegment, SegmentList},
    utils::{Error, ParseMessage, Result},
};

type Extra<'src> = extra::Err<Rich<'src, char>>;

pub fn sign_parser<'src>() -> impl Parser<'src, &'src str, char, Extra<'src>> + Clone {
    one_of("+-")
        .or_not()
        .map(|sign| sign.unwrap_or('+'))
        .labelled("sign")
}

/// A signed integer with a radix prefix: `0x1f`, `-0b101`, `0o17`.
pub fn radix_parser<'src>() -> impl Parser<'src, &'src str, BigInt, Extra<'src>> + Clone {
    let prefixed = |lower: &'static str, upper: &'static str, radix: u32, name: &'static str| {
        just(lower)
            .or(just(upper))
            .ignore_then(text::digits(radix).at_least(1).to_slice())
            .try_map(move |s: &str, span| {
                BigInt::parse_bytes(s.as_bytes(), radix)
                    .ok_or_else(|| Rich::custom(span, format!("invalid {} number: {}", name, s)))
            })
            .labelled(name)
    };

    sign_parser()
        .then(choice((
            prefixed("0x", "0X", 16, "hexadecimal"),
            prefixed("0b", "0B", 2, "binary"),
            prefixed("0o", "0O", 8, "octal"),
        )))
        .map(|(sign, value)| if sign == '-' { -value } else { value })
}

pub fn bigint_parser<'src>() -> impl Parser<'src, &'src str, BigInt, Extra<'src>> + Clone {
    let decimal = sign_parser()
        .then(text::digits(10).at_least(1))
        .to_slice()
        .try_map(|s: &str, span| {
            BigInt::parse_bytes(s.as_bytes(), 10)
                .ok_or_else(|| Rich::custom(span, format!("invalid decimal number: {}", s)))
        });

    choice((radix_parser(), decimal)).labelled("integer")
}

pub fn decimal_parser<'src>() -> impl Parser<'src, &'src str, BigDecimal, Extra<'src>> + Clone {
    let digits = any()
        .filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1);
    let fractional_part = just('.')
        .then(digits.clone())
        .labelled("fractional part")
        .or_not();
    let exponent_part = one_of("eE")
        .then(sign_parser())
        .then(digits.clone().labelled("exponent digits"))
        .labelled("exponent part")
        .or_not();

    let decimal = sign_parser()
        .then(digits.labelled("integer part"))
        .then(fractional_part)
        .then(exponent_part)
        .to_slice()
        .try_map(|s: &str, span| {
            BigDecimal::from_str(s)
                .map_err(|e| Rich::custom(span, format!("invalid number `{}`: {}", s, e)))
        });

    choice((radix_parser().map(BigDecimal::from), decimal)).labelled("number")
}

pub fn segment_parser<'src>() -> impl Parser<'src, &'src str, EvenSegment, Extra<'src>> + Clone {
    text::digits(10)
        .at_least(1)
        .to_slice()
        .validate(|s: &str, extra, emit| {
            let parsed = BigInt::parse_bytes(s.as_bytes(), 10)
                .ok_or_else(|| format!("invalid segment length: {}", s))
                .and_then(|length| EvenSegment::try_from(&length).map_err(|e| e.to_string()));
            match parsed {
                Ok(segment) => segment,
                Err(message) => {
                    emit.emit(Rich::custom(extra.span(), message));
                    EvenSegment::ONE
                }
            }
        })
        .labelled("segment length")
}

pub fn segments_parser<'src>()
-> impl Parser<'src, &'src str, Vec<EvenSegment>, Extra<'src>> + Clone {
    let list = segment_parser()
        .padded()
        .separated_by(just(',').or_not())
        .at_least(1)
        .allow_trailing()
        .collect::<Vec<_>>();

    list.clone()
        .delimited_by(just('[').padded(), just(']').padded())
        .or(list)
        .labelled("segment list")
}

fn into_error(errors: Vec<Rich<'_, char>>) -> Error {
    Error::ParseErrors {
        messages: errors
            .into_iter()
            .map(|e| ParseMessage {
                message: e.to_string(),
                span: e.span().into_range(),
            })
            .collect(),
    }
}

/// Parses a multiplier under the default [`Limits`]. Decimal notation is accepted as
/// long as the value is integral, so `1e3` reads as `1000` while `2.5` is rejected.
pub fn parse_multiplier(src: &str) -> Result<BigInt> {
    parse_multiplier_with(src, &Limits::default())
}

/// Parses a multiplier, rejecting values wider than `limits.max_multiplier_digits`.
pub fn parse_multiplier_with(src: &str, limits: &Limits) -> Result<BigInt> {
    let value = decimal_parser()
        .padded()
        .then_ignore(end())
        .parse(src)
        .into_result()
        .map_err(into_error)?;
    to_integer(&value, limits)
}

/// Parses a non-empty segment list such as `4, 6, 5`.
pub fn parse_segments(src: &str) -> Result<SegmentList> {
    let segments = segments_parser()
        .then_ignore(end())
        .parse(src)
        .into_result()
        .map_err(into_error)?;
    SegmentList::new(segments)
}
