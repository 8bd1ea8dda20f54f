use std::ops::Range;

use num_bigint::BigInt;
use strum::{EnumIs, EnumTryAs};
use thiserror::Error;

/// A single diagnostic produced while parsing textual input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseMessage {
    pub message: String,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs, Error)]
pub enum Error {
    /// A segment is shorter than the minimum imposed by an even multiplier.
    #[error(
        "The multiplier value, {multiplier}, is even and requires all segments to have at least {minimum} even numbers. Segment #{index} only has {length}."
    )]
    SegmentBelowMinimum {
        multiplier: BigInt,
        minimum: u64,
        index: usize,
        length: u64,
    },

    /// A multiplier of zero collapses every odd step onto the additive constant.
    #[error("The multiplier must be non-zero.")]
    ZeroMultiplier,

    /// A loop needs at least one odd step.
    #[error("A loop requires at least one even segment, but none was provided.")]
    EmptySegmentList,

    /// Segment lengths count halvings and must be at least one.
    #[error("Segment lengths must be at least 1, got {length}.")]
    NonPositiveSegment { length: BigInt },

    /// A segment length does not fit a native 64-bit counter.
    #[error("Segment length {length} is too large, the maximum supported length is {max}.")]
    SegmentOutOfRange { length: BigInt, max: u64 },

    /// The sum of all segment lengths does not fit a native 64-bit counter.
    #[error("The total number of even steps overflows a 64-bit counter.")]
    DecreaseOverflow,

    /// The reduction step met a zero numerator and denominator. Only reachable when
    /// validation was skipped for an even multiplier.
    #[error(
        "The multiplier {multiplier} with segments {segments} yields a degenerate loop (0/0)."
    )]
    DegenerateLoop { multiplier: BigInt, segments: String },

    /// More segments than the configured limit.
    #[error("The loop contains {count} segments, exceeding the maximum allowed of {max}.")]
    TooManySegments { count: usize, max: usize },

    /// More halvings in total than the configured limit.
    #[error("The loop contains {total} even steps, exceeding the maximum allowed of {max}.")]
    DecreaseTooLarge { total: u64, max: u64 },

    /// A multiplier, once written out in full, would exceed the configured number of digits.
    #[error("The multiplier has {digits} decimal digits, exceeding the maximum allowed of {max}.")]
    MultiplierTooLarge { digits: u64, max: u64 },

    /// A halving step left a remainder. This points at an inconsistent numerator/denominator pair.
    #[error("Halving step {step} was applied to the odd value {value}.")]
    InexactHalving { step: usize, value: BigInt },

    /// Replaying the map did not return to its starting value.
    #[error("The sequence started at {start} but ended at {end} instead of closing.")]
    OpenCycle { start: BigInt, end: BigInt },

    /// A background build ended without delivering its result.
    #[error("The background build stopped before producing a result.")]
    BuildAborted,

    /// A finite number was expected to be an integer.
    #[error("Expected an integer, got `{value}`.")]
    NotAnInteger { value: String },

    /// Textual input could not be parsed.
    #[error("Failed to parse input: {}", join_messages(.messages))]
    ParseErrors { messages: Vec<ParseMessage> },
}

pub type Result<T> = std::result::Result<T, Error>;

fn join_messages(messages: &[ParseMessage]) -> String {
    messages
        .iter()
        .map(|m| m.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Serde adapters writing big integers as decimal strings, so values with
/// thousands of digits stay readable to JSON consumers.
#[cfg(feature = "serde")]
pub(crate) mod decimal {
    use std::str::FromStr;

    use num_bigint::BigInt;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let text = String::deserialize(deserializer)?;
        BigInt::from_str(&text).map_err(D::Error::custom)
    }

    pub mod seq {
        use super::*;
        use serde::ser::SerializeSeq;

        #[allow(clippy::ptr_arg)]
        pub fn serialize<S: Serializer>(
            values: &Vec<BigInt>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(values.len()))?;
            for value in values {
                seq.serialize_element(&value.to_string())?;
            }
            seq.end()
        }
    }
}
