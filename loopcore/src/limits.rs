use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    segments::SegmentList,
    utils::{Error, Result},
};

/// Upper bounds on the size of a loop, checked before any big-integer work.
///
/// The cost of a build grows with the number of segments and with the total
/// number of halvings (every halving adds one value to the trace and one bit to
/// the powers of two involved). Parsing a multiplier written in exponent notation
/// grows with its number of digits, so that is bounded too.
///
/// [`Loop::build`](crate::Loop::build) applies [`Limits::unbounded`]. The defaults
/// are meant for interactive front-ends, [`LoopCache`](crate::LoopCache) and
/// [`BuildTask`](crate::BuildTask).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Limits {
    /// Maximum number of segments (odd steps).
    pub max_segments: usize,
    /// Maximum sum of all segment lengths.
    pub max_total_decrease: u64,
    /// Maximum number of decimal digits of a parsed multiplier.
    pub max_multiplier_digits: u64,
}

impl Limits {
    pub const DEFAULT_MAX_SEGMENTS: usize = 1 << 16;
    pub const DEFAULT_MAX_TOTAL_DECREASE: u64 = 1 << 20;
    pub const DEFAULT_MAX_MULTIPLIER_DIGITS: u64 = 1 << 16;

    /// Limits that accept anything representable.
    pub const fn unbounded() -> Self {
        Self {
            max_segments: usize::MAX,
            max_total_decrease: u64::MAX,
            max_multiplier_digits: u64::MAX,
        }
    }

    pub fn check_multiplier_digits(&self, digits: u64) -> Result<()> {
        if digits > self.max_multiplier_digits {
            return Err(Error::MultiplierTooLarge {
                digits,
                max: self.max_multiplier_digits,
            });
        }
        Ok(())
    }

    pub fn check(&self, segments: &SegmentList) -> Result<()> {
        if segments.len() > self.max_segments {
            return Err(Error::TooManySegments {
                count: segments.len(),
                max: self.max_segments,
            });
        }

        let total = segments.total_decrease()?;
        if total > self.max_total_decrease {
            return Err(Error::DecreaseTooLarge {
                total,
                max: self.max_total_decrease,
            });
        }

        debug!(
            "Loop of {} segments and {} halvings is within limits",
            segments.len(),
            total
        );
        Ok(())
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_segments: Self::DEFAULT_MAX_SEGMENTS,
            max_total_decrease: Self::DEFAULT_MAX_TOTAL_DECREASE,
            max_multiplier_digits: Self::DEFAULT_MAX_MULTIPLIER_DIGITS,
        }
    }
}
