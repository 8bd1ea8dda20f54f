//! Even-segment lengths and the structurally non-empty list that carries them.
//!
//! A loop alternates one odd step with a run of halvings. Each run is an
//! [`EvenSegment`]; the ordered runs form a [`SegmentList`], whose order is the
//! traversal order of the loop.
use std::{iter, num::NonZeroU64};

use log::warn;
use num_bigint::BigInt;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::utils::{Error, Result};

/// Number of consecutive halvings following an odd step. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u64", into = "u64"))]
#[repr(transparent)]
pub struct EvenSegment(NonZeroU64);

impl EvenSegment {
    pub const ONE: Self = Self(NonZeroU64::MIN);
    pub const MAX: Self = Self(NonZeroU64::MAX);

    /// Creates a segment of `length` halvings, or `None` if `length` is zero.
    #[inline]
    pub const fn new(length: u64) -> Option<Self> {
        match NonZeroU64::new(length) {
            Some(length) => Some(Self(length)),
            None => None,
        }
    }

    /// Returns the number of halvings.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for EvenSegment {
    type Error = Error;

    fn try_from(length: u64) -> Result<Self> {
        Self::new(length).ok_or(Error::NonPositiveSegment {
            length: BigInt::from(length),
        })
    }
}

impl TryFrom<&BigInt> for EvenSegment {
    type Error = Error;

    fn try_from(length: &BigInt) -> Result<Self> {
        if length < &BigInt::from(1u8) {
            return Err(Error::NonPositiveSegment {
                length: length.clone(),
            });
        }

        u64::try_from(length)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| Error::SegmentOutOfRange {
                length: length.clone(),
                max: u64::MAX,
            })
    }
}

impl From<EvenSegment> for u64 {
    #[inline]
    fn from(segment: EvenSegment) -> Self {
        segment.get()
    }
}

impl std::fmt::Display for EvenSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Running totals of halvings.
///
/// `prefix[i]` is the number of halvings performed before the `i`-th odd step
/// (so `prefix[0]` is always zero), and `total` is the number performed over the
/// whole loop. Splitting the final total out keeps it available without any
/// "last element" lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CumulativeDecrease {
    pub prefix: Vec<u64>,
    pub total: u64,
}

/// An ordered, non-empty list of even segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<EvenSegment>", into = "Vec<EvenSegment>")
)]
pub struct SegmentList {
    first: EvenSegment,
    rest: Vec<EvenSegment>,
}

impl SegmentList {
    /// Builds a list from `segments`, failing with [`Error::EmptySegmentList`] if it is empty.
    pub fn new(segments: Vec<EvenSegment>) -> Result<Self> {
        let mut segments = segments.into_iter();
        let first = segments.next().ok_or(Error::EmptySegmentList)?;
        Ok(Self {
            first,
            rest: segments.collect(),
        })
    }

    /// Builds a list from raw lengths, rejecting zero lengths and empty input.
    pub fn from_lengths<I: IntoIterator<Item = u64>>(lengths: I) -> Result<Self> {
        let segments = lengths
            .into_iter()
            .map(EvenSegment::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::new(segments)
    }

    /// A list holding a single segment.
    pub fn single(segment: EvenSegment) -> Self {
        Self {
            first: segment,
            rest: Vec::new(),
        }
    }

    /// Appends a segment at the end of the traversal order.
    pub fn push(&mut self, segment: EvenSegment) {
        self.rest.push(segment);
    }

    /// Number of segments, which is also the number of odd steps in the loop.
    #[allow(clippy::len_without_is_empty)]
    #[inline]
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    #[inline]
    pub fn first(&self) -> EvenSegment {
        self.first
    }

    #[inline]
    pub fn last(&self) -> EvenSegment {
        self.rest.last().copied().unwrap_or(self.first)
    }

    pub fn iter(&self) -> impl Iterator<Item = EvenSegment> + '_ {
        iter::once(self.first).chain(self.rest.iter().copied())
    }

    pub fn to_vec(&self) -> Vec<EvenSegment> {
        self.iter().collect()
    }

    /// Smallest segment of the list.
    pub fn shortest(&self) -> EvenSegment {
        self.rest.iter().copied().fold(self.first, EvenSegment::min)
    }

    /// Total number of halvings over the loop.
    pub fn total_decrease(&self) -> Result<u64> {
        self.iter()
            .try_fold(0u64, |acc, segment| acc.checked_add(segment.get()))
            .ok_or(Error::DecreaseOverflow)
    }

    /// Running totals of halvings, see [`CumulativeDecrease`].
    pub fn cumulative_decrease(&self) -> Result<CumulativeDecrease> {
        let mut prefix = Vec::with_capacity(self.len());
        let mut total = 0u64;
        for segment in self.iter() {
            prefix.push(total);
            total = total
                .checked_add(segment.get())
                .ok_or(Error::DecreaseOverflow)?;
        }
        Ok(CumulativeDecrease { prefix, total })
    }

    /// Number of values in the trace of the loop: the start, then for each segment the
    /// odd-step result followed by one value per halving.
    pub fn sequence_len(&self) -> Result<u64> {
        let odd_steps = u64::try_from(self.len()).map_err(|_| Error::DecreaseOverflow)?;
        self.total_decrease()?
            .checked_add(odd_steps)
            .and_then(|n| n.checked_add(1))
            .ok_or(Error::DecreaseOverflow)
    }

    /// Returns a copy where every segment shorter than `minimum` is raised to it, along
    /// with the number of segments that changed.
    ///
    /// Building a loop never applies this on its own; it is the explicit action a
    /// front-end takes when the user switches to an even multiplier.
    pub fn raised_to(&self, minimum: EvenSegment) -> (Self, usize) {
        let mut changed = 0;
        let mut raise = |segment: EvenSegment| {
            if segment < minimum {
                changed += 1;
                minimum
            } else {
                segment
            }
        };

        let first = raise(self.first);
        let rest = self.rest.iter().copied().map(&mut raise).collect();
        if changed > 0 {
            warn!(
                "Raised {} of {} segments to the minimum length of {}",
                changed,
                self.len(),
                minimum
            );
        }

        (Self { first, rest }, changed)
    }
}

impl TryFrom<Vec<EvenSegment>> for SegmentList {
    type Error = Error;

    fn try_from(segments: Vec<EvenSegment>) -> Result<Self> {
        Self::new(segments)
    }
}

impl From<SegmentList> for Vec<EvenSegment> {
    fn from(list: SegmentList) -> Self {
        let mut segments = Vec::with_capacity(list.len());
        segments.push(list.first);
        segments.extend(list.rest);
        segments
    }
}

impl std::fmt::Display for SegmentList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, segment) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", segment)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(length: u64) -> EvenSegment {
        EvenSegment::new(length).unwrap()
    }

    #[test]
    fn empty_list_is_rejected() {
        assert_eq!(SegmentList::new(vec![]), Err(Error::EmptySegmentList));
        assert!(SegmentList::from_lengths([]).unwrap_err().is_empty_segment_list());
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(SegmentList::from_lengths([3, 0, 2]).unwrap_err().is_non_positive_segment());
        assert!(EvenSegment::try_from(&BigInt::from(-4)).unwrap_err().is_non_positive_segment());
    }

    #[test]
    fn big_lengths_must_fit_native_counters() {
        let huge = BigInt::from(u64::MAX) + 1;
        assert!(EvenSegment::try_from(&huge).unwrap_err().is_segment_out_of_range());
        assert_eq!(EvenSegment::try_from(&BigInt::from(u64::MAX)).unwrap(), EvenSegment::MAX);
    }

    #[test]
    fn accessors() {
        let list = SegmentList::from_lengths([4, 6, 5]).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.first(), seg(4));
        assert_eq!(list.last(), seg(5));
        assert_eq!(list.shortest(), seg(4));
        assert_eq!(list.to_string(), "[4, 6, 5]");

        let single = SegmentList::single(seg(2));
        assert_eq!(single.first(), single.last());
    }

    #[test]
    fn cumulative_decrease() {
        let list = SegmentList::from_lengths([55, 12, 4, 40]).unwrap();
        let cumulative = list.cumulative_decrease().unwrap();
        assert_eq!(cumulative.prefix, vec![0, 55, 67, 71]);
        assert_eq!(cumulative.total, 111);
        assert_eq!(list.total_decrease().unwrap(), 111);
        assert_eq!(list.sequence_len().unwrap(), 116);
    }

    #[test]
    fn decrease_overflow_is_reported() {
        let list = SegmentList::from_lengths([u64::MAX, 1]).unwrap();
        assert_eq!(list.total_decrease(), Err(Error::DecreaseOverflow));
        assert_eq!(list.cumulative_decrease(), Err(Error::DecreaseOverflow));
    }

    #[test]
    fn raising_to_a_minimum_is_explicit() {
        let mut list = SegmentList::from_lengths([3, 1, 5]).unwrap();
        list.push(seg(2));
        let (raised, changed) = list.raised_to(seg(4));
        assert_eq!(changed, 3);
        assert_eq!(raised, SegmentList::from_lengths([4, 4, 5, 4]).unwrap());

        let (same, changed) = raised.raised_to(seg(4));
        assert_eq!(changed, 0);
        assert_eq!(same, raised);
    }
}
