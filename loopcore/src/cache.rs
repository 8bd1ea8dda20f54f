//! Memoization of loop builds.
//!
//! A build is fully determined by its multiplier and segment list, so results can
//! be shared between callers. The cache never changes what a build returns; it only
//! avoids recomputing it.
use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use log::{debug, trace};
use num_bigint::BigInt;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use crate::{cycle::Loop, limits::Limits, segments::SegmentList, utils::Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LoopKey {
    multiplier: BigInt,
    segments: SegmentList,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<LoopKey, Arc<Loop>>,
    // Insertion order, oldest first.
    order: VecDeque<LoopKey>,
}

/// A bounded, thread-safe memo of [`Loop::build_with`].
///
/// Failed builds are not stored. When the cache is full the oldest entry is evicted.
///
/// # A note on concurrency
/// Lookups take a shared lock. A miss builds the loop *without* holding any lock,
/// then re-checks under an upgradable read before inserting, so two threads missing
/// on the same key may both compute it, but only the first result is kept and both
/// callers receive the same [`Arc`].
pub struct LoopCache {
    state: RwLock<CacheState>,
    capacity: usize,
    limits: Limits,
}

impl LoopCache {
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn new(capacity: usize, limits: Limits) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            capacity: capacity.max(1),
            limits,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, multiplier: &BigInt, segments: &SegmentList) -> bool {
        let key = LoopKey {
            multiplier: multiplier.clone(),
            segments: segments.clone(),
        };
        self.state.read().entries.contains_key(&key)
    }

    pub fn clear(&self) {
        let mut state = self.state.write();
        state.entries.clear();
        state.order.clear();
    }

    /// Returns the memoized loop for `multiplier` and `segments`, building it on a miss.
    pub fn get_or_build(&self, multiplier: &BigInt, segments: &SegmentList) -> Result<Arc<Loop>> {
        let key = LoopKey {
            multiplier: multiplier.clone(),
            segments: segments.clone(),
        };

        if let Some(found) = self.state.read().entries.get(&key) {
            trace!("Loop cache hit for multiplier {} and segments {}", multiplier, segments);
            return Ok(Arc::clone(found));
        }

        let built = Arc::new(Loop::build_with(multiplier, segments, &self.limits)?);

        let state = self.state.upgradable_read();
        if let Some(found) = state.entries.get(&key) {
            return Ok(Arc::clone(found));
        }

        let mut state = RwLockUpgradableReadGuard::upgrade(state);
        while state.entries.len() >= self.capacity {
            match state.order.pop_front() {
                Some(oldest) => {
                    debug!(
                        "Evicting loop for multiplier {} and segments {} from cache",
                        oldest.multiplier, oldest.segments
                    );
                    state.entries.remove(&oldest);
                }
                None => break,
            }
        }
        state.order.push_back(key.clone());
        state.entries.insert(key, Arc::clone(&built));
        Ok(built)
    }
}

impl Default for LoopCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY, Limits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(lengths: &[u64]) -> SegmentList {
        SegmentList::from_lengths(lengths.iter().copied()).unwrap()
    }

    #[test]
    fn repeated_builds_share_the_result() {
        let cache = LoopCache::default();
        let m = BigInt::from(5);
        let first = cache.get_or_build(&m, &segments(&[3, 2])).unwrap();
        let second = cache.get_or_build(&m, &segments(&[3, 2])).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&m, &segments(&[3, 2])));
    }

    #[test]
    fn segment_order_is_part_of_the_key() {
        let cache = LoopCache::default();
        let m = BigInt::from(11);
        let a = cache.get_or_build(&m, &segments(&[4, 6, 5])).unwrap();
        let b = cache.get_or_build(&m, &segments(&[5, 6, 4])).unwrap();
        assert_ne!(a.numerator(), b.numerator());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = LoopCache::default();
        let m = BigInt::from(8);
        assert!(cache.get_or_build(&m, &segments(&[3])).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn oldest_entry_is_evicted() {
        let cache = LoopCache::new(2, Limits::default());
        let m = BigInt::from(3);
        cache.get_or_build(&m, &segments(&[1])).unwrap();
        cache.get_or_build(&m, &segments(&[2])).unwrap();
        cache.get_or_build(&m, &segments(&[3])).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&m, &segments(&[1])));
        assert!(cache.contains(&m, &segments(&[3])));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_callers_agree() {
        let cache = Arc::new(LoopCache::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache
                        .get_or_build(&BigInt::from(7), &segments(&[15, 10, 5]))
                        .unwrap()
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(cache.len(), 1);
    }
}
