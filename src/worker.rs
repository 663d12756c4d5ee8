//! Scalar hybrid worker.
//!
//! Above the cache bound a trajectory is followed with direct arithmetic:
//! runs of halvings collapse into one shift by the trailing-zero count, and an
//! odd step computes `3n + 1` only after proving it fits in an `i64`. Once the
//! value falls under the bound the rest of the chain comes from the table.
//!
//! Seeds are stepped `W` at a time in lock-step so that independent
//! trajectories of different lengths share one loop condition.

use std::ops::RangeInclusive;

use crate::cache::ChainCache;
use crate::{HIST_SIZE, SAFE_THRESHOLD};

/// Where a lane is in its trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneStatus {
    /// Still stepping, or waiting for its table lookup.
    Active,
    /// Reached the table; `steps` is the full chain length.
    Finished,
    /// An odd step would have exceeded `i64::MAX`; the trajectory was dropped.
    Overflowed,
}

/// One trajectory being followed.
#[derive(Debug, Clone, Copy)]
pub struct Lane {
    pub seed: u64,
    pub n: u64,
    pub steps: u32,
    pub peak: u64,
    pub status: LaneStatus,
}

impl Lane {
    #[inline(always)]
    pub fn new(seed: u64) -> Self {
        Lane {
            seed,
            n: seed,
            steps: 0,
            peak: seed,
            status: LaneStatus::Active,
        }
    }

    /// `true` while the lane still has arithmetic to do above `bound`.
    #[inline(always)]
    pub fn is_stepping(&self, bound: u64) -> bool {
        self.status == LaneStatus::Active && self.n >= bound
    }

    /// Advances the lane by one halving run or one odd step.
    #[inline(always)]
    pub fn step(&mut self, bound: u64) {
        if !self.is_stepping(bound) {
            return;
        }

        let n = self.n;
        if n & 1 == 0 {
            let zeros = n.trailing_zeros();
            self.n = n >> zeros;
            self.steps += zeros;
            return;
        }

        match odd_successor(n) {
            Some(next) => {
                if next > self.peak {
                    self.peak = next;
                }
                let zeros = next.trailing_zeros();
                self.n = next >> zeros;
                self.steps += 1 + zeros;
            }
            None => self.status = LaneStatus::Overflowed,
        }
    }

    /// Adds the table length once the lane is below the bound.
    #[inline(always)]
    pub fn finish(&mut self, cache: &ChainCache) {
        if self.status == LaneStatus::Active {
            self.steps += cache.length(self.n);
            self.status = LaneStatus::Finished;
        }
    }
}

/// `3n + 1` for odd `n`, or `None` when it would exceed `i64::MAX`.
#[inline(always)]
pub fn odd_successor(n: u64) -> Option<u64> {
    if n < SAFE_THRESHOLD {
        return Some(3 * n + 1);
    }

    let wide = 3 * u128::from(n) + 1;
    if wide > i64::MAX as u128 {
        None
    } else {
        Some(wide as u64)
    }
}

/// Follows one seed to completion.
pub fn trajectory(seed: u64, cache: &ChainCache) -> Lane {
    let bound = cache.bound();
    let mut lane = Lane::new(seed);
    while lane.is_stepping(bound) {
        lane.step(bound);
    }
    lane.finish(cache);
    lane
}

/// Statistics gathered by one worker over its seed range.
#[derive(Debug, Clone)]
pub struct Partial {
    /// Seeds per chain length; the last bucket holds every longer chain.
    pub histogram: Vec<u64>,
    /// Longest chain as `(length, seed)`, smallest seed on ties.
    pub longest: Option<(u32, u64)>,
    pub max_peak: u64,
    pub first_overflow: Option<u64>,
    pub overflowed: u64,
}

impl Default for Partial {
    fn default() -> Self {
        Self::new()
    }
}

impl Partial {
    pub fn new() -> Self {
        Partial {
            histogram: vec![0; HIST_SIZE],
            longest: None,
            max_peak: 0,
            first_overflow: None,
            overflowed: 0,
        }
    }

    /// Records a finished chain. Seeds must arrive in ascending order for the
    /// smallest seed to win ties.
    #[inline(always)]
    pub fn record_finished(&mut self, seed: u64, steps: u32, peak: u64) {
        self.histogram[(steps as usize).min(HIST_SIZE - 1)] += 1;

        match self.longest {
            Some((len, _)) if steps <= len => {}
            _ => self.longest = Some((steps, seed)),
        }

        if peak > self.max_peak {
            self.max_peak = peak;
        }
    }

    #[inline(always)]
    pub fn record_overflow(&mut self, seed: u64) {
        self.overflowed += 1;
        self.first_overflow = Some(self.first_overflow.map_or(seed, |first| first.min(seed)));
    }

    #[inline(always)]
    pub fn record(&mut self, lane: &Lane) {
        match lane.status {
            LaneStatus::Finished => self.record_finished(lane.seed, lane.steps, lane.peak),
            LaneStatus::Overflowed => self.record_overflow(lane.seed),
            LaneStatus::Active => debug_assert!(false, "lane {} was not finished", lane.seed),
        }
    }

    /// Number of seeds that finished (sum of the histogram).
    pub fn finished(&self) -> u64 {
        self.histogram.iter().sum()
    }
}

/// Processes `seeds` in lock-step groups of `W` lanes, then the tail one by
/// one.
pub fn run_scalar<const W: usize>(seeds: RangeInclusive<u64>, cache: &ChainCache) -> Partial {
    let mut partial = Partial::new();
    let (start, end) = (*seeds.start(), *seeds.end());
    if start > end {
        return partial;
    }

    let bound = cache.bound();
    let count = end - start + 1;
    let groups = count / W as u64;

    for g in 0..groups {
        let base = start + g * W as u64;
        let mut lanes: [Lane; W] = std::array::from_fn(|k| Lane::new(base + k as u64));

        while lanes.iter().any(|lane| lane.is_stepping(bound)) {
            for lane in lanes.iter_mut() {
                lane.step(bound);
            }
        }

        for lane in lanes.iter_mut() {
            lane.finish(cache);
            partial.record(lane);
        }
    }

    for k in groups * W as u64..count {
        let lane = trajectory(start + k, cache);
        partial.record(&lane);
    }

    partial
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Progress;
    use crate::NO_OVERFLOW;

    fn cache(bits: u32) -> ChainCache {
        ChainCache::build(bits, 1_000, &Progress::silent())
    }

    #[test]
    fn test_odd_successor_threshold() {
        assert_eq!(odd_successor(1), Some(4));
        // SAFE_THRESHOLD is even; its odd neighbours straddle i64::MAX.
        assert_eq!(SAFE_THRESHOLD & 1, 0);
        assert_eq!(odd_successor(SAFE_THRESHOLD - 1), Some(NO_OVERFLOW - 3));
        assert_eq!(odd_successor(SAFE_THRESHOLD + 1), None);
        assert_eq!(odd_successor(SAFE_THRESHOLD + 3), None);
        assert_eq!(odd_successor(u64::MAX), None);
    }

    #[test]
    fn test_trajectory_below_bound_is_lookup() {
        let cache = cache(10);
        let lane = trajectory(27, &cache);
        assert_eq!(lane.status, LaneStatus::Finished);
        assert_eq!(lane.steps, 111);
        assert_eq!(lane.peak, 27);
    }

    #[test]
    fn test_trajectory_above_bound() {
        let cache = cache(4);
        // 27 peaks at 9232 after 77 steps, far above the bound of 16.
        let lane = trajectory(27, &cache);
        assert_eq!(lane.status, LaneStatus::Finished);
        assert_eq!(lane.steps, 111);
        assert_eq!(lane.peak, 9_232);
    }

    #[test]
    fn test_even_seed_above_bound() {
        let cache = cache(4);
        let lane = trajectory(1 << 40, &cache);
        assert_eq!(lane.steps, 40);
        assert_eq!(lane.peak, 1 << 40);
    }

    #[test]
    fn test_overflowing_seed() {
        let cache = cache(8);
        let seed = SAFE_THRESHOLD + 1;
        assert_eq!(seed & 1, 1);
        let lane = trajectory(seed, &cache);
        assert_eq!(lane.status, LaneStatus::Overflowed);
    }

    #[test]
    fn test_partial_ties_keep_smallest_seed() {
        let mut partial = Partial::new();
        partial.record_finished(12, 9, 16);
        partial.record_finished(13, 9, 40);
        assert_eq!(partial.longest, Some((9, 12)));
        assert_eq!(partial.max_peak, 40);
        assert_eq!(partial.finished(), 2);
    }

    #[test]
    fn test_partial_overflow_bucket() {
        let mut partial = Partial::new();
        partial.record_finished(5, 10_000, 5);
        assert_eq!(partial.histogram[HIST_SIZE - 1], 1);
    }

    #[test]
    fn test_partial_overflow_tracking() {
        let mut partial = Partial::new();
        partial.record_overflow(99);
        partial.record_overflow(41);
        partial.record_overflow(77);
        assert_eq!(partial.first_overflow, Some(41));
        assert_eq!(partial.overflowed, 3);
        assert_eq!(partial.finished(), 0);
        assert_eq!(partial.longest, None);
    }

    #[test]
    fn test_group_widths_agree() {
        let cache = cache(8);
        let eight = run_scalar::<8>(1..=5_003, &cache);
        let sixteen = run_scalar::<16>(1..=5_003, &cache);
        let single = run_scalar::<1>(1..=5_003, &cache);

        for other in [&sixteen, &single] {
            assert_eq!(eight.histogram, other.histogram);
            assert_eq!(eight.longest, other.longest);
            assert_eq!(eight.max_peak, other.max_peak);
        }
        assert_eq!(eight.finished(), 5_003);
    }

    #[test]
    fn test_group_with_overflowing_lane() {
        let cache = cache(8);
        let start = SAFE_THRESHOLD - 3;
        let partial = run_scalar::<8>(start..=start + 15, &cache);
        assert_eq!(partial.finished() + partial.overflowed, 16);
        assert!(partial.overflowed > 0);
        let first = partial.first_overflow.unwrap();
        assert!(first >= start);
        assert_eq!(trajectory(first, &cache).status, LaneStatus::Overflowed);
        for seed in start..first {
            assert_eq!(trajectory(seed, &cache).status, LaneStatus::Finished);
        }
    }

    #[test]
    fn test_empty_range() {
        let cache = cache(4);
        #[allow(clippy::reversed_empty_ranges)]
        let partial = run_scalar::<8>(10..=9, &cache);
        assert_eq!(partial.finished(), 0);
    }
}
