//! Group kernel shared by the SIMD back ends.
//!
//! A group is [`GROUP_SEEDS`] consecutive seeds held in `R` registers of
//! `V::LANES` lanes. Every iteration applies one branchless Collatz step to
//! the lanes that are still at or above the cache bound:
//!
//! * even lanes halve (one step),
//! * odd lanes become `(3n + 1) / 2` (two steps) and offer `3n + 1` as a peak,
//! * odd lanes above [`SAFE_THRESHOLD`] raise their overflow flag and stop.
//!
//! When no lane is active the remaining chain lengths come from the table.
//! Lanes that raised the overflow flag are re-run through the scalar stepper,
//! which decides their final status.

use std::ops::RangeInclusive;

use crate::cache::ChainCache;
use crate::simd::traits::LaneVector;
use crate::worker::{trajectory, Partial};
use crate::{GROUP_SEEDS, SAFE_THRESHOLD};

/// Splatted constants reused by every step.
#[derive(Clone, Copy)]
struct Constants<V> {
    /// `bound - 1`, so that `n > below` means `n >= bound`.
    below: V,
    threshold: V,
    one: V,
    two: V,
}

/// Per-register state of the lanes of one group.
struct Registers<V, const R: usize> {
    value: [V; R],
    steps: [V; R],
    peak: [V; R],
    active: [V; R],
    overflow: [V; R],
}

impl<V: LaneVector, const R: usize> Registers<V, R> {
    #[inline(always)]
    unsafe fn load(seeds: &[u64; GROUP_SEEDS], c: &Constants<V>) -> Self {
        let zero = V::splat(0);
        let mut value = [zero; R];
        let mut active = [zero; R];
        for r in 0..R {
            value[r] = V::load(&seeds[r * V::LANES..]);
            active[r] = value[r].gt(c.below);
        }

        Registers {
            value,
            steps: [zero; R],
            peak: value,
            active,
            overflow: [zero; R],
        }
    }

    #[inline(always)]
    unsafe fn any_active(&self) -> bool {
        let mut any = self.active[0];
        for mask in &self.active[1..] {
            any = any.or(*mask);
        }
        any.any()
    }

    #[inline(always)]
    unsafe fn step(&mut self, c: &Constants<V>) {
        for r in 0..R {
            let active = self.active[r];
            if !active.any() {
                continue;
            }

            let v = self.value[r];
            let odd = v.and(c.one).eq(c.one);
            let overflow = odd.and(v.gt(c.threshold)).and(active);
            self.overflow[r] = self.overflow[r].or(overflow);
            let live = active.and_not(overflow);

            let half = v.shr1();
            let odd_next = v.add(half).add(c.one);
            let next = V::select(odd, odd_next, half);
            let inc = V::select(odd, c.two, c.one);

            let candidate = odd_next.shl1();
            let raise = odd.and(live).and(candidate.gt(self.peak[r]));
            self.peak[r] = V::select(raise, candidate, self.peak[r]);

            self.value[r] = V::select(live, next, v);
            self.steps[r] = self.steps[r].add(inc.and(live));
            self.active[r] = live.and(self.value[r].gt(c.below));
        }
    }

    #[inline(always)]
    unsafe fn spill(regs: &[V; R]) -> [u64; GROUP_SEEDS] {
        let mut out = [0u64; GROUP_SEEDS];
        for (r, reg) in regs.iter().enumerate() {
            reg.store(&mut out[r * V::LANES..]);
        }
        out
    }
}

/// Runs `seeds` through groups of `R` registers of `V`, then the tail with the
/// scalar stepper.
///
/// # Safety
///
/// The CPU must support `V`'s instruction set, and `R * V::LANES` must equal
/// [`GROUP_SEEDS`].
#[inline(always)]
pub(crate) unsafe fn run_lanes<V: LaneVector, const R: usize>(
    seeds: RangeInclusive<u64>,
    cache: &ChainCache,
) -> Partial {
    debug_assert_eq!(R * V::LANES, GROUP_SEEDS);

    let mut partial = Partial::new();
    let (start, end) = (*seeds.start(), *seeds.end());
    if start > end {
        return partial;
    }

    let constants = Constants {
        below: V::splat(cache.bound() - 1),
        threshold: V::splat(SAFE_THRESHOLD),
        one: V::splat(1),
        two: V::splat(2),
    };

    let count = end - start + 1;
    let groups = count / GROUP_SEEDS as u64;

    for g in 0..groups {
        let base = start + g * GROUP_SEEDS as u64;
        let seeds: [u64; GROUP_SEEDS] = std::array::from_fn(|k| base + k as u64);

        let mut regs = Registers::<V, R>::load(&seeds, &constants);
        while regs.any_active() {
            regs.step(&constants);
        }

        let value = Registers::<V, R>::spill(&regs.value);
        let steps = Registers::<V, R>::spill(&regs.steps);
        let peak = Registers::<V, R>::spill(&regs.peak);
        let overflow = Registers::<V, R>::spill(&regs.overflow);

        for k in 0..GROUP_SEEDS {
            if overflow[k] != 0 {
                partial.record(&trajectory(seeds[k], cache));
            } else {
                let len = steps[k] as u32 + cache.length(value[k]);
                partial.record_finished(seeds[k], len, peak[k]);
            }
        }
    }

    for k in groups * GROUP_SEEDS as u64..count {
        let lane = trajectory(start + k, cache);
        partial.record(&lane);
    }

    partial
}
