//! Global reduction of per-worker partials.
//!
//! Extrema are merged with compare-and-exchange loops and never block. The
//! longest chain is kept as a single packed key so that its length and seed
//! are always published together. Only the histogram takes a lock, and only
//! for as many additions as the worker has non-empty buckets.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::worker::Partial;

/// Seed bits of the packed longest-chain key.
const SEED_BITS: u32 = 52;
const SEED_MASK: u64 = (1 << SEED_BITS) - 1;
/// Lengths must fit in the remaining 12 bits.
const LEN_LIMIT: u32 = 1 << (64 - SEED_BITS);

/// Packs `(len, seed)` so that a larger key means a longer chain, or the same
/// length with a smaller seed. Returns `None` when either part does not fit.
fn pack_longest(len: u32, seed: u64) -> Option<u64> {
    if len >= LEN_LIMIT || seed >= SEED_MASK {
        return None;
    }
    Some((u64::from(len) << SEED_BITS) | (SEED_MASK - seed))
}

fn unpack_longest(key: u64) -> (u32, u64) {
    ((key >> SEED_BITS) as u32, SEED_MASK - (key & SEED_MASK))
}

/// `true` if `a` beats `b`: longer, or equally long with a smaller seed.
fn beats(a: (u32, u64), b: (u32, u64)) -> bool {
    a.0 > b.0 || (a.0 == b.0 && a.1 < b.1)
}

/// Raises `atom` to `value` if `value` is strictly greater.
fn cas_max(atom: &AtomicU64, value: u64) {
    let mut current = atom.load(Ordering::Relaxed);
    while value > current {
        match atom.compare_exchange_weak(current, value, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => break,
            Err(actual) => current = actual,
        }
    }
}

/// Lowers `atom` to `value` if `value` is strictly smaller.
fn cas_min(atom: &AtomicU64, value: u64) {
    let mut current = atom.load(Ordering::Relaxed);
    while value < current {
        match atom.compare_exchange_weak(current, value, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => break,
            Err(actual) => current = actual,
        }
    }
}

/// State shared by all workers of one `compute` call.
#[derive(Debug)]
pub struct Aggregator {
    first_overflow: AtomicU64,
    max_peak: AtomicU64,
    /// Packed `(len, seed)`; 0 means nothing merged yet.
    longest: AtomicU64,
    /// Longest chains whose seed or length does not fit the packed key.
    longest_wide: Mutex<Option<(u32, u64)>>,
    overflowed: AtomicU64,
    histogram: Mutex<BTreeMap<u32, u64>>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Aggregator {
            first_overflow: AtomicU64::new(u64::MAX),
            max_peak: AtomicU64::new(0),
            longest: AtomicU64::new(0),
            longest_wide: Mutex::new(None),
            overflowed: AtomicU64::new(0),
            histogram: Mutex::new(BTreeMap::new()),
        }
    }

    /// Folds one worker's partial into the global state. Safe to call from
    /// any number of threads at once.
    pub fn merge(&self, partial: &Partial) {
        if let Some(seed) = partial.first_overflow {
            cas_min(&self.first_overflow, seed);
        }
        if partial.overflowed > 0 {
            self.overflowed.fetch_add(partial.overflowed, Ordering::Relaxed);
        }
        cas_max(&self.max_peak, partial.max_peak);

        if let Some((len, seed)) = partial.longest {
            self.merge_longest(len, seed);
        }

        let mut histogram = self
            .histogram
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for (len, &count) in partial.histogram.iter().enumerate() {
            if count > 0 {
                *histogram.entry(len as u32).or_insert(0) += count;
            }
        }
    }

    fn merge_longest(&self, len: u32, seed: u64) {
        match pack_longest(len, seed) {
            Some(key) => cas_max(&self.longest, key),
            None => {
                let mut wide = self
                    .longest_wide
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                if wide.map_or(true, |current| beats((len, seed), current)) {
                    *wide = Some((len, seed));
                }
            }
        }
    }

    /// Smallest overflowing seed merged so far.
    pub fn first_overflow(&self) -> Option<u64> {
        match self.first_overflow.load(Ordering::Acquire) {
            u64::MAX => None,
            seed => Some(seed),
        }
    }

    pub fn max_peak(&self) -> u64 {
        self.max_peak.load(Ordering::Acquire)
    }

    /// Longest chain as `(length, seed)`, smallest seed on ties.
    pub fn longest(&self) -> Option<(u32, u64)> {
        let packed = match self.longest.load(Ordering::Acquire) {
            0 => None,
            key => Some(unpack_longest(key)),
        };
        let wide = *self
            .longest_wide
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match (packed, wide) {
            (Some(a), Some(b)) => Some(if beats(b, a) { b } else { a }),
            (a, b) => a.or(b),
        }
    }

    pub fn overflowed(&self) -> u64 {
        self.overflowed.load(Ordering::Acquire)
    }

    /// Consumes the aggregator and returns the merged histogram.
    pub fn into_histogram(self) -> BTreeMap<u32, u64> {
        self.histogram
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
