//! Chain-length table for every integer below the cache bound.
//!
//! The table is filled in phases of [`PHASE_SIZE`](crate::PHASE_SIZE) entries.
//! Inside a phase `[start, end)` each index follows its trajectory only until
//! it drops below `start`, where the value is already final because the
//! previous phase has been joined. Rayon's `par_chunks_mut` returning is the
//! barrier between phases; `split_at_mut` hands the finished prefix out as a
//! shared slice and the current phase as the only mutable one.
//!
//! While building, the table also collects the peak records of the cached
//! range: the seeds whose trajectory climbs higher than that of every smaller
//! seed. They give the exact largest peak among the seeds `1..=x` for any
//! `x` below the bound without storing a peak per entry.

use std::time::Instant;

use rayon::prelude::*;

use crate::utils::Progress;

/// A seed whose peak exceeds the peak of every smaller seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakRecord {
    pub seed: u64,
    pub peak: u64,
}

/// Immutable chain-length table plus the peak records below its bound.
#[derive(Debug, Clone)]
pub struct ChainCache {
    table: Vec<u16>,
    records: Vec<PeakRecord>,
    bits: u32,
}

impl ChainCache {
    /// Builds the table for all `n < 2^bits` on the current rayon pool.
    ///
    /// `bits` must be within `1..=32`; a zero `phase_size` is treated as one.
    pub fn build(bits: u32, phase_size: u64, progress: &Progress<'_>) -> Self {
        debug_assert!((1..=32).contains(&bits), "cache bits out of range");

        let started = Instant::now();
        let len = 1usize << bits;
        let phase_size = phase_size.max(1) as usize;
        let workers = rayon::current_num_threads().max(1);

        let mut table = vec![0u16; len];
        let mut records = vec![PeakRecord { seed: 1, peak: 1 }];

        let mut phase_start = 2usize;
        while phase_start < len {
            let phase_end = (phase_start + phase_size).min(len);
            let (done, rest) = table.split_at_mut(phase_start);
            let phase = &mut rest[..phase_end - phase_start];

            let chunk = phase.len().div_ceil(workers);
            let floor = records.last().map_or(0, |record| record.peak);
            let done: &[u16] = done;

            let candidates: Vec<Vec<PeakRecord>> = phase
                .par_chunks_mut(chunk)
                .enumerate()
                .map(|(c, out)| {
                    let first = (phase_start + c * chunk) as u64;
                    fill_chunk(done, phase_start as u64, first, out, floor)
                })
                .collect();

            for candidate in candidates.into_iter().flatten() {
                if records.last().map_or(true, |last| candidate.peak > last.peak) {
                    records.push(candidate);
                }
            }

            phase_start = phase_end;
        }

        let seconds = started.elapsed().as_secs_f64();
        log::info!(
            "chain-length cache below 2^{bits} built in {seconds:.3}s ({} peak records)",
            records.len()
        );
        progress.emit(&format!(
            "cache of {len} chain lengths built ({seconds:.3}s)"
        ));

        ChainCache {
            table,
            records,
            bits,
        }
    }

    /// Exclusive upper bound of the table.
    #[inline(always)]
    pub fn bound(&self) -> u64 {
        1u64 << self.bits
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Chain length of `n`; `n` must be below [`bound`](Self::bound).
    #[inline(always)]
    pub fn length(&self, n: u64) -> u32 {
        debug_assert!(n < self.bound());
        u32::from(self.table[n as usize])
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.table
    }

    pub fn records(&self) -> &[PeakRecord] {
        &self.records
    }

    /// Largest trajectory peak among the seeds `1..=x`, for `x` below the
    /// bound (larger `x` is clamped to `bound - 1`). Returns 0 for `x == 0`.
    pub fn max_peak_up_to(&self, x: u64) -> u64 {
        let x = x.min(self.bound() - 1);
        let idx = self.records.partition_point(|record| record.seed <= x);
        match idx {
            0 => 0,
            _ => self.records[idx - 1].peak,
        }
    }
}

/// Fills `out` with the chain lengths of `first..first + out.len()` and
/// returns the seeds whose stepped peak beats `floor`, in ascending order.
fn fill_chunk(
    done: &[u16],
    phase_start: u64,
    first: u64,
    out: &mut [u16],
    mut floor: u64,
) -> Vec<PeakRecord> {
    let mut found = Vec::new();

    for (offset, slot) in out.iter_mut().enumerate() {
        let seed = first + offset as u64;
        let mut n = seed;
        let mut steps = 0u32;
        let mut peak = seed;

        while n >= phase_start {
            if n & 1 == 0 {
                let zeros = n.trailing_zeros();
                n >>= zeros;
                steps += zeros;
            } else {
                // Below 2^32 every trajectory stays under i64::MAX.
                let next = 3 * n + 1;
                peak = peak.max(next);
                n = next >> 1;
                steps += 2;
            }
        }

        *slot = (steps + u32::from(done[n as usize])) as u16;

        if peak > floor {
            floor = peak;
            found.push(PeakRecord { seed, peak });
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(mut n: u64) -> (u32, u64) {
        let mut steps = 0;
        let mut peak = n;
        while n != 1 {
            n = if n % 2 == 0 { n / 2 } else { 3 * n + 1 };
            peak = peak.max(n);
            steps += 1;
        }
        (steps, peak)
    }

    #[test]
    fn test_small_table_matches_reference() {
        let cache = ChainCache::build(10, 100, &Progress::silent());
        assert_eq!(cache.length(1), 0);
        for n in 1..cache.bound() {
            assert_eq!(cache.length(n), reference(n).0, "chain length of {n}");
        }
    }

    #[test]
    fn test_known_lengths() {
        let cache = ChainCache::build(12, 1_000, &Progress::silent());
        assert_eq!(cache.length(2), 1);
        assert_eq!(cache.length(3), 7);
        assert_eq!(cache.length(6), 8);
        assert_eq!(cache.length(7), 16);
        assert_eq!(cache.length(27), 111);
        assert_eq!(cache.length(97), 118);
    }

    #[test]
    fn test_phase_size_does_not_change_table() {
        let coarse = ChainCache::build(14, 100_000, &Progress::silent());
        let fine = ChainCache::build(14, 7, &Progress::silent());
        assert_eq!(coarse.as_slice(), fine.as_slice());
        assert_eq!(coarse.records(), fine.records());
    }

    #[test]
    fn test_zero_phase_size_is_one() {
        let cache = ChainCache::build(6, 0, &Progress::silent());
        assert_eq!(cache.length(27), 111);
    }

    #[test]
    fn test_peak_records_match_reference() {
        let cache = ChainCache::build(13, 500, &Progress::silent());

        let mut expected = Vec::new();
        let mut best = 0;
        for seed in 1..cache.bound() {
            let peak = reference(seed).1;
            if peak > best {
                best = peak;
                expected.push(PeakRecord { seed, peak });
            }
        }

        assert_eq!(cache.records(), expected.as_slice());
    }

    #[test]
    fn test_max_peak_up_to() {
        let cache = ChainCache::build(12, 1_000, &Progress::silent());
        assert_eq!(cache.max_peak_up_to(0), 0);
        assert_eq!(cache.max_peak_up_to(1), 1);
        assert_eq!(cache.max_peak_up_to(2), 2);
        assert_eq!(cache.max_peak_up_to(3), 16);
        assert_eq!(cache.max_peak_up_to(26), 160);
        assert_eq!(cache.max_peak_up_to(27), 9_232);
        assert_eq!(cache.max_peak_up_to(u64::MAX), cache.records().last().unwrap().peak);
    }
}
