//! Trajectories that would leave the signed 64-bit range.

use collatz_engine::cache::ChainCache;
use collatz_engine::utils::Progress;
use collatz_engine::worker::{odd_successor, trajectory, LaneStatus};
use collatz_engine::{Engine, EngineConfig, Kernel, NO_OVERFLOW, SAFE_THRESHOLD};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn cache() -> ChainCache {
    ChainCache::build(10, 1_000, &Progress::silent())
}

#[test]
fn test_threshold_boundary() {
    assert_eq!(SAFE_THRESHOLD, 3_074_457_345_618_258_602);
    assert_eq!(odd_successor(SAFE_THRESHOLD - 1), Some(i64::MAX as u64 - 3));
    assert_eq!(odd_successor(SAFE_THRESHOLD + 1), None);
    assert_eq!(odd_successor(u64::MAX), None);
}

#[test]
fn test_first_odd_seed_above_threshold_overflows() {
    let cache = cache();
    assert_eq!(trajectory(SAFE_THRESHOLD + 1, &cache).status, LaneStatus::Overflowed);
    assert_eq!(trajectory(SAFE_THRESHOLD, &cache).status, LaneStatus::Finished);
    assert_eq!(trajectory(SAFE_THRESHOLD - 10, &cache).status, LaneStatus::Finished);
}

/// 63 of the 81 seeds in `[S - 40, S + 40]` overflow somewhere along the way;
/// the smallest of them is `S - 40`.
#[test]
fn test_kernels_agree_near_threshold() {
    let cache = cache();
    let seeds = SAFE_THRESHOLD - 40..=SAFE_THRESHOLD + 40;

    for kernel in [Kernel::Scalar8, Kernel::Scalar16, Kernel::Avx2, Kernel::Neon] {
        let partial = kernel.run(seeds.clone(), &cache);
        assert_eq!(partial.overflowed, 63, "{kernel}");
        assert_eq!(partial.first_overflow, Some(SAFE_THRESHOLD - 40), "{kernel}");
        assert_eq!(partial.finished(), 81 - 63, "{kernel}");
    }

    let reference = Kernel::Scalar8.run(seeds.clone(), &cache);
    for kernel in [Kernel::Scalar16, Kernel::detect()] {
        let partial = kernel.run(seeds.clone(), &cache);
        assert_eq!(partial.histogram, reference.histogram, "{kernel}");
        assert_eq!(partial.longest, reference.longest, "{kernel}");
        assert_eq!(partial.max_peak, reference.max_peak, "{kernel}");
    }
}

#[test]
fn test_random_large_seeds_match_trajectory() {
    let cache = cache();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..64 {
        let start = rng.random_range(1u64 << 40..SAFE_THRESHOLD + (1 << 20));
        let seeds = start..=start + 47;

        let mut expected = collatz_engine::worker::Partial::new();
        for seed in seeds.clone() {
            expected.record(&trajectory(seed, &cache));
        }

        let partial = Kernel::detect().run(seeds.clone(), &cache);
        assert_eq!(partial.histogram, expected.histogram, "seeds from {start}");
        assert_eq!(partial.longest, expected.longest, "seeds from {start}");
        assert_eq!(partial.max_peak, expected.max_peak, "seeds from {start}");
        assert_eq!(partial.first_overflow, expected.first_overflow, "seeds from {start}");
        assert_eq!(partial.overflowed, expected.overflowed, "seeds from {start}");
    }
}

#[test]
fn test_no_overflow_for_small_limits() {
    let engine = Engine::new(EngineConfig::vector().with_cache_bits(8)).unwrap();
    let report = engine.run(1_000, 4, None);
    assert_eq!(report.result.first_overflow, NO_OVERFLOW);
    assert_eq!(report.result.overflow_seed(), None);
    assert_eq!(report.overflowed, 0);
    assert!(report.result.to_string().contains("Overflow seed: NONE"));
}

#[test]
fn test_thread_count_clamped_to_limit() {
    let engine = Engine::new(EngineConfig::default().with_cache_bits(6)).unwrap();

    let report = engine.run(3, 100, None);
    assert_eq!(report.threads, 3);
    assert_eq!(report.histogram_total(), 3);
    // 1 -> 0 steps, 2 -> 1 step, 3 -> 7 steps.
    assert_eq!(report.result.longest_len, 7);
    assert_eq!(report.result.longest_seed, 3);
    assert_eq!(report.result.max_peak, 16);

    let report = engine.run(1, 0, None);
    assert_eq!(report.threads, 1);
    assert_eq!(report.result.longest_len, 0);
    assert_eq!(report.result.longest_seed, 1);
    assert_eq!(report.result.max_peak, 1);
}
