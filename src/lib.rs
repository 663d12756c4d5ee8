//! Collatz chain statistics over the seed range `[1, limit]`.
//!
//! For every seed the engine computes the chain length (steps down to 1), the
//! highest value the trajectory reaches, and whether a step would leave the
//! signed 64-bit range. The results are reduced into the longest chain, the
//! global peak, a histogram of chain lengths and the first overflowing seed.
//!
//! The work is split into a one-time parallel build of a chain-length table
//! below [`CACHE_BOUND`], and a worker phase that follows each trajectory with
//! plain arithmetic until it drops under the bound and then finishes with a
//! table lookup. Workers run either the unrolled scalar kernel or a SIMD
//! kernel (AVX2 or NEON) picked at runtime.
//!
//! ```no_run
//! let result = collatz_engine::compute(1_000_000, 8, None);
//! assert_eq!(result.longest_seed, 837_799);
//! assert_eq!(result.longest_len, 524);
//! ```

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod result;
pub mod simd;
pub mod utils;
pub mod worker;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{CollatzError, Result};
pub use result::{CollatzResult, Report};
pub use simd::Kernel;
pub use utils::LogSink;

/// log2 of the default chain-length table size.
pub const CACHE_BITS: u32 = 27;

/// Exclusive upper bound of the default chain-length table (256 MiB of `u16`).
pub const CACHE_BOUND: u64 = 1 << CACHE_BITS;

/// Number of table entries built between two phase barriers.
pub const PHASE_SIZE: u64 = 100_000;

/// Histogram buckets per worker; the last bucket collects every longer chain.
pub const HIST_SIZE: usize = 4096;

/// Largest odd value whose `3n + 1` is guaranteed to fit in an `i64`.
pub const SAFE_THRESHOLD: u64 = (i64::MAX as u64 - 1) / 3;

/// `first_overflow` value meaning that no trajectory overflowed.
pub const NO_OVERFLOW: u64 = i64::MAX as u64;

/// Seeds stepped together by one iteration of the SIMD kernels.
pub const GROUP_SEEDS: usize = 16;

/// Runs the scalar engine with the default table size.
///
/// `thread_count == 0` is treated as one thread and the count is clamped to
/// `limit`. The optional `log` sink receives progress lines from worker
/// threads.
pub fn compute(limit: u64, thread_count: u32, log: Option<&LogSink<'_>>) -> CollatzResult {
    Engine::scalar().run(limit, thread_count, log).result
}

/// Runs the best SIMD engine available on this CPU, falling back to the
/// scalar kernel when no vector path exists.
pub fn compute_vector(limit: u64, thread_count: u32, log: Option<&LogSink<'_>>) -> CollatzResult {
    Engine::vector().run(limit, thread_count, log).result
}
