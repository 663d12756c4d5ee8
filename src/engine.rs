//! One `compute` call from start to finish.
//!
//! Each run owns its context: a freshly built cache, a fresh aggregator and a
//! worker pool sized to the clamped thread count. Nothing survives between
//! runs, so independent engines can compute at the same time.

use std::ops::RangeInclusive;
use std::time::Instant;

use rayon::{Scope, ThreadPool, ThreadPoolBuilder};

use crate::aggregate::Aggregator;
use crate::cache::ChainCache;
use crate::config::EngineConfig;
use crate::error::{thread_pool_error, Result};
use crate::result::{CollatzResult, Report};
use crate::simd::Kernel;
use crate::utils::{format_number, partition, LogSink, Progress};
use crate::NO_OVERFLOW;

/// Computes Collatz statistics with a fixed configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Engine { config })
    }

    /// Default table size, scalar 8-lane kernel.
    pub fn scalar() -> Self {
        Engine {
            config: EngineConfig::default(),
        }
    }

    /// Default table size, best vector kernel of this CPU.
    pub fn vector() -> Self {
        Engine {
            config: EngineConfig::vector(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Computes the statistics of every seed in `[1, limit]`.
    ///
    /// `thread_count` is normalized: zero means one, and it never exceeds
    /// `limit`. Progress lines go to `log`, from whichever thread produced
    /// them.
    pub fn run(&self, limit: u64, thread_count: u32, log: Option<&LogSink<'_>>) -> Report {
        let started = Instant::now();
        let progress = Progress::new(log);
        let kernel = self.config.kernel.resolve();
        let ranges = partition(limit, thread_count);

        log::info!(
            "computing 1..={limit} on {} workers with the {kernel} kernel",
            ranges.len()
        );

        let cache = ChainCache::build(self.config.cache_bits, self.config.phase_size, &progress);
        let aggregator = Aggregator::new();

        if !ranges.is_empty() {
            match worker_pool(ranges.len()) {
                Ok(pool) => pool.scope(|scope| {
                    dispatch_workers(scope, &ranges, kernel, &cache, &aggregator, &progress)
                }),
                Err(err) => {
                    log::warn!("{err}; running workers on the global pool");
                    rayon::scope(|scope| {
                        dispatch_workers(scope, &ranges, kernel, &cache, &aggregator, &progress)
                    })
                }
            }
        }

        let seconds = started.elapsed().as_secs_f64();
        let result = assemble(limit, seconds, &cache, &aggregator);

        log::info!(
            "1..={} done in {seconds:.3}s: longest {} (seed {}), peak {}",
            format_number(limit),
            result.longest_len,
            format_number(result.longest_seed),
            format_number(result.max_peak)
        );

        Report {
            result,
            overflowed: aggregator.overflowed(),
            histogram: aggregator.into_histogram(),
            kernel,
            threads: ranges.len(),
        }
    }
}

fn worker_pool(threads: usize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("collatz-worker-{i}"))
        .build()
        .map_err(|err| thread_pool_error(threads, err.to_string()))
}

fn dispatch_workers<'scope, 'env: 'scope>(
    scope: &Scope<'scope>,
    ranges: &'env [RangeInclusive<u64>],
    kernel: Kernel,
    cache: &'env ChainCache,
    aggregator: &'env Aggregator,
    progress: &'env Progress<'env>,
) {
    for (id, seeds) in ranges.iter().enumerate() {
        scope.spawn(move |_| {
            let partial = kernel.run(seeds.clone(), cache);
            aggregator.merge(&partial);
            progress.emit(&format!(
                "worker {id} finished seeds {}..={}",
                seeds.start(),
                seeds.end()
            ));
        });
    }
}

/// Builds the result record from the merged state.
///
/// Workers only see peaks reached above the cache bound; whatever a
/// trajectory reaches after entering the table is bounded by the peak records
/// of the table, which cover every seed below `min(limit, bound)`.
fn assemble(limit: u64, seconds: f64, cache: &ChainCache, aggregator: &Aggregator) -> CollatzResult {
    let (longest_len, longest_seed) = aggregator.longest().unwrap_or((0, 0));
    let max_peak = aggregator.max_peak().max(cache.max_peak_up_to(limit));

    CollatzResult {
        limit,
        seconds,
        throughput: if seconds > 0.0 {
            limit as f64 / seconds / 1e9
        } else {
            0.0
        },
        first_overflow: aggregator.first_overflow().unwrap_or(NO_OVERFLOW),
        longest_len,
        longest_seed,
        max_peak,
    }
}
