//! Engine tunables and their validation.

use crate::error::{config_error, Result};
use crate::simd::Kernel;
use crate::{CACHE_BITS, PHASE_SIZE};

/// Smallest accepted table size (`2^4` entries).
pub const MIN_CACHE_BITS: u32 = 4;

/// Largest accepted table size (`2^32` entries, 8 GiB). Below this bound every
/// trajectory used while building the table stays under `i64::MAX`.
pub const MAX_CACHE_BITS: u32 = 32;

/// Tunables of an [`Engine`](crate::Engine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// The chain-length table covers `n < 2^cache_bits`.
    pub cache_bits: u32,
    /// Table entries built between two phase barriers.
    pub phase_size: u64,
    /// Stepping strategy of the workers.
    pub kernel: Kernel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            cache_bits: CACHE_BITS,
            phase_size: PHASE_SIZE,
            kernel: Kernel::Scalar8,
        }
    }
}

impl EngineConfig {
    /// Default configuration with the best vector kernel of this CPU.
    pub fn vector() -> Self {
        EngineConfig {
            kernel: Kernel::detect(),
            ..Self::default()
        }
    }

    pub fn with_cache_bits(mut self, cache_bits: u32) -> Self {
        self.cache_bits = cache_bits;
        self
    }

    pub fn with_phase_size(mut self, phase_size: u64) -> Self {
        self.phase_size = phase_size;
        self
    }

    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Exclusive upper bound of the chain-length table.
    pub fn cache_bound(&self) -> u64 {
        1u64 << self.cache_bits
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_CACHE_BITS..=MAX_CACHE_BITS).contains(&self.cache_bits) {
            return Err(config_error(
                "cache_bits",
                u64::from(self.cache_bits),
                format!("cache bits must be within {MIN_CACHE_BITS}..={MAX_CACHE_BITS}"),
            ));
        }
        if self.phase_size == 0 {
            return Err(config_error(
                "phase_size",
                self.phase_size,
                "phase size must be positive",
            ));
        }
        Ok(())
    }
}
