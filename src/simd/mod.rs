//! Per-seed stepping strategies and their runtime selection.
//!
//! All kernels share the cache and the aggregation protocol; they differ only
//! in how a worker walks its seed range. [`Kernel::detect`] picks the widest
//! vector path the running CPU supports, and [`Kernel::resolve`] turns a
//! requested kernel into one that is safe to run here, falling back to the
//! scalar worker.

use std::fmt;
use std::ops::RangeInclusive;

use crate::cache::ChainCache;
use crate::worker::{run_scalar, Partial};

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod avx2;

#[cfg(target_arch = "aarch64")]
pub mod neon;

pub(crate) mod lanes;
pub mod traits;

/// How a worker steps through its seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kernel {
    /// Scalar hybrid stepping, 8 lanes in lock-step.
    #[default]
    Scalar8,
    /// Scalar hybrid stepping, 16 lanes in lock-step.
    Scalar16,
    /// 4 x 64-bit AVX2 lanes, 16 seeds per group.
    Avx2,
    /// 2 x 64-bit NEON lanes, 16 seeds per group.
    Neon,
}

impl Kernel {
    /// The best kernel for the running CPU.
    pub fn detect() -> Self {
        let kernel = if Kernel::Avx2.is_available() {
            Kernel::Avx2
        } else if Kernel::Neon.is_available() {
            Kernel::Neon
        } else {
            Kernel::Scalar8
        };
        log::debug!("detected {kernel} kernel");
        kernel
    }

    /// `true` if this kernel can run on the current CPU.
    pub fn is_available(self) -> bool {
        match self {
            Kernel::Scalar8 | Kernel::Scalar16 => true,
            Kernel::Avx2 => avx2_detected(),
            Kernel::Neon => neon_detected(),
        }
    }

    /// `self` if available, otherwise the scalar fallback.
    pub fn resolve(self) -> Self {
        if self.is_available() {
            self
        } else {
            log::warn!("{self} kernel is not supported on this CPU, using scalar fallback");
            Kernel::Scalar8
        }
    }

    /// `true` for the SIMD kernels.
    pub fn is_vector(self) -> bool {
        matches!(self, Kernel::Avx2 | Kernel::Neon)
    }

    /// Computes the partial statistics of `seeds`.
    ///
    /// Callers are expected to [`resolve`](Self::resolve) first; an
    /// unavailable vector kernel silently runs the scalar fallback instead.
    pub fn run(self, seeds: RangeInclusive<u64>, cache: &ChainCache) -> Partial {
        match self {
            Kernel::Scalar16 => run_scalar::<16>(seeds, cache),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            // SAFETY: AVX2 support was just checked at runtime.
            Kernel::Avx2 if avx2_detected() => unsafe { avx2::run(seeds, cache) },
            #[cfg(target_arch = "aarch64")]
            // SAFETY: NEON support was just checked at runtime.
            Kernel::Neon if neon_detected() => unsafe { neon::run(seeds, cache) },
            _ => run_scalar::<8>(seeds, cache),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kernel::Scalar8 => "scalar x8",
            Kernel::Scalar16 => "scalar x16",
            Kernel::Avx2 => "avx2",
            Kernel::Neon => "neon",
        };
        f.write_str(name)
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn avx2_detected() -> bool {
    is_x86_feature_detected!("avx2")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn avx2_detected() -> bool {
    false
}

#[cfg(target_arch = "aarch64")]
fn neon_detected() -> bool {
    std::arch::is_aarch64_feature_detected!("neon")
}

#[cfg(not(target_arch = "aarch64"))]
fn neon_detected() -> bool {
    false
}
