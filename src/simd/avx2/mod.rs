//! AVX2 back end: 256-bit registers of four `u64` lanes.
//!
//! A group of 16 seeds occupies four [`U64x4`](u64x4::U64x4) registers. The
//! module is compiled on every x86 target; the kernel is only entered after
//! runtime detection has confirmed AVX2 (see [`Kernel::resolve`]).
//!
//! [`Kernel::resolve`]: crate::simd::Kernel::resolve

use std::ops::RangeInclusive;

use crate::cache::ChainCache;
use crate::simd::lanes::run_lanes;
use crate::worker::Partial;
use crate::GROUP_SEEDS;

pub mod u64x4;

use u64x4::{U64x4, LANE_COUNT};

const REGISTERS: usize = GROUP_SEEDS / LANE_COUNT;

/// Processes `seeds` with the AVX2 group kernel.
///
/// # Safety
///
/// The CPU must support AVX2.
#[target_feature(enable = "avx2")]
pub unsafe fn run(seeds: RangeInclusive<u64>, cache: &ChainCache) -> Partial {
    run_lanes::<U64x4, REGISTERS>(seeds, cache)
}
