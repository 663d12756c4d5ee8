//! ARM NEON back end: 128-bit registers of two `u64` lanes.
//!
//! NEON is part of the AArch64 baseline, but the kernel still goes through
//! runtime detection like every other back end. A group of 16 seeds occupies
//! eight [`U64x2`](u64x2::U64x2) registers.

use std::ops::RangeInclusive;

use crate::cache::ChainCache;
use crate::simd::lanes::run_lanes;
use crate::worker::Partial;
use crate::GROUP_SEEDS;

pub mod u64x2;

use u64x2::{U64x2, LANE_COUNT};

const REGISTERS: usize = GROUP_SEEDS / LANE_COUNT;

/// Processes `seeds` with the NEON group kernel.
///
/// # Safety
///
/// The CPU must support NEON.
#[target_feature(enable = "neon")]
pub unsafe fn run(seeds: RangeInclusive<u64>, cache: &ChainCache) -> Partial {
    run_lanes::<U64x2, REGISTERS>(seeds, cache)
}
