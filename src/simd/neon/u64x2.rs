//! NEON register of two unsigned 64-bit lanes.

use std::arch::aarch64::*;

use crate::simd::traits::LaneVector;

/// Number of `u64` elements that fit in a NEON 128-bit vector.
pub(crate) const LANE_COUNT: usize = 2;

/// NEON vector of two `u64` lanes.
#[derive(Copy, Clone, Debug)]
pub struct U64x2 {
    pub elements: uint64x2_t,
}

impl LaneVector for U64x2 {
    const LANES: usize = LANE_COUNT;

    #[inline(always)]
    unsafe fn splat(value: u64) -> Self {
        U64x2 {
            elements: vdupq_n_u64(value),
        }
    }

    #[inline(always)]
    unsafe fn load(lanes: &[u64]) -> Self {
        debug_assert!(lanes.len() >= LANE_COUNT);
        U64x2 {
            elements: vld1q_u64(lanes.as_ptr()),
        }
    }

    #[inline(always)]
    unsafe fn store(self, out: &mut [u64]) {
        debug_assert!(out.len() >= LANE_COUNT);
        vst1q_u64(out.as_mut_ptr(), self.elements);
    }

    #[inline(always)]
    unsafe fn add(self, rhs: Self) -> Self {
        U64x2 {
            elements: vaddq_u64(self.elements, rhs.elements),
        }
    }

    #[inline(always)]
    unsafe fn and(self, rhs: Self) -> Self {
        U64x2 {
            elements: vandq_u64(self.elements, rhs.elements),
        }
    }

    #[inline(always)]
    unsafe fn or(self, rhs: Self) -> Self {
        U64x2 {
            elements: vorrq_u64(self.elements, rhs.elements),
        }
    }

    #[inline(always)]
    unsafe fn and_not(self, mask: Self) -> Self {
        U64x2 {
            elements: vbicq_u64(self.elements, mask.elements),
        }
    }

    #[inline(always)]
    unsafe fn gt(self, rhs: Self) -> Self {
        U64x2 {
            elements: vcgtq_u64(self.elements, rhs.elements),
        }
    }

    #[inline(always)]
    unsafe fn eq(self, rhs: Self) -> Self {
        U64x2 {
            elements: vceqq_u64(self.elements, rhs.elements),
        }
    }

    #[inline(always)]
    unsafe fn shr1(self) -> Self {
        U64x2 {
            elements: vshrq_n_u64::<1>(self.elements),
        }
    }

    #[inline(always)]
    unsafe fn shl1(self) -> Self {
        U64x2 {
            elements: vshlq_n_u64::<1>(self.elements),
        }
    }

    #[inline(always)]
    unsafe fn select(mask: Self, if_set: Self, if_clear: Self) -> Self {
        U64x2 {
            elements: vbslq_u64(mask.elements, if_set.elements, if_clear.elements),
        }
    }

    #[inline(always)]
    unsafe fn any(self) -> bool {
        (vgetq_lane_u64::<0>(self.elements) | vgetq_lane_u64::<1>(self.elements)) != 0
    }
}
