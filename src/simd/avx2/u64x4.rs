//! AVX2 register of four unsigned 64-bit lanes.
//!
//! AVX2 has no unsigned 64-bit compare, so [`LaneVector::gt`] flips the sign
//! bit of both operands and uses the signed `_mm256_cmpgt_epi64`.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::traits::LaneVector;

/// Number of `u64` elements that fit in an AVX2 256-bit vector.
pub(crate) const LANE_COUNT: usize = 4;

/// AVX2 vector of four `u64` lanes.
#[derive(Copy, Clone, Debug)]
pub struct U64x4 {
    pub elements: __m256i,
}

impl LaneVector for U64x4 {
    const LANES: usize = LANE_COUNT;

    #[inline(always)]
    unsafe fn splat(value: u64) -> Self {
        U64x4 {
            elements: _mm256_set1_epi64x(value as i64),
        }
    }

    #[inline(always)]
    unsafe fn load(lanes: &[u64]) -> Self {
        debug_assert!(lanes.len() >= LANE_COUNT);
        U64x4 {
            elements: _mm256_loadu_si256(lanes.as_ptr() as *const __m256i),
        }
    }

    #[inline(always)]
    unsafe fn store(self, out: &mut [u64]) {
        debug_assert!(out.len() >= LANE_COUNT);
        _mm256_storeu_si256(out.as_mut_ptr() as *mut __m256i, self.elements);
    }

    #[inline(always)]
    unsafe fn add(self, rhs: Self) -> Self {
        U64x4 {
            elements: _mm256_add_epi64(self.elements, rhs.elements),
        }
    }

    #[inline(always)]
    unsafe fn and(self, rhs: Self) -> Self {
        U64x4 {
            elements: _mm256_and_si256(self.elements, rhs.elements),
        }
    }

    #[inline(always)]
    unsafe fn or(self, rhs: Self) -> Self {
        U64x4 {
            elements: _mm256_or_si256(self.elements, rhs.elements),
        }
    }

    #[inline(always)]
    unsafe fn and_not(self, mask: Self) -> Self {
        // _mm256_andnot_si256(a, b) computes !a & b.
        U64x4 {
            elements: _mm256_andnot_si256(mask.elements, self.elements),
        }
    }

    #[inline(always)]
    unsafe fn gt(self, rhs: Self) -> Self {
        let flip = _mm256_set1_epi64x(i64::MIN);
        U64x4 {
            elements: _mm256_cmpgt_epi64(
                _mm256_xor_si256(self.elements, flip),
                _mm256_xor_si256(rhs.elements, flip),
            ),
        }
    }

    #[inline(always)]
    unsafe fn eq(self, rhs: Self) -> Self {
        U64x4 {
            elements: _mm256_cmpeq_epi64(self.elements, rhs.elements),
        }
    }

    #[inline(always)]
    unsafe fn shr1(self) -> Self {
        U64x4 {
            elements: _mm256_srli_epi64::<1>(self.elements),
        }
    }

    #[inline(always)]
    unsafe fn shl1(self) -> Self {
        U64x4 {
            elements: _mm256_slli_epi64::<1>(self.elements),
        }
    }

    #[inline(always)]
    unsafe fn select(mask: Self, if_set: Self, if_clear: Self) -> Self {
        U64x4 {
            elements: _mm256_blendv_epi8(if_clear.elements, if_set.elements, mask.elements),
        }
    }

    #[inline(always)]
    unsafe fn any(self) -> bool {
        _mm256_testz_si256(self.elements, self.elements) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lanes(v: U64x4) -> [u64; 4] {
        let mut out = [0u64; 4];
        unsafe { v.store(&mut out) };
        out
    }

    fn avx2() -> bool {
        is_x86_feature_detected!("avx2")
    }

    #[test]
    fn test_load_store() {
        if !avx2() {
            return;
        }
        let data = [1u64, 2, u64::MAX, 1 << 63];
        let v = unsafe { U64x4::load(&data) };
        assert_eq!(lanes(v), data);
    }

    #[test]
    fn test_unsigned_compare() {
        if !avx2() {
            return;
        }
        unsafe {
            let a = U64x4::load(&[1 << 63, 5, 0, u64::MAX]);
            let b = U64x4::load(&[1, 5, 1, u64::MAX - 1]);
            assert_eq!(lanes(a.gt(b)), [u64::MAX, 0, 0, u64::MAX]);
            assert_eq!(lanes(a.eq(b)), [0, u64::MAX, 0, 0]);
        }
    }

    #[test]
    fn test_select_and_masks() {
        if !avx2() {
            return;
        }
        unsafe {
            let mask = U64x4::load(&[u64::MAX, 0, u64::MAX, 0]);
            let a = U64x4::splat(7);
            let b = U64x4::splat(9);
            assert_eq!(lanes(U64x4::select(mask, a, b)), [7, 9, 7, 9]);
            assert_eq!(lanes(a.and_not(mask)), [0, 7, 0, 7]);
            assert!(mask.any());
            assert!(!U64x4::splat(0).any());
        }
    }

    #[test]
    fn test_shifts_and_add() {
        if !avx2() {
            return;
        }
        unsafe {
            let v = U64x4::load(&[27, 1 << 62, 3, 8]);
            assert_eq!(lanes(v.shr1()), [13, 1 << 61, 1, 4]);
            assert_eq!(lanes(v.shl1()), [54, 1 << 63, 6, 16]);
            // (3n + 1) / 2 for odd n.
            assert_eq!(lanes(v.add(v.shr1()).add(U64x4::splat(1)))[0], 41);
        }
    }
}
