//! Result records.
//!
//! [`CollatzResult`] is the fixed-layout record handed across process and
//! thread boundaries as a raw byte image, so its field order, widths and
//! padding must never change. [`Report`] carries it together with the data
//! that does not fit a fixed record.

use std::collections::BTreeMap;
use std::fmt;
use std::mem::{offset_of, size_of};

use crate::error::{layout_error, Result};
use crate::simd::Kernel;
use crate::utils::format_number;
use crate::NO_OVERFLOW;

/// Summary of one `compute` call, laid out as a C struct.
///
/// | offset | field            | type  |
/// |--------|------------------|-------|
/// | 0      | `limit`          | `u64` |
/// | 8      | `seconds`        | `f64` |
/// | 16     | `throughput`     | `f64` |
/// | 24     | `first_overflow` | `u64` |
/// | 32     | `longest_len`    | `u32` |
/// | 36     | padding          | 4 B   |
/// | 40     | `longest_seed`   | `u64` |
/// | 48     | `max_peak`       | `u64` |
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollatzResult {
    pub limit: u64,
    /// Wall-clock time including the cache build.
    pub seconds: f64,
    /// Billions of seeds per second.
    pub throughput: f64,
    /// Smallest overflowing seed, or [`NO_OVERFLOW`].
    pub first_overflow: u64,
    pub longest_len: u32,
    pub longest_seed: u64,
    pub max_peak: u64,
}

impl CollatzResult {
    /// Size of the byte image.
    pub const SIZE: usize = size_of::<CollatzResult>();

    /// `first_overflow` with the sentinel mapped to `None`.
    pub fn overflow_seed(&self) -> Option<u64> {
        match self.first_overflow {
            NO_OVERFLOW => None,
            seed => Some(seed),
        }
    }

    /// Native-endian image of the `#[repr(C)]` record, padding zeroed.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        put(&mut out, offset_of!(CollatzResult, limit), &self.limit.to_ne_bytes());
        put(&mut out, offset_of!(CollatzResult, seconds), &self.seconds.to_ne_bytes());
        put(&mut out, offset_of!(CollatzResult, throughput), &self.throughput.to_ne_bytes());
        put(&mut out, offset_of!(CollatzResult, first_overflow), &self.first_overflow.to_ne_bytes());
        put(&mut out, offset_of!(CollatzResult, longest_len), &self.longest_len.to_ne_bytes());
        put(&mut out, offset_of!(CollatzResult, longest_seed), &self.longest_seed.to_ne_bytes());
        put(&mut out, offset_of!(CollatzResult, max_peak), &self.max_peak.to_ne_bytes());
        out
    }

    /// Decodes an image produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; Self::SIZE] = bytes.try_into().map_err(|_| {
            layout_error(Self::SIZE, bytes.len(), "result record has the wrong size")
        })?;

        Ok(CollatzResult {
            limit: u64::from_ne_bytes(take(bytes, offset_of!(CollatzResult, limit))),
            seconds: f64::from_ne_bytes(take(bytes, offset_of!(CollatzResult, seconds))),
            throughput: f64::from_ne_bytes(take(bytes, offset_of!(CollatzResult, throughput))),
            first_overflow: u64::from_ne_bytes(take(bytes, offset_of!(CollatzResult, first_overflow))),
            longest_len: u32::from_ne_bytes(take(bytes, offset_of!(CollatzResult, longest_len))),
            longest_seed: u64::from_ne_bytes(take(bytes, offset_of!(CollatzResult, longest_seed))),
            max_peak: u64::from_ne_bytes(take(bytes, offset_of!(CollatzResult, max_peak))),
        })
    }
}

fn put(out: &mut [u8], offset: usize, field: &[u8]) {
    out[offset..offset + field.len()].copy_from_slice(field);
}

fn take<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut field = [0u8; N];
    field.copy_from_slice(&bytes[offset..offset + N]);
    field
}

impl fmt::Display for CollatzResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Limit: {}", format_number(self.limit))?;
        writeln!(f, "Seconds: {:.3}", self.seconds)?;
        writeln!(f, "Throughput: {:.3} billion/s", self.throughput)?;
        writeln!(
            f,
            "Max length: {} (seed={})",
            self.longest_len,
            format_number(self.longest_seed)
        )?;
        writeln!(f, "Max peak: {}", format_number(self.max_peak))?;
        write!(f, "Overflow seed: {}", format_number(self.first_overflow))
    }
}

/// Everything one `Engine::run` produced.
#[derive(Debug, Clone)]
pub struct Report {
    pub result: CollatzResult,
    /// Seeds per chain length. Lengths of `HIST_SIZE - 1` and above share the
    /// last bucket. Overflowed seeds are not counted.
    pub histogram: BTreeMap<u32, u64>,
    /// Seeds whose trajectory was abandoned on overflow.
    pub overflowed: u64,
    /// Kernel that actually ran.
    pub kernel: Kernel,
    /// Worker threads after clamping.
    pub threads: usize,
}

impl Report {
    /// Seeds accounted for in the histogram.
    pub fn histogram_total(&self) -> u64 {
        self.histogram.values().sum()
    }
}
