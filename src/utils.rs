//! Progress reporting, range partitioning and number formatting.

use std::ops::RangeInclusive;

use chrono::Local;

/// Callback receiving human-readable progress lines.
///
/// It is called from arbitrary worker threads with no ordering guarantee
/// between threads.
pub type LogSink<'a> = dyn Fn(&str) + Send + Sync + 'a;

/// Forwards progress lines to an optional [`LogSink`] and to the `log` facade.
#[derive(Clone, Copy)]
pub struct Progress<'a> {
    sink: Option<&'a LogSink<'a>>,
}

impl<'a> Progress<'a> {
    pub fn new(sink: Option<&'a LogSink<'a>>) -> Self {
        Progress { sink }
    }

    pub fn silent() -> Self {
        Progress { sink: None }
    }

    /// Sends one timestamped, newline-terminated line to the sink.
    pub fn emit(&self, message: &str) {
        log::debug!("{message}");

        if let Some(sink) = self.sink {
            let stamp = Local::now().format("%H:%M:%S%.3f");
            sink(&format!("[{stamp}] {message}\n"));
        }
    }
}

/// Splits `[1, limit]` into contiguous, non-empty seed ranges, one per worker.
///
/// A zero thread count is treated as one and the count is clamped to `limit`
/// so that no empty range is ever produced. The last range absorbs the
/// remainder of the division.
pub fn partition(limit: u64, thread_count: u32) -> Vec<RangeInclusive<u64>> {
    if limit == 0 {
        return Vec::new();
    }

    let workers = u64::from(thread_count.max(1)).min(limit);
    let chunk = limit / workers;

    (0..workers)
        .map(|i| {
            let start = i * chunk + 1;
            let end = if i == workers - 1 { limit } else { (i + 1) * chunk };
            start..=end
        })
        .collect()
}

/// Formats a number with thousands separators, or `NONE` for the overflow
/// sentinel.
pub fn format_number(num: u64) -> String {
    if num == crate::NO_OVERFLOW {
        return "NONE".to_string();
    }

    let digits = num.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
