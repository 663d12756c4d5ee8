//! Error types for collatz-engine operations.
//!
//! The computation itself never fails: bad `compute` arguments are clamped and
//! overflowing trajectories are reported in the result. Errors only come from
//! engine configuration, from decoding a result record, or from the host
//! refusing to build a worker pool.

use std::fmt;

/// Errors that can occur while configuring or driving the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollatzError {
    /// An engine configuration value is out of range.
    ConfigError {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The rejected value.
        value: u64,
        /// Human-readable error message.
        message: String,
    },
    /// A byte buffer does not have the fixed result record layout.
    LayoutError {
        /// Size of the record in bytes.
        expected: usize,
        /// Size of the buffer that was supplied.
        actual: usize,
        /// Human-readable error message.
        message: String,
    },
    /// The worker thread pool could not be created.
    ThreadPoolError {
        /// Number of threads that was requested.
        threads: usize,
        /// Human-readable error message.
        message: String,
    },
}

impl fmt::Display for CollatzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollatzError::ConfigError {
                parameter,
                value,
                message,
            } => write!(
                f,
                "Invalid configuration: {} ({} = {})",
                message, parameter, value
            ),
            CollatzError::LayoutError {
                expected,
                actual,
                message,
            } => write!(
                f,
                "Invalid result layout: {} (expected {} bytes, got {})",
                message, expected, actual
            ),
            CollatzError::ThreadPoolError { threads, message } => {
                write!(
                    f,
                    "Thread pool error: {} ({} threads requested)",
                    message, threads
                )
            }
        }
    }
}

impl std::error::Error for CollatzError {}

/// Result type alias for collatz-engine operations.
pub type Result<T> = std::result::Result<T, CollatzError>;

/// Creates a configuration error.
pub fn config_error(parameter: &'static str, value: u64, message: impl Into<String>) -> CollatzError {
    CollatzError::ConfigError {
        parameter,
        value,
        message: message.into(),
    }
}

/// Creates a layout error.
pub fn layout_error(expected: usize, actual: usize, message: impl Into<String>) -> CollatzError {
    CollatzError::LayoutError {
        expected,
        actual,
        message: message.into(),
    }
}

/// Creates a thread pool error.
pub fn thread_pool_error(threads: usize, message: impl Into<String>) -> CollatzError {
    CollatzError::ThreadPoolError {
        threads,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = config_error("cache_bits", 40, "cache bits must be within 4..=32");
        let display = format!("{}", error);
        assert!(display.contains("Invalid configuration"));
        assert!(display.contains("cache_bits = 40"));
        assert!(display.contains("4..=32"));
    }

    #[test]
    fn test_layout_error_display() {
        let error = layout_error(56, 12, "truncated result record");
        let display = format!("{}", error);
        assert!(display.contains("Invalid result layout"));
        assert!(display.contains("expected 56 bytes"));
        assert!(display.contains("got 12"));
        assert!(display.contains("truncated result record"));
    }

    #[test]
    fn test_thread_pool_error_display() {
        let error = thread_pool_error(8, "resource temporarily unavailable");
        let display = format!("{}", error);
        assert!(display.contains("Thread pool error"));
        assert!(display.contains("8 threads requested"));
    }

    #[test]
    fn test_error_equality() {
        let error1 = layout_error(56, 0, "test");
        let error2 = layout_error(56, 0, "test");
        let error3 = layout_error(56, 1, "test");

        assert_eq!(error1, error2);
        assert_ne!(error1, error3);
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = config_error("phase_size", 0, "phase size must be positive");

        let _: &dyn std::error::Error = &error;
        assert!(std::error::Error::source(&error).is_none());
    }
}
