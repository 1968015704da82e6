#![deny(missing_docs)]
//! Shared logging utilities for the loader workspace.
//!
//! This crate provides the `loader_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every macro accepts an
//! optional `label:` prefix naming the controller instance that emits the line.

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! loader_trace {
    (label: $label:expr, $($arg:tt)*) => {{
        log::trace!("[{}] {}", $label, format_args!($($arg)*));
    }};
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! loader_debug {
    (label: $label:expr, $($arg:tt)*) => {{
        log::debug!("[{}] {}", $label, format_args!($($arg)*));
    }};
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! loader_info {
    (label: $label:expr, $($arg:tt)*) => {{
        log::info!("[{}] {}", $label, format_args!($($arg)*));
    }};
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! loader_warn {
    (label: $label:expr, $($arg:tt)*) => {{
        log::warn!("[{}] {}", $label, format_args!($($arg)*));
    }};
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! loader_error {
    (label: $label:expr, $($arg:tt)*) => {{
        log::error!("[{}] {}", $label, format_args!($($arg)*));
    }};
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
