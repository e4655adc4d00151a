//! Logging macros for the timeline engine with verbosity level control.
//!
//! Provides zero-cost logging when disabled (verbosity=0). Output goes to
//! stderr so hosts that read the rendered plan from stdout are unaffected.
//! - 0: SILENT
//! - 1: CHANGES (overflow clamps, ignored deadlines)
//! - 2: CHECKS (graph and pass summaries)
//! - 3: DEBUG (per-task offsets)

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at CHANGES level (verbosity >= 1).
///
/// Used for: decisions that alter what the caller sees, such as a task
/// being clamped into the window or a deadline being dropped.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            eprintln!("[timeline] {}", format_args!($($arg)*));
        }
    };
}

/// Log at CHECKS level (verbosity >= 2).
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            eprintln!("[timeline] {}", format_args!($($arg)*));
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!("[timeline:debug] {}", format_args!($($arg)*));
        }
    };
}
