//! Errors raised while resolving dialog options.
//!
//! Timer operations themselves never fail; a missing timer is reported as
//! `None` and out-of-range adjustments are clamped.

use thiserror::Error;

/// Invalid combination of [`DialogOption`](crate::dialog::DialogOption)s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    /// A timer progress bar was requested but no timer was configured.
    #[error("a timer progress bar needs a timer; set one with `with_timer`")]
    ProgressBarWithoutTimer,
    /// The progress bar width is zero or negative.
    #[error("progress bar width must be positive, got {0}")]
    InvalidProgressWidth(i32),
}
