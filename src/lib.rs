#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/bubbletea-dialog/")]

//! # bubbletea-dialog
//!
//! Modal dialogs with an auto-dismiss countdown for
//! [bubbletea-rs](https://github.com/joshka/bubbletea-rs) applications.
//!
//! ## Overview
//!
//! A dialog can be fired with a timer. The timer starts right away and the
//! dialog is dismissed with [`DismissReason::Timer`] when it runs out. While
//! the dialog is open the timer can be paused, resumed, toggled, extended,
//! shortened and queried, and an optional progress bar shows how much time
//! is left.
//!
//! Every component follows the Elm Architecture: state lives in a `Model`,
//! messages arrive through `update()`, and deferred work is returned as a
//! `bubbletea_rs::Cmd`. Deferred messages carry the id of the component that
//! scheduled them and a tag that is bumped on every cancellation, so a paused
//! or replaced timer can never fire late.
//!
//! ## Components
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`host`] | The active dialog slot and the public timer API |
//! | [`dialog`] | Dialog options, model and outcome |
//! | [`binding`] | Couples one dialog to its timer and progress bar |
//! | [`timer`] | Pausable countdown with pure reads |
//! | [`progress`] | Countdown progress bar |
//! | [`clock`] | System and manual time sources |
//! | [`key`] | Dialog key bindings |
//!
//! ## Quick Start
//!
//! ```rust
//! use bubbletea_dialog::prelude::*;
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut host = DialogHost::with_clock(clock.shared());
//! host.fire(&[
//!     with_title("Upload finished"),
//!     with_timer(Duration::from_secs(5)),
//!     with_timer_progress_bar(),
//! ])
//! .unwrap();
//!
//! clock.advance(Duration::from_secs(2));
//! assert_eq!(host.timer_left(), Some(Duration::from_secs(3)));
//! assert_eq!(host.increase_timer(Duration::from_secs(1)), Some(Duration::from_secs(4)));
//! assert!(host.timer_progress_bar().is_some());
//! ```
//!
//! ## Logging
//!
//! Lifecycle events (fire, replace, expiry, close) are emitted with
//! `tracing::debug!`, individual timer transitions with `tracing::trace!`.
//! The crate never installs a subscriber.

pub mod binding;
pub mod clock;
pub mod dialog;
pub mod error;
pub mod host;
pub mod key;
pub mod progress;
pub mod timer;

pub use binding::{DialogTimerBinding, TimerProgressBar};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use dialog::{DialogOption, DialogOptions, DismissReason, Outcome};
pub use error::OptionsError;
pub use host::DialogHost;
pub use timer::{ExpireMsg, Model as Timer, TimeoutMsg as TimerTimeoutMsg};

/// Prelude module for convenient imports.
///
/// ```rust
/// use bubbletea_dialog::prelude::*;
/// ```
pub mod prelude {
    pub use crate::binding::{DialogTimerBinding, TimerProgressBar};
    pub use crate::clock::{Clock, ManualClock, SharedClock, SystemClock};
    pub use crate::dialog::{
        with_confirm_text, with_progress_gradient, with_progress_width, with_text, with_timer,
        with_timer_progress_bar, with_title, DialogOption, DialogOptions, DismissReason, Outcome,
    };
    pub use crate::error::OptionsError;
    pub use crate::host::DialogHost;
    pub use crate::key::{Binding, DialogKeyMap};
    pub use crate::progress::{FrameMsg as ProgressFrameMsg, Model as Progress};
    pub use crate::timer::{
        new as timer_new, new_with_clock as timer_new_with_clock, ExpireMsg, Model as Timer,
        TimeoutMsg as TimerTimeoutMsg,
    };
}
