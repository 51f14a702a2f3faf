//! The active dialog slot and its public timer API.
//!
//! A [`DialogHost`] shows at most one dialog at a time. Firing a new dialog
//! replaces the current one: the old timer is disposed before the new one is
//! created, so an expiry scheduled for the old dialog can never close the new
//! one. All timer operations act on the open dialog's timer and return `None`
//! when there is no open dialog or it was fired without a timer.
//!
//! # Basic Usage
//!
//! ```rust
//! use bubbletea_dialog::clock::ManualClock;
//! use bubbletea_dialog::dialog::{with_text, with_timer, DismissReason, Outcome};
//! use bubbletea_dialog::host::DialogHost;
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut host = DialogHost::with_clock(clock.shared());
//! host.fire(&[with_text("Saved"), with_timer(Duration::from_millis(500))])
//!     .unwrap();
//!
//! clock.advance(Duration::from_millis(50));
//! assert_eq!(host.stop_timer(), Some(Duration::from_millis(450)));
//! assert_eq!(host.is_timer_running(), Some(false));
//!
//! assert_eq!(host.resume_timer(), Some(Duration::from_millis(450)));
//! let expiry = host.pending_expiry().unwrap();
//! clock.advance(Duration::from_millis(450));
//! host.update(Box::new(expiry));
//!
//! assert!(!host.is_visible());
//! assert_eq!(host.outcome(), Some(Outcome::Dismissed(DismissReason::Timer)));
//! ```
//!
//! # bubbletea-rs Integration
//!
//! The host produces commands from two places: [`DialogHost::update`] returns
//! them directly, and API calls made elsewhere queue them for
//! [`DialogHost::take_cmd`].
//!
//! ```rust
//! use bubbletea_rs::{Cmd, Model as BubbleTeaModel, Msg};
//! use bubbletea_dialog::dialog::{with_text, with_timer, with_timer_progress_bar};
//! use bubbletea_dialog::host::DialogHost;
//! use std::time::Duration;
//!
//! struct App {
//!     host: DialogHost,
//! }
//!
//! impl BubbleTeaModel for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let mut host = DialogHost::new();
//!         host.fire(&[
//!             with_text("Closing soon"),
//!             with_timer(Duration::from_secs(3)),
//!             with_timer_progress_bar(),
//!         ])
//!         .ok();
//!         let cmd = host.take_cmd();
//!         (Self { host }, cmd)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         self.host.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.host.view()
//!     }
//! }
//! ```

use crate::binding::{DialogTimerBinding, TimerProgressBar};
use crate::clock::{self, SharedClock};
use crate::dialog::{self, DialogOption, DialogOptions, DismissReason, Outcome};
use crate::error::OptionsError;
use crate::key::DialogKeyMap;
use crate::progress::FrameMsg;
use crate::timer::ExpireMsg;
use bubbletea_rs::{batch, Cmd, KeyMsg, Msg};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Holds the open dialog and its timer.
pub struct DialogHost {
    /// Keys handled while a dialog is open.
    pub keymap: DialogKeyMap,
    clock: SharedClock,
    dialog: Option<dialog::Model>,
    binding: Option<DialogTimerBinding>,
    outcome: Option<Outcome>,
    pending: Vec<Cmd>,
}

impl fmt::Debug for DialogHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogHost")
            .field("dialog", &self.dialog)
            .field("binding", &self.binding)
            .field("outcome", &self.outcome)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl Default for DialogHost {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogHost {
    /// Creates an empty host on the system clock.
    pub fn new() -> Self {
        Self::with_clock(clock::system())
    }

    /// Creates an empty host whose timers read `clock`.
    pub fn with_clock(clock: SharedClock) -> Self {
        Self {
            keymap: DialogKeyMap::default(),
            clock,
            dialog: None,
            binding: None,
            outcome: None,
            pending: Vec::new(),
        }
    }

    /// Opens a dialog, replacing the current one.
    ///
    /// Options are validated first; on error the current dialog stays
    /// untouched. A timer is bound only when a non-zero duration is set.
    pub fn fire(&mut self, opts: &[DialogOption]) -> Result<(), OptionsError> {
        let options = DialogOptions::from_options(opts)?;

        if let Some(mut old) = self.binding.take() {
            old.dispose();
        }
        if let Some(old) = self.dialog.take() {
            debug!(id = old.id(), "dialog replaced");
        }
        // Commands queued for the old dialog would only deliver stale messages.
        self.pending.clear();

        let dialog = dialog::new(options);
        let options = dialog.options();
        self.binding = options.timer.map(|duration| {
            let progress = options
                .timer_progress_bar
                .then(|| options.progress_options());
            DialogTimerBinding::new(duration, progress.as_deref(), self.clock.clone())
        });
        debug!(
            id = dialog.id(),
            timer = ?options.timer,
            progress = options.timer_progress_bar,
            "dialog fired"
        );
        self.dialog = Some(dialog);
        self.collect();
        Ok(())
    }

    /// Returns whether a dialog is displayed.
    pub fn is_visible(&self) -> bool {
        self.dialog.as_ref().is_some_and(|d| d.is_open())
    }

    /// Returns the open dialog.
    pub fn dialog(&self) -> Option<&dialog::Model> {
        self.dialog.as_ref()
    }

    /// Returns how the most recently closed dialog ended.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Closes the open dialog with [`DismissReason::Close`].
    pub fn close(&mut self) -> bool {
        self.dismiss(DismissReason::Close)
    }

    /// Closes the open dialog with `reason`. Returns `false` when no dialog
    /// was open.
    pub fn dismiss(&mut self, reason: DismissReason) -> bool {
        self.finish(Outcome::Dismissed(reason))
    }

    /// Closes the open dialog as confirmed.
    pub fn confirm(&mut self) -> bool {
        self.finish(Outcome::Confirmed)
    }

    /// Returns the time left on the open dialog's timer.
    pub fn timer_left(&self) -> Option<Duration> {
        self.binding.as_ref().map(DialogTimerBinding::time_left)
    }

    /// Returns whether the open dialog's timer is counting down.
    pub fn is_timer_running(&self) -> Option<bool> {
        self.binding.as_ref().map(DialogTimerBinding::running)
    }

    /// Pauses the timer and returns the time left.
    pub fn stop_timer(&mut self) -> Option<Duration> {
        self.with_binding(DialogTimerBinding::stop)
    }

    /// Resumes the timer and returns the time left.
    pub fn resume_timer(&mut self) -> Option<Duration> {
        self.with_binding(DialogTimerBinding::resume)
    }

    /// Pauses or resumes the timer and returns the time left.
    pub fn toggle_timer(&mut self) -> Option<Duration> {
        self.with_binding(DialogTimerBinding::toggle)
    }

    /// Extends the timer by `delta` and returns the time left.
    pub fn increase_timer(&mut self, delta: Duration) -> Option<Duration> {
        self.with_binding(|b| b.increase(delta))
    }

    /// Shortens the timer by `delta` and returns the time left. Reaching zero
    /// closes the dialog with [`DismissReason::Timer`].
    pub fn decrease_timer(&mut self, delta: Duration) -> Option<Duration> {
        self.with_binding(|b| b.decrease(delta))
    }

    /// Returns the open dialog's progress bar, if it was fired with one.
    pub fn timer_progress_bar(&self) -> Option<&TimerProgressBar> {
        self.binding.as_ref()?.progress_bar()
    }

    /// Returns the expiry message the open dialog's timer is waiting for.
    pub fn pending_expiry(&self) -> Option<ExpireMsg> {
        self.binding.as_ref()?.timer().pending_expiry()
    }

    /// Routes expiry, progress frame and key messages.
    ///
    /// Returns every command that became due, including those queued by API
    /// calls since the last [`DialogHost::take_cmd`].
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(expire) = msg.downcast_ref::<ExpireMsg>().copied() {
            self.handle_expire(&expire);
        } else if msg.downcast_ref::<FrameMsg>().is_some() {
            if let Some(cmd) = self.binding.as_mut().and_then(|b| b.update_progress(msg)) {
                self.pending.push(cmd);
            }
        } else if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            self.handle_key(key_msg);
        }
        self.take_cmd()
    }

    /// Returns the queued commands as one command.
    pub fn take_cmd(&mut self) -> Option<Cmd> {
        match self.pending.len() {
            0 => None,
            1 => self.pending.pop(),
            _ => Some(batch(std::mem::take(&mut self.pending))),
        }
    }

    /// Renders the open dialog, or nothing.
    pub fn view(&self) -> String {
        let Some(dialog) = self.dialog.as_ref().filter(|d| d.is_open()) else {
            return String::new();
        };

        let mut footer = Vec::new();
        if let Some(binding) = &self.binding {
            let status = if binding.running() {
                format!("closes in {}", binding.timer().view())
            } else {
                format!("paused, {} left", binding.timer().view())
            };
            footer.push(String::new());
            match binding.progress_bar() {
                Some(bar) => footer.push(format!("{} {}", bar.view(), status)),
                None => footer.push(status),
            }
        }
        footer.push(
            self.keymap
                .help_line(self.binding.as_ref().map(DialogTimerBinding::running)),
        );

        dialog.view(&footer)
    }

    fn handle_expire(&mut self, msg: &ExpireMsg) {
        let Some(binding) = self.binding.as_mut() else {
            return;
        };
        if binding.handle_expire(msg) {
            debug!(timer = msg.id, "dialog timer expired");
            self.dismiss(DismissReason::Timer);
        } else {
            self.collect();
        }
    }

    fn handle_key(&mut self, key_msg: &KeyMsg) {
        if !self.is_visible() {
            return;
        }
        if self.keymap.confirm.matches(key_msg) {
            self.confirm();
        } else if self.keymap.cancel.matches(key_msg) {
            self.dismiss(DismissReason::Esc);
        } else if self.keymap.toggle_timer.matches(key_msg) {
            self.toggle_timer();
        }
    }

    fn with_binding<F>(&mut self, op: F) -> Option<Duration>
    where
        F: FnOnce(&mut DialogTimerBinding) -> Duration,
    {
        let binding = self.binding.as_mut()?;
        let left = op(binding);
        if binding.expired() {
            self.dismiss(DismissReason::Timer);
        } else {
            self.collect();
        }
        Some(left)
    }

    fn collect(&mut self) {
        if let Some(binding) = self.binding.as_mut() {
            self.pending.extend(binding.take_cmds());
        }
    }

    fn finish(&mut self, outcome: Outcome) -> bool {
        let Some(mut dialog) = self.dialog.take() else {
            return false;
        };
        if let Some(mut binding) = self.binding.take() {
            binding.dispose();
        }
        self.pending.clear();

        let closed = match outcome {
            Outcome::Confirmed => dialog.confirm(),
            Outcome::Dismissed(reason) => dialog.dismiss(reason),
        };
        if closed {
            self.outcome = Some(outcome);
        }
        closed
    }
}
