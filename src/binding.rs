//! Coupling between one dialog and its auto-dismiss timer.
//!
//! A [`DialogTimerBinding`] owns the countdown [`timer::Model`] of a single
//! dialog and, when requested, the [`TimerProgressBar`] that mirrors it. Every
//! call that changes the timer's state pushes the new state into the bar, so
//! the bar animates while the timer runs and freezes while it is paused.
//!
//! The binding never dismisses anything itself. It reports expiry through
//! [`DialogTimerBinding::handle_expire`] and [`DialogTimerBinding::expired`]
//! and leaves the dismissal to its owner.

use crate::clock::SharedClock;
use crate::progress::{self, ProgressOption};
use crate::timer::{self, ExpireMsg};
use bubbletea_rs::{Cmd, Msg};
use std::time::Duration;
use tracing::debug;

/// Progress bar shown below a dialog while its timer counts down.
pub type TimerProgressBar = progress::Model;

/// The timer of one open dialog, plus its optional progress bar.
#[derive(Debug)]
pub struct DialogTimerBinding {
    timer: timer::Model,
    progress: Option<TimerProgressBar>,
}

impl DialogTimerBinding {
    /// Creates and starts the timer for `duration`.
    ///
    /// When `progress` is `Some`, a progress bar is created with those
    /// options and synced with the freshly started timer.
    pub fn new(
        duration: Duration,
        progress: Option<&[ProgressOption]>,
        clock: SharedClock,
    ) -> Self {
        let mut binding = Self {
            timer: timer::new_with_clock(duration, clock.clone()),
            progress: progress.map(|opts| progress::new(opts, clock)),
        };
        binding.timer.start();
        binding.sync_progress();
        debug!(
            timer = binding.timer.id(),
            ?duration,
            progress = binding.progress.is_some(),
            "dialog timer bound"
        );
        binding
    }

    /// Returns the bound timer.
    pub fn timer(&self) -> &timer::Model {
        &self.timer
    }

    /// Returns the time left.
    pub fn time_left(&self) -> Duration {
        self.timer.time_left()
    }

    /// Returns whether the timer is counting down.
    pub fn running(&self) -> bool {
        self.timer.running()
    }

    /// Returns whether the timer has run out.
    pub fn expired(&self) -> bool {
        self.timer.expired()
    }

    /// Pauses the timer.
    pub fn stop(&mut self) -> Duration {
        let left = self.timer.stop();
        self.sync_progress();
        left
    }

    /// Resumes the timer.
    pub fn resume(&mut self) -> Duration {
        let left = self.timer.resume();
        self.sync_progress();
        left
    }

    /// Pauses a running timer or resumes a paused one.
    pub fn toggle(&mut self) -> Duration {
        let left = self.timer.toggle();
        self.sync_progress();
        left
    }

    /// Extends the timer by `delta`.
    pub fn increase(&mut self, delta: Duration) -> Duration {
        let left = self.timer.increase(delta);
        self.sync_progress();
        left
    }

    /// Shortens the timer by `delta`, flooring at zero.
    pub fn decrease(&mut self, delta: Duration) -> Duration {
        let left = self.timer.decrease(delta);
        self.sync_progress();
        left
    }

    /// Returns the progress bar, if one was requested.
    pub fn progress_bar(&self) -> Option<&TimerProgressBar> {
        self.progress.as_ref()
    }

    /// Forwards a delivered expiry message to the timer.
    ///
    /// Returns `true` when the timer ran out because of it and the dialog
    /// must be dismissed.
    pub fn handle_expire(&mut self, msg: &ExpireMsg) -> bool {
        let fired = self.timer.fire(msg);
        self.sync_progress();
        fired
    }

    /// Routes a message to the progress bar and returns its next frame.
    pub fn update_progress(&mut self, msg: Msg) -> Option<Cmd> {
        self.progress.as_mut()?.update(msg)
    }

    /// Cancels the pending expiry and freezes the progress bar.
    pub fn dispose(&mut self) {
        self.timer.dispose();
        if let Some(bar) = self.progress.as_mut() {
            bar.freeze();
        }
    }

    /// Collects the commands scheduled by the last transitions: the timer's
    /// expiry and the progress bar's first frame.
    pub fn take_cmds(&mut self) -> Vec<Cmd> {
        let mut cmds = Vec::new();
        if let Some(cmd) = self.timer.take_expire_cmd() {
            cmds.push(cmd);
        }
        if let Some(cmd) = self.progress.as_mut().and_then(|bar| bar.take_frame_cmd()) {
            cmds.push(cmd);
        }
        cmds
    }

    fn sync_progress(&mut self) {
        if let Some(bar) = self.progress.as_mut() {
            bar.sync(
                self.timer.time_left(),
                self.timer.total(),
                self.timer.running(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn bound(total: u64, with_progress: bool) -> (ManualClock, DialogTimerBinding) {
        let clock = ManualClock::new();
        let opts = [progress::with_width(10)];
        let binding = DialogTimerBinding::new(
            ms(total),
            with_progress.then_some(&opts[..]),
            clock.shared(),
        );
        (clock, binding)
    }

    #[test]
    fn test_new_starts_timer() {
        let (clock, mut binding) = bound(500, false);
        assert!(binding.running());
        assert_eq!(binding.time_left(), ms(500));
        assert_eq!(binding.take_cmds().len(), 1);
        assert!(binding.take_cmds().is_empty());

        clock.advance(ms(100));
        assert_eq!(binding.time_left(), ms(400));
    }

    #[test]
    fn test_progress_only_when_requested() {
        let (_, without) = bound(500, false);
        assert!(without.progress_bar().is_none());

        let (_, mut with) = bound(500, true);
        let bar = with.progress_bar().unwrap();
        assert!(bar.is_animating());
        assert_eq!(bar.width, 10);
        // Expiry tick plus first frame.
        assert_eq!(with.take_cmds().len(), 2);
    }

    #[test]
    fn test_progress_follows_stop_and_resume() {
        let (clock, mut binding) = bound(400, true);
        clock.advance(ms(100));
        assert_eq!(binding.stop(), ms(300));

        let bar = binding.progress_bar().unwrap();
        assert!(!bar.is_animating());
        assert!((bar.percent() - 0.75).abs() < 1e-9);

        clock.advance(ms(1000));
        assert!((binding.progress_bar().unwrap().percent() - 0.75).abs() < 1e-9);

        assert_eq!(binding.resume(), ms(300));
        clock.advance(ms(100));
        let bar = binding.progress_bar().unwrap();
        assert!(bar.is_animating());
        assert!((bar.percent() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_progress_tracks_increase() {
        let (clock, mut binding) = bound(400, true);
        clock.advance(ms(200));
        assert_eq!(binding.increase(ms(100)), ms(300));
        assert_eq!(binding.progress_bar().unwrap().remaining(), ms(300));
        clock.advance(ms(100));
        assert_eq!(binding.progress_bar().unwrap().remaining(), ms(200));
    }

    #[test]
    fn test_handle_expire_reports_once() {
        let (clock, mut binding) = bound(500, true);
        let msg = binding.timer().pending_expiry().unwrap();

        clock.advance(ms(500));
        assert!(binding.handle_expire(&msg));
        assert!(binding.expired());
        assert!(!binding.running());
        assert!(!binding.handle_expire(&msg));
        assert_eq!(binding.progress_bar().unwrap().percent(), 0.0);
    }

    #[test]
    fn test_decrease_to_zero_expires() {
        let (_, mut binding) = bound(500, false);
        assert_eq!(binding.decrease(ms(600)), Duration::ZERO);
        assert!(binding.expired());
    }

    #[test]
    fn test_dispose_cancels_expiry() {
        let (clock, mut binding) = bound(500, true);
        let msg = binding.timer().pending_expiry().unwrap();
        clock.advance(ms(100));

        binding.dispose();
        assert!(!binding.running());
        assert!(!binding.progress_bar().unwrap().is_animating());

        clock.advance(ms(1000));
        assert!(!binding.handle_expire(&msg));
        assert!(!binding.expired());
        assert_eq!(binding.time_left(), ms(400));
    }
}
