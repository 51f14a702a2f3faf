//! Countdown timer component for Bubble Tea applications.
//!
//! The timer counts down from a configured duration and can be paused,
//! resumed, toggled, extended and shortened. Unlike a ticking countdown it
//! does not decrement on every frame: it records the instant it last started
//! running and folds elapsed time into `remaining` only when its state
//! changes. Reads in between are pure, so polling the timer never drifts it.
//!
//! Expiry is delivered as a single deferred [`ExpireMsg`] scheduled with
//! `bubbletea_rs::tick`. Every transition that cancels or replaces the pending
//! expiry bumps an internal tag, and messages carrying an old tag are ignored,
//! so a cancelled expiry can never fire late.
//!
//! # Basic Usage
//!
//! ```rust
//! use bubbletea_dialog::clock::ManualClock;
//! use bubbletea_dialog::timer::new_with_clock;
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut timer = new_with_clock(Duration::from_millis(500), clock.shared());
//! timer.start();
//!
//! clock.advance(Duration::from_millis(50));
//! assert_eq!(timer.stop(), Duration::from_millis(450));
//! assert_eq!(timer.stop(), Duration::from_millis(450));
//!
//! assert_eq!(timer.increase(Duration::from_millis(10)), Duration::from_millis(460));
//! assert!(!timer.running());
//! ```
//!
//! # bubbletea-rs Integration
//!
//! ```rust
//! use bubbletea_rs::{Cmd, Model as BubbleTeaModel, Msg};
//! use bubbletea_dialog::timer::{new, Model, TimeoutMsg};
//! use std::time::Duration;
//!
//! struct App {
//!     timer: Model,
//!     done: bool,
//! }
//!
//! impl BubbleTeaModel for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let mut timer = new(Duration::from_secs(5));
//!         timer.start();
//!         let cmd = timer.take_expire_cmd();
//!         (Self { timer, done: false }, cmd)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         if let Some(timeout) = msg.downcast_ref::<TimeoutMsg>() {
//!             if timeout.id == self.timer.id() {
//!                 self.done = true;
//!                 return None;
//!             }
//!         }
//!         self.timer.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         format!("Closing in {}", self.timer.view())
//!     }
//! }
//! ```

use crate::clock::{self, SharedClock};
use bubbletea_rs::{tick as bubbletea_tick, Cmd, Model as BubbleTeaModel, Msg};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};
use tracing::trace;

const MIN_TICK: Duration = Duration::from_nanos(1);
const MAX_TICK: Duration = Duration::from_secs(24 * 60 * 60);

// Internal ID management for timer instances
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Formats a duration the way Go's `Duration.String()` does, truncated to
/// millisecond precision above one second.
///
/// ```rust,ignore
/// assert_eq!(format_duration(Duration::ZERO), "0s");
/// assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
/// assert_eq!(format_duration(Duration::from_secs(3661)), "1h1m1s");
/// ```
fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }

    if d < Duration::from_secs(1) {
        let nanos = d.as_nanos();
        return if nanos >= 1_000_000 {
            format!("{}ms", d.as_millis())
        } else if nanos >= 1_000 {
            format!("{}µs", d.as_micros())
        } else {
            format!("{}ns", nanos)
        };
    }

    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    let millis = d.subsec_millis();

    let seconds = if millis > 0 {
        format!("{}.{:03}", secs, millis)
            .trim_end_matches('0')
            .to_string()
    } else {
        secs.to_string()
    };

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Deferred expiry notification for a running timer.
///
/// Produced by the command returned from [`Model::take_expire_cmd`]. A timer
/// only honours the message whose `tag` matches its current tag; stopping,
/// re-arming or disposing the timer invalidates every message sent before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpireMsg {
    /// The unique identifier of the timer this message targets.
    pub id: i64,
    tag: i64,
}

/// Message sent once when a timer reaches zero.
///
/// Emitted by [`Model::update`] for applications that drive the timer as a
/// standalone component. Hosts that call [`Model::fire`] directly observe
/// the return value instead.
#[derive(Debug, Clone)]
pub struct TimeoutMsg {
    /// The unique identifier of the timer that expired.
    pub id: i64,
}

/// Pausable countdown timer.
///
/// # State
///
/// - `remaining` is the time left as of the last transition; it never goes
///   below zero.
/// - The timer is *running* exactly when it has a start instant, and a
///   running timer always has one valid pending [`ExpireMsg`].
/// - Once expired or disposed the timer is inert: mutators return the frozen
///   remaining time and change nothing.
///
/// # Examples
///
/// ```rust
/// use bubbletea_dialog::clock::ManualClock;
/// use bubbletea_dialog::timer::new_with_clock;
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let mut timer = new_with_clock(Duration::from_secs(2), clock.shared());
/// timer.start();
///
/// clock.advance(Duration::from_millis(500));
/// assert_eq!(timer.time_left(), Duration::from_millis(1500));
/// assert_eq!(timer.view(), "1.5s");
///
/// // Resuming a running timer is a no-op and keeps the deadline.
/// let deadline = timer.deadline();
/// timer.resume();
/// assert_eq!(timer.deadline(), deadline);
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    total: Duration,
    remaining: Duration,
    started_at: Option<Instant>,
    /// Unique identifier used to route expiry messages.
    id: i64,
    /// Incremented whenever the pending expiry is cancelled or replaced.
    tag: i64,
    /// A new expiry was armed and its command has not been handed out yet.
    armed: bool,
    expired: bool,
    disposed: bool,
    clock: SharedClock,
}

/// Creates a stopped timer for `total` that reads the system clock.
///
/// Call [`Model::start`] to begin counting down.
pub fn new(total: Duration) -> Model {
    new_with_clock(total, clock::system())
}

/// Creates a stopped timer for `total` that reads `clock`.
pub fn new_with_clock(total: Duration, clock: SharedClock) -> Model {
    Model {
        total,
        remaining: total,
        started_at: None,
        id: next_id(),
        tag: 0,
        armed: false,
        expired: false,
        disposed: false,
        clock,
    }
}

impl Model {
    /// Returns the unique identifier of this timer instance.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the duration the timer was created with.
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Returns whether an expiry is currently scheduled.
    pub fn running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Returns whether the timer has counted down to zero.
    pub fn expired(&self) -> bool {
        self.expired
    }

    /// Returns whether [`Model::dispose`] has been called.
    pub fn disposed(&self) -> bool {
        self.disposed
    }

    /// Starts the countdown from the full configured duration.
    ///
    /// Meant to be called once, right after construction. Returns the
    /// remaining time, which equals [`Model::total`] unless the timer was
    /// created with a zero duration, in which case it expires at once.
    pub fn start(&mut self) -> Duration {
        if self.inert() {
            return self.remaining;
        }

        self.remaining = self.total;
        if self.remaining.is_zero() {
            self.started_at = None;
            self.expire();
        } else {
            self.arm();
        }
        trace!(id = self.id, remaining = ?self.remaining, "timer started");
        self.remaining
    }

    /// Returns the time left without changing any state.
    ///
    /// While running this is the stored remaining time minus the time elapsed
    /// since the timer last started, saturating at zero.
    pub fn time_left(&self) -> Duration {
        match self.started_at {
            Some(at) => self
                .remaining
                .saturating_sub(self.clock.now().saturating_duration_since(at)),
            None => self.remaining,
        }
    }

    /// Returns the instant the pending expiry is due, if running.
    ///
    /// Returns `None` as well when the deadline lies too far in the future
    /// for an `Instant`.
    pub fn deadline(&self) -> Option<Instant> {
        self.started_at?.checked_add(self.remaining)
    }

    /// Returns the expiry message the timer is currently waiting for.
    pub fn pending_expiry(&self) -> Option<ExpireMsg> {
        self.running().then_some(ExpireMsg {
            id: self.id,
            tag: self.tag,
        })
    }

    /// Pauses the countdown and returns the remaining time.
    ///
    /// Stopping a stopped timer changes nothing and returns the same value
    /// again. If no time is left when the elapsed time is folded in, the
    /// timer expires instead of pausing.
    pub fn stop(&mut self) -> Duration {
        if self.started_at.is_some() {
            self.remaining = self.time_left();
            self.started_at = None;
            self.cancel();
            if self.remaining.is_zero() {
                self.expire();
            } else {
                trace!(id = self.id, remaining = ?self.remaining, "timer stopped");
            }
        }
        self.remaining
    }

    /// Resumes a paused countdown and returns the remaining time.
    ///
    /// Resuming a running timer is a no-op: the start instant and the pending
    /// expiry are left untouched so redundant calls cannot shift the deadline.
    pub fn resume(&mut self) -> Duration {
        if self.inert() {
            return self.remaining;
        }
        if self.running() {
            return self.time_left();
        }

        if self.remaining.is_zero() {
            self.expire();
        } else {
            self.arm();
            trace!(id = self.id, remaining = ?self.remaining, "timer resumed");
        }
        self.remaining
    }

    /// Stops a running timer or resumes a stopped one.
    pub fn toggle(&mut self) -> Duration {
        if self.running() {
            self.stop()
        } else {
            self.resume()
        }
    }

    /// Adds `delta` to the remaining time and returns the new remaining time.
    ///
    /// A running timer folds in the elapsed time first and reschedules its
    /// expiry for the new remaining time; a stopped timer just grows.
    pub fn increase(&mut self, delta: Duration) -> Duration {
        self.adjust(delta, true)
    }

    /// Subtracts `delta` from the remaining time, flooring at zero.
    ///
    /// A running timer that reaches zero expires immediately.
    pub fn decrease(&mut self, delta: Duration) -> Duration {
        self.adjust(delta, false)
    }

    /// Cancels the pending expiry and makes the timer inert.
    ///
    /// The elapsed time is folded in first, so [`Model::time_left`] keeps
    /// returning the value the timer had at disposal. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if self.started_at.is_some() {
            self.remaining = self.time_left();
            self.started_at = None;
        }
        self.cancel();
        self.disposed = true;
        trace!(id = self.id, remaining = ?self.remaining, "timer disposed");
    }

    /// Handles a delivered expiry message and reports whether the timer
    /// expired because of it.
    ///
    /// Messages for other timers, stale tags, stopped or disposed timers are
    /// ignored. A current message that arrives while time is still left
    /// re-arms the expiry for the remainder.
    pub fn fire(&mut self, msg: &ExpireMsg) -> bool {
        if msg.id != self.id || msg.tag != self.tag || !self.running() || self.disposed {
            return false;
        }

        let left = self.time_left();
        if !left.is_zero() {
            self.remaining = left;
            self.arm();
            trace!(id = self.id, remaining = ?left, "early expiry, re-armed");
            return false;
        }

        self.started_at = None;
        self.expire();
        true
    }

    /// Returns the command that delivers the newly armed expiry.
    ///
    /// Each arming hands out exactly one command; later calls return `None`
    /// until the timer is armed again.
    pub fn take_expire_cmd(&mut self) -> Option<Cmd> {
        if !std::mem::take(&mut self.armed) {
            return None;
        }
        let msg = self.pending_expiry()?;
        // A zero period panics inside the tick. Long waits are split: an early
        // message re-arms for the rest.
        let delay = self.time_left().clamp(MIN_TICK, MAX_TICK);
        Some(bubbletea_tick(delay, move |_| Box::new(msg) as Msg))
    }

    /// Processes expiry messages.
    ///
    /// Returns a command emitting [`TimeoutMsg`] when the timer expires, the
    /// rescheduled expiry when the message arrived early, and `None` for
    /// anything else.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        let expire = msg.downcast_ref::<ExpireMsg>()?;
        if self.fire(expire) {
            let id = self.id;
            return Some(bubbletea_tick(Duration::from_nanos(1), move |_| {
                Box::new(TimeoutMsg { id }) as Msg
            }));
        }
        self.take_expire_cmd()
    }

    /// Renders the time left, e.g. `"4.25s"` or `"1m30s"`.
    pub fn view(&self) -> String {
        format_duration(self.time_left())
    }

    fn inert(&self) -> bool {
        self.expired || self.disposed
    }

    fn adjust(&mut self, delta: Duration, grow: bool) -> Duration {
        if self.inert() {
            return self.remaining;
        }

        let base = self.time_left();
        self.remaining = if grow {
            base.saturating_add(delta)
        } else {
            base.saturating_sub(delta)
        };

        if self.running() {
            if self.remaining.is_zero() {
                self.started_at = None;
                self.expire();
            } else {
                self.arm();
            }
        }
        trace!(id = self.id, remaining = ?self.remaining, grow, "timer adjusted");
        self.remaining
    }

    fn arm(&mut self) {
        self.started_at = Some(self.clock.now());
        self.tag += 1;
        self.armed = true;
    }

    fn cancel(&mut self) {
        self.tag += 1;
        self.armed = false;
    }

    fn expire(&mut self) {
        self.remaining = Duration::ZERO;
        self.cancel();
        self.expired = true;
        trace!(id = self.id, "timer expired");
    }
}

impl BubbleTeaModel for Model {
    /// Starts a one minute timer for standalone use.
    fn init() -> (Self, Option<Cmd>) {
        let mut model = Model::default();
        model.start();
        let cmd = model.take_expire_cmd();
        (model, cmd)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}

impl Default for Model {
    /// A stopped one minute timer on the system clock.
    fn default() -> Self {
        new(Duration::from_secs(60))
    }
}
