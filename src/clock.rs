//! Time sources for countdown components.
//!
//! Every component that measures elapsed time reads "now" through the
//! [`Clock`] trait instead of calling [`Instant::now`] directly. Production
//! code uses [`SystemClock`]; tests use [`ManualClock`] and advance it by hand,
//! which makes pause/resume accounting fully deterministic.
//!
//! ```rust
//! use bubbletea_dialog::clock::{Clock, ManualClock};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let before = clock.now();
//! clock.advance(Duration::from_millis(250));
//! assert_eq!(clock.now() - before, Duration::from_millis(250));
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// A source of monotonic time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Clock handle shared between a timer and the components that mirror it.
pub type SharedClock = Arc<dyn Clock>;

/// Returns a shared handle to the system clock.
pub fn system() -> SharedClock {
    Arc::new(SystemClock)
}

/// The real monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying instant, so a test can keep one handle
/// and hand another to the component under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    /// Creates a manual clock frozen at the current system instant.
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    /// Moves the clock forward to `instant`. Instants in the past are ignored.
    pub fn advance_to(&self, instant: Instant) {
        let mut now = self.lock();
        if instant > *now {
            *now = instant;
        }
    }

    /// Returns this clock as a [`SharedClock`].
    pub fn shared(&self) -> SharedClock {
        Arc::new(self.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Instant> {
        self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_is_frozen_until_advanced() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);

        clock.advance(Duration::from_millis(40));
        assert_eq!(clock.now(), t0 + Duration::from_millis(40));
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let shared = clock.shared();
        let t0 = shared.now();

        clock.advance(Duration::from_secs(1));
        assert_eq!(shared.now(), t0 + Duration::from_secs(1));
    }

    #[test]
    fn test_advance_to_never_goes_backwards() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        clock.advance(Duration::from_millis(100));

        clock.advance_to(t0);
        assert_eq!(clock.now(), t0 + Duration::from_millis(100));

        clock.advance_to(t0 + Duration::from_millis(300));
        assert_eq!(clock.now(), t0 + Duration::from_millis(300));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = system();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
