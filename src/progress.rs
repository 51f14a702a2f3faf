//! Countdown progress bar for dialog timers.
//!
//! The bar shows the fraction of the timer that is still left. It does not
//! own a timer; the dialog binding pushes the timer's state into it with
//! [`Model::sync`] after every transition, and the bar then animates on its
//! own:
//!
//! - while the timer runs, the fraction shrinks linearly from the synced
//!   remaining time toward zero, and frame messages keep the view fresh;
//! - while the timer is stopped, the bar is frozen at the synced fraction and
//!   no frames are scheduled.
//!
//! # Basic Usage
//!
//! ```rust
//! use bubbletea_dialog::clock::ManualClock;
//! use bubbletea_dialog::progress::{new, with_width, without_percentage};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut bar = new(&[with_width(20), without_percentage()], clock.shared());
//!
//! bar.sync(Duration::from_secs(4), Duration::from_secs(4), true);
//! clock.advance(Duration::from_secs(1));
//! assert!((bar.percent() - 0.75).abs() < 1e-9);
//!
//! bar.sync(Duration::from_secs(3), Duration::from_secs(4), false);
//! clock.advance(Duration::from_secs(10));
//! assert!((bar.percent() - 0.75).abs() < 1e-9);
//! ```

use crate::clock::SharedClock;
use bubbletea_rs::{tick as bubbletea_tick, Cmd, Msg};
use lipgloss_extras::lipgloss;
use lipgloss_extras::prelude::*;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

const FPS: u64 = 30;
const DEFAULT_WIDTH: i32 = 40;

/// Configuration options for the countdown bar.
///
/// ```rust
/// use bubbletea_dialog::clock;
/// use bubbletea_dialog::progress::{new, with_gradient, with_width};
///
/// let bar = new(
///     &[
///         with_width(30),
///         with_gradient("#ff4757".to_string(), "#5352ed".to_string()),
///     ],
///     clock::system(),
/// );
/// assert_eq!(bar.width, 30);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressOption {
    /// Gradient from #5A56E0 to #EE6FF8.
    WithDefaultGradient,
    /// Gradient between two colors, start first.
    WithGradient(String, String),
    /// A single fill color.
    WithSolidFill(String),
    /// Runes for the filled and the empty part of the bar.
    WithFillCharacters(char, char),
    /// Hide the trailing percentage.
    WithoutPercentage,
    /// Total width in cells, percentage included.
    WithWidth(i32),
}

impl ProgressOption {
    fn apply(&self, m: &mut Model) {
        match self {
            ProgressOption::WithDefaultGradient => {
                m.set_ramp("#5A56E0".to_string(), "#EE6FF8".to_string());
            }
            ProgressOption::WithGradient(color_a, color_b) => {
                m.set_ramp(color_a.clone(), color_b.clone());
            }
            ProgressOption::WithSolidFill(color) => {
                m.full_color = color.clone();
                m.use_ramp = false;
            }
            ProgressOption::WithFillCharacters(full, empty) => {
                m.full = *full;
                m.empty = *empty;
            }
            ProgressOption::WithoutPercentage => {
                m.show_percentage = false;
            }
            ProgressOption::WithWidth(width) => {
                m.width = *width;
            }
        }
    }
}

/// Uses the default purple-to-pink gradient.
pub fn with_default_gradient() -> ProgressOption {
    ProgressOption::WithDefaultGradient
}

/// Uses a gradient between `color_a` and `color_b`.
pub fn with_gradient(color_a: String, color_b: String) -> ProgressOption {
    ProgressOption::WithGradient(color_a, color_b)
}

/// Fills the bar with a single color.
pub fn with_solid_fill(color: String) -> ProgressOption {
    ProgressOption::WithSolidFill(color)
}

/// Sets the runes used for the filled and empty sections.
pub fn with_fill_characters(full: char, empty: char) -> ProgressOption {
    ProgressOption::WithFillCharacters(full, empty)
}

/// Hides the percentage text.
pub fn without_percentage() -> ProgressOption {
    ProgressOption::WithoutPercentage
}

/// Sets the total width of the bar.
pub fn with_width(w: i32) -> ProgressOption {
    ProgressOption::WithWidth(w)
}

/// Redraw request for a running countdown bar.
///
/// Frames carry the bar's id and the tag of the sync that scheduled them;
/// a later sync invalidates older frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMsg {
    id: i64,
    tag: i64,
}

/// Progress bar that mirrors a countdown timer.
#[derive(Debug, Clone)]
pub struct Model {
    id: i64,
    tag: i64,

    /// Total width of the progress bar, including percentage, if set.
    pub width: i32,
    /// Rune for the part of the timer still left.
    pub full: char,
    /// Color of the filled part when no gradient is used.
    pub full_color: String,
    /// Rune for the part of the timer already spent.
    pub empty: char,
    /// Color of the empty part.
    pub empty_color: String,
    /// Whether to render the trailing percentage.
    pub show_percentage: bool,
    /// Style applied to the percentage text.
    pub percentage_style: Style,

    use_ramp: bool,
    ramp_color_a: String,
    ramp_color_b: String,

    total: Duration,
    remaining: Duration,
    // Set while the countdown is animating.
    synced_at: Option<Instant>,
    frame_pending: bool,
    clock: SharedClock,
}

/// Creates a countdown bar with the given options.
///
/// A fresh bar has no countdown attached and renders as full; call
/// [`Model::sync`] to attach timer state.
pub fn new(opts: &[ProgressOption], clock: SharedClock) -> Model {
    let mut m = Model {
        id: next_id(),
        tag: 0,
        width: DEFAULT_WIDTH,
        full: '█',
        full_color: "#7571F9".to_string(),
        empty: '░',
        empty_color: "#606060".to_string(),
        show_percentage: true,
        percentage_style: Style::new(),
        use_ramp: false,
        ramp_color_a: String::new(),
        ramp_color_b: String::new(),
        total: Duration::ZERO,
        remaining: Duration::ZERO,
        synced_at: None,
        frame_pending: false,
        clock,
    };

    for opt in opts {
        opt.apply(&mut m);
    }

    m
}

impl Model {
    /// Returns the unique identifier of this bar.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Resynchronizes the bar with a timer.
    ///
    /// `running` starts (or restarts) a linear countdown whose length equals
    /// `remaining`; otherwise the bar freezes at `remaining / total`.
    pub fn sync(&mut self, remaining: Duration, total: Duration, running: bool) {
        self.total = total;
        self.remaining = remaining;
        self.tag += 1;

        let animate = running && !remaining.is_zero();
        self.synced_at = animate.then(|| self.clock.now());
        self.frame_pending = animate;
    }

    /// Freezes the bar where it currently is.
    pub fn freeze(&mut self) {
        let remaining = self.remaining();
        self.sync(remaining, self.total, false);
    }

    /// Returns whether the bar is counting down.
    pub fn is_animating(&self) -> bool {
        self.synced_at.is_some() && !self.remaining().is_zero()
    }

    /// Returns the remaining time the bar is currently displaying.
    pub fn remaining(&self) -> Duration {
        match self.synced_at {
            Some(at) => self
                .remaining
                .saturating_sub(self.clock.now().saturating_duration_since(at)),
            None => self.remaining,
        }
    }

    /// Returns the displayed fraction of the timer still left, in `0.0..=1.0`.
    ///
    /// A bar with no countdown attached reports `1.0`. Remaining time above
    /// the configured total (after an increase) is shown as full.
    pub fn percent(&self) -> f64 {
        if self.total.is_zero() {
            return 1.0;
        }
        (self.remaining().as_secs_f64() / self.total.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Returns the first frame command after a sync that started a countdown.
    pub fn take_frame_cmd(&mut self) -> Option<Cmd> {
        if !std::mem::take(&mut self.frame_pending) {
            return None;
        }
        Some(self.next_frame())
    }

    /// Handles frame messages, scheduling the next frame while counting down.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        let frame = msg.downcast_ref::<FrameMsg>()?;
        if frame.id != self.id || frame.tag != self.tag || !self.is_animating() {
            return None;
        }
        Some(self.next_frame())
    }

    /// Renders the bar at its current fraction.
    pub fn view(&self) -> String {
        self.view_as(self.percent())
    }

    /// Renders the bar at an explicit fraction.
    pub fn view_as(&self, percent: f64) -> String {
        let percent_view = self.percentage_view(percent);
        let percent_width = lipgloss::width_visible(&percent_view) as i32;
        let bar_view = self.bar_view(percent, percent_width);

        format!("{}{}", bar_view, percent_view)
    }

    fn next_frame(&self) -> Cmd {
        let msg = FrameMsg {
            id: self.id,
            tag: self.tag,
        };
        bubbletea_tick(Duration::from_millis(1000 / FPS), move |_| {
            Box::new(msg) as Msg
        })
    }

    fn bar_view(&self, percent: f64, text_width: i32) -> String {
        let tw = std::cmp::max(0, self.width - text_width);
        let fw = ((tw as f64) * percent.clamp(0.0, 1.0)).round() as i32;
        let fw = fw.clamp(0, tw);

        let mut result = String::new();

        if self.use_ramp {
            // The gradient always spans the whole bar, so the colors of the
            // remaining part stay put while it shrinks.
            let grad_len = std::cmp::max(2, tw) as usize;
            let start = lipgloss::Color::from(self.ramp_color_a.as_str());
            let end = lipgloss::Color::from(self.ramp_color_b.as_str());
            let colors = lipgloss::blending::blend_1d(grad_len, vec![start, end]);

            for i in 0..fw as usize {
                let color = colors[std::cmp::min(i, grad_len - 1)].clone();
                result.push_str(&Style::new().foreground(color).render(&self.full.to_string()));
            }
        } else {
            let styled = Style::new()
                .foreground(lipgloss::Color::from(self.full_color.as_str()))
                .render(&self.full.to_string());
            result.push_str(&styled.repeat(fw as usize));
        }

        let empty_styled = Style::new()
            .foreground(lipgloss::Color::from(self.empty_color.as_str()))
            .render(&self.empty.to_string());
        result.push_str(&empty_styled.repeat((tw - fw) as usize));

        result
    }

    fn percentage_view(&self, percent: f64) -> String {
        if !self.show_percentage {
            return String::new();
        }
        let percentage = format!(" {:3.0}%", percent.clamp(0.0, 1.0) * 100.0);
        self.percentage_style.render(&percentage)
    }

    fn set_ramp(&mut self, color_a: String, color_b: String) {
        self.use_ramp = true;
        self.ramp_color_a = color_a;
        self.ramp_color_b = color_b;
    }
}
