//! Modal dialog model.
//!
//! A dialog is configured with functional options, is open from the moment it
//! is created, and records how it was closed. It knows nothing about timers:
//! the auto-dismiss countdown lives in [`crate::binding`] and calls
//! [`Model::dismiss`] with [`DismissReason::Timer`] when it runs out.
//!
//! ```rust
//! use bubbletea_dialog::dialog::{self, with_text, with_timer, with_title, DismissReason};
//! use std::time::Duration;
//!
//! let options = dialog::DialogOptions::from_options(&[
//!     with_title("Saved"),
//!     with_text("Your changes were written to disk."),
//!     with_timer(Duration::from_secs(3)),
//! ])
//! .unwrap();
//!
//! let mut d = dialog::new(options);
//! assert!(d.is_open());
//! assert!(d.dismiss(DismissReason::Esc));
//! assert!(!d.is_open());
//! assert_eq!(d.outcome().and_then(|o| o.dismiss_reason()), Some(DismissReason::Esc));
//! ```

use crate::error::OptionsError;
use crate::progress::{self, ProgressOption};
use lipgloss_extras::lipgloss;
use lipgloss_extras::prelude::*;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::debug;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Why a dialog was dismissed without being confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DismissReason {
    /// The cancel button was chosen.
    Cancel,
    /// The user clicked outside the dialog.
    Backdrop,
    /// The dialog was closed programmatically or with its close button.
    Close,
    /// The escape key was pressed.
    Esc,
    /// The auto-dismiss timer ran out.
    Timer,
}

impl DismissReason {
    /// Lowercase name of the reason, e.g. `"timer"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DismissReason::Cancel => "cancel",
            DismissReason::Backdrop => "backdrop",
            DismissReason::Close => "close",
            DismissReason::Esc => "esc",
            DismissReason::Timer => "timer",
        }
    }
}

impl fmt::Display for DismissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a dialog ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The confirm button was chosen.
    Confirmed,
    /// The dialog was dismissed.
    Dismissed(DismissReason),
}

impl Outcome {
    /// Returns whether the dialog was confirmed.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Outcome::Confirmed)
    }

    /// Returns the dismiss reason, if the dialog was dismissed.
    pub fn dismiss_reason(&self) -> Option<DismissReason> {
        match self {
            Outcome::Confirmed => None,
            Outcome::Dismissed(reason) => Some(*reason),
        }
    }
}

/// Configuration options for a dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogOption {
    /// Heading shown at the top of the dialog.
    WithTitle(String),
    /// Body text.
    WithText(String),
    /// Label of the confirm button.
    WithConfirmText(String),
    /// Auto-dismiss after this long. A zero duration means no timer.
    WithTimer(Duration),
    /// Show a progress bar that tracks the timer.
    WithTimerProgressBar,
    /// Width of the timer progress bar.
    WithProgressWidth(i32),
    /// Gradient for the timer progress bar.
    WithProgressGradient(String, String),
}

/// Sets the dialog title.
pub fn with_title(title: impl Into<String>) -> DialogOption {
    DialogOption::WithTitle(title.into())
}

/// Sets the dialog body text.
pub fn with_text(text: impl Into<String>) -> DialogOption {
    DialogOption::WithText(text.into())
}

/// Sets the confirm button label.
pub fn with_confirm_text(text: impl Into<String>) -> DialogOption {
    DialogOption::WithConfirmText(text.into())
}

/// Dismisses the dialog automatically after `duration`.
pub fn with_timer(duration: Duration) -> DialogOption {
    DialogOption::WithTimer(duration)
}

/// Shows a progress bar for the timer.
pub fn with_timer_progress_bar() -> DialogOption {
    DialogOption::WithTimerProgressBar
}

/// Sets the width of the timer progress bar.
pub fn with_progress_width(width: i32) -> DialogOption {
    DialogOption::WithProgressWidth(width)
}

/// Renders the timer progress bar with a gradient.
pub fn with_progress_gradient(color_a: impl Into<String>, color_b: impl Into<String>) -> DialogOption {
    DialogOption::WithProgressGradient(color_a.into(), color_b.into())
}

/// Resolved dialog configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogOptions {
    /// Heading.
    pub title: String,
    /// Body text.
    pub text: String,
    /// Confirm button label.
    pub confirm_text: String,
    /// Auto-dismiss duration; never `Some(Duration::ZERO)`.
    pub timer: Option<Duration>,
    /// Whether the timer gets a progress bar.
    pub timer_progress_bar: bool,
    /// Progress bar width in cells.
    pub progress_width: i32,
    /// Optional progress bar gradient.
    pub progress_gradient: Option<(String, String)>,
}

impl Default for DialogOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            text: String::new(),
            confirm_text: "OK".to_string(),
            timer: None,
            timer_progress_bar: false,
            progress_width: 40,
            progress_gradient: None,
        }
    }
}

impl DialogOptions {
    /// Resolves a list of options, later options overriding earlier ones.
    pub fn from_options(opts: &[DialogOption]) -> Result<Self, OptionsError> {
        let mut options = Self::default();
        for opt in opts {
            options.apply(opt);
        }
        options.validate()?;
        Ok(options)
    }

    /// Checks option combinations that cannot be rendered.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.timer_progress_bar && self.timer.is_none() {
            return Err(OptionsError::ProgressBarWithoutTimer);
        }
        if self.progress_width <= 0 {
            return Err(OptionsError::InvalidProgressWidth(self.progress_width));
        }
        Ok(())
    }

    /// Progress bar options derived from this configuration.
    pub fn progress_options(&self) -> Vec<ProgressOption> {
        let mut opts = vec![
            progress::with_width(self.progress_width),
            progress::without_percentage(),
        ];
        if let Some((a, b)) = &self.progress_gradient {
            opts.push(progress::with_gradient(a.clone(), b.clone()));
        }
        opts
    }

    fn apply(&mut self, opt: &DialogOption) {
        match opt {
            DialogOption::WithTitle(title) => self.title = title.clone(),
            DialogOption::WithText(text) => self.text = text.clone(),
            DialogOption::WithConfirmText(text) => self.confirm_text = text.clone(),
            DialogOption::WithTimer(duration) => {
                self.timer = (!duration.is_zero()).then_some(*duration);
            }
            DialogOption::WithTimerProgressBar => self.timer_progress_bar = true,
            DialogOption::WithProgressWidth(width) => self.progress_width = *width,
            DialogOption::WithProgressGradient(a, b) => {
                self.progress_gradient = Some((a.clone(), b.clone()));
            }
        }
    }
}

/// An open (or closed) dialog.
#[derive(Debug, Clone)]
pub struct Model {
    id: i64,
    options: DialogOptions,
    outcome: Option<Outcome>,
}

/// Creates an open dialog.
pub fn new(options: DialogOptions) -> Model {
    Model {
        id: next_id(),
        options,
        outcome: None,
    }
}

impl Model {
    /// Returns the unique identifier of this dialog.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the resolved options.
    pub fn options(&self) -> &DialogOptions {
        &self.options
    }

    /// Returns whether the dialog is still displayed.
    pub fn is_open(&self) -> bool {
        self.outcome.is_none()
    }

    /// Returns how the dialog ended, once it has.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Closes the dialog with `reason`. Returns `false` if it was already
    /// closed.
    pub fn dismiss(&mut self, reason: DismissReason) -> bool {
        self.close(Outcome::Dismissed(reason))
    }

    /// Closes the dialog as confirmed. Returns `false` if it was already
    /// closed.
    pub fn confirm(&mut self) -> bool {
        self.close(Outcome::Confirmed)
    }

    fn close(&mut self, outcome: Outcome) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        debug!(id = self.id, ?outcome, "dialog closed");
        self.outcome = Some(outcome);
        true
    }

    /// Renders the dialog box. `footer` lines (progress bar, key help) are
    /// appended below the confirm button. A closed dialog renders nothing.
    pub fn view(&self, footer: &[String]) -> String {
        if !self.is_open() {
            return String::new();
        }

        let mut lines = Vec::new();
        if !self.options.title.is_empty() {
            lines.push(
                Style::new()
                    .bold(true)
                    .foreground(lipgloss::Color::from("#7571F9"))
                    .render(&self.options.title),
            );
        }
        if !self.options.text.is_empty() {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push(self.options.text.clone());
        }
        lines.push(String::new());
        lines.push(
            Style::new()
                .foreground(lipgloss::Color::from("#04B575"))
                .render(&format!("[ {} ]", self.options.confirm_text)),
        );
        lines.extend(footer.iter().filter(|l| !l.is_empty()).cloned());

        Style::new()
            .border_style(lipgloss::normal_border())
            .border_top(true)
            .border_right(true)
            .border_bottom(true)
            .border_left(true)
            .padding(0, 1, 0, 1)
            .render(&lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = DialogOptions::from_options(&[]).unwrap();
        assert_eq!(options, DialogOptions::default());
        assert_eq!(options.confirm_text, "OK");
        assert!(options.timer.is_none());
    }

    #[test]
    fn test_options_resolve_in_order() {
        let options = DialogOptions::from_options(&[
            with_title("first"),
            with_title("second"),
            with_timer(Duration::from_millis(500)),
            with_timer_progress_bar(),
            with_progress_width(20),
            with_progress_gradient("#ff0000", "#00ff00"),
        ])
        .unwrap();
        assert_eq!(options.title, "second");
        assert_eq!(options.timer, Some(Duration::from_millis(500)));
        assert!(options.timer_progress_bar);
        assert_eq!(options.progress_width, 20);
        assert_eq!(options.progress_options().len(), 3);
    }

    #[test]
    fn test_zero_timer_means_no_timer() {
        let options = DialogOptions::from_options(&[with_timer(Duration::ZERO)]).unwrap();
        assert!(options.timer.is_none());
    }

    #[test]
    fn test_progress_bar_requires_timer() {
        let err = DialogOptions::from_options(&[with_timer_progress_bar()]).unwrap_err();
        assert_eq!(err, OptionsError::ProgressBarWithoutTimer);
    }

    #[test]
    fn test_progress_width_must_be_positive() {
        let err = DialogOptions::from_options(&[with_progress_width(0)]).unwrap_err();
        assert_eq!(err, OptionsError::InvalidProgressWidth(0));
        assert_eq!(err.to_string(), "progress bar width must be positive, got 0");
    }

    #[test]
    fn test_dismiss_records_first_outcome() {
        let mut d = new(DialogOptions::default());
        assert!(d.is_open());
        assert!(d.dismiss(DismissReason::Timer));
        assert!(!d.confirm());
        assert_eq!(d.outcome(), Some(Outcome::Dismissed(DismissReason::Timer)));
        assert_eq!(DismissReason::Timer.to_string(), "timer");
    }

    #[test]
    fn test_confirm() {
        let mut d = new(DialogOptions::default());
        assert!(d.confirm());
        assert!(d.outcome().unwrap().is_confirmed());
        assert!(d.outcome().unwrap().dismiss_reason().is_none());
    }

    #[test]
    fn test_view_contains_content_until_closed() {
        let options =
            DialogOptions::from_options(&[with_title("Hello"), with_text("World")]).unwrap();
        let mut d = new(options);
        let view = lipgloss::strip_ansi(&d.view(&["footer".to_string()]));
        assert!(view.contains("Hello"));
        assert!(view.contains("World"));
        assert!(view.contains("[ OK ]"));
        assert!(view.contains("footer"));

        d.dismiss(DismissReason::Close);
        assert!(d.view(&[]).is_empty());
    }
}
