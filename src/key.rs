//! Key bindings for dialogs.

use bubbletea_rs::KeyMsg;
use crossterm::event::KeyCode;

/// A set of keys that trigger one action, plus help text.
#[derive(Debug, Clone)]
pub struct Binding {
    /// Keys that trigger the action.
    pub keys: Vec<KeyCode>,
    /// Short key label shown in help, e.g. `"esc"`.
    pub help: String,
    /// What the action does.
    pub description: String,
}

impl Binding {
    /// Creates a binding for `keys` with empty help text.
    pub fn new(keys: Vec<KeyCode>) -> Self {
        Self {
            keys,
            help: String::new(),
            description: String::new(),
        }
    }

    /// Sets the key label.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Sets the action description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns whether `key_msg` is one of this binding's keys.
    pub fn matches(&self, key_msg: &KeyMsg) -> bool {
        self.keys.contains(&key_msg.key)
    }
}

/// Keys understood by an open dialog.
#[derive(Debug, Clone)]
pub struct DialogKeyMap {
    /// Closes the dialog with a confirmed outcome.
    pub confirm: Binding,
    /// Dismisses the dialog with [`DismissReason::Esc`](crate::dialog::DismissReason::Esc).
    pub cancel: Binding,
    /// Pauses or resumes the dialog's timer.
    pub toggle_timer: Binding,
}

impl Default for DialogKeyMap {
    fn default() -> Self {
        Self {
            confirm: Binding::new(vec![KeyCode::Enter])
                .with_help("enter")
                .with_description("confirm"),
            cancel: Binding::new(vec![KeyCode::Esc])
                .with_help("esc")
                .with_description("dismiss"),
            toggle_timer: Binding::new(vec![KeyCode::Char('p'), KeyCode::Char(' ')])
                .with_help("p")
                .with_description("pause timer"),
        }
    }
}

impl DialogKeyMap {
    /// Bindings in display order. The timer binding is only listed when the
    /// dialog has a timer.
    pub fn bindings(&self, with_timer: bool) -> Vec<&Binding> {
        let mut bindings = vec![&self.confirm, &self.cancel];
        if with_timer {
            bindings.push(&self.toggle_timer);
        }
        bindings
    }

    /// One-line help, e.g. `enter confirm • esc dismiss`.
    ///
    /// `timer_running` is `None` for dialogs without a timer. A paused timer
    /// lists the toggle key as `resume timer`.
    pub fn help_line(&self, timer_running: Option<bool>) -> String {
        let mut entries: Vec<String> = self
            .bindings(false)
            .iter()
            .map(|b| format!("{} {}", b.help, b.description))
            .collect();
        if let Some(running) = timer_running {
            let description = if running {
                self.toggle_timer.description.as_str()
            } else {
                "resume timer"
            };
            entries.push(format!("{} {}", self.toggle_timer.help, description));
        }
        entries.join(" • ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyMsg {
        KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_default_bindings_match() {
        let keymap = DialogKeyMap::default();
        assert!(keymap.confirm.matches(&key(KeyCode::Enter)));
        assert!(keymap.cancel.matches(&key(KeyCode::Esc)));
        assert!(keymap.toggle_timer.matches(&key(KeyCode::Char('p'))));
        assert!(keymap.toggle_timer.matches(&key(KeyCode::Char(' '))));
        assert!(!keymap.confirm.matches(&key(KeyCode::Esc)));
    }

    #[test]
    fn test_help_line_lists_timer_only_when_present() {
        let keymap = DialogKeyMap::default();
        assert_eq!(keymap.help_line(None), "enter confirm • esc dismiss");
        assert!(keymap.help_line(Some(true)).ends_with("p pause timer"));
        assert!(keymap.help_line(Some(false)).ends_with("p resume timer"));
    }
}
