//! Keystroke directives.
//!
//! The typo planner turns every source character into an ordered list of
//! [`Action`]s.  In the common case that list is a single `Type(c)`; when a
//! typo fires it may contain a wrong character, pauses, backspaces and the
//! corrected character.
//!
//! # Roles (for beginners)
//!
//! The [`ActionKind`] is all the injector needs to know.  The [`ActionRole`]
//! says *why* the action exists (the intended keystroke, a mistake, the
//! hesitation before noticing it, ...).  Roles never change what gets typed;
//! they only feed log lines and statistics.

use std::fmt;

/// What a single action does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Press and release the key producing this character.
    Type(char),
    /// Press and release backspace.
    Backspace,
    /// Wait this many milliseconds without typing.
    Pause(u64),
}

/// Why an action is part of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionRole {
    /// The keystroke the text asked for.
    Intended,
    /// A wrong keystroke (substitution, doubled or swapped character).
    Mistake,
    /// A keystroke that repairs an earlier mistake (backspace or retyped character).
    Correction,
    /// Hesitation before the typist notices the mistake.
    Recognition,
    /// Hesitation between erasing and retyping.
    Retype,
}

impl ActionRole {
    /// Lower-case label used in log lines.
    pub fn label(self) -> &'static str {
        match self {
            ActionRole::Intended => "typed",
            ActionRole::Mistake => "mistake",
            ActionRole::Correction => "correction",
            ActionRole::Recognition => "recognition",
            ActionRole::Retype => "retype",
        }
    }
}

/// One keystroke directive and its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub role: ActionRole,
}

impl Action {
    pub fn intended(c: char) -> Self {
        Self {
            kind: ActionKind::Type(c),
            role: ActionRole::Intended,
        }
    }

    pub fn mistake(c: char) -> Self {
        Self {
            kind: ActionKind::Type(c),
            role: ActionRole::Mistake,
        }
    }

    pub fn correction(c: char) -> Self {
        Self {
            kind: ActionKind::Type(c),
            role: ActionRole::Correction,
        }
    }

    pub fn backspace() -> Self {
        Self {
            kind: ActionKind::Backspace,
            role: ActionRole::Correction,
        }
    }

    pub fn pause(ms: u64, role: ActionRole) -> Self {
        Self {
            kind: ActionKind::Pause(ms),
            role,
        }
    }

    /// Returns `true` if the action produces a keystroke (anything but a pause).
    pub fn is_keystroke(&self) -> bool {
        !matches!(self.kind, ActionKind::Pause(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ActionKind::Type(c) => write!(f, "{} {c:?}", self.role.label()),
            ActionKind::Backspace => f.write_str("backspace"),
            ActionKind::Pause(ms) => write!(f, "{} pause {ms}ms", self.role.label()),
        }
    }
}

/// Replays `actions` into `buffer` the way a text field would: `Type` appends,
/// `Backspace` removes the last character, `Pause` does nothing.
pub fn apply_to(buffer: &mut String, actions: &[Action]) {
    for action in actions {
        match action.kind {
            ActionKind::Type(c) => buffer.push(c),
            ActionKind::Backspace => {
                buffer.pop();
            }
            ActionKind::Pause(_) => {}
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_to_types_and_erases() {
        // Arrange
        let actions = [
            Action::mistake('x'),
            Action::pause(200, ActionRole::Recognition),
            Action::backspace(),
            Action::correction('c'),
        ];
        let mut buffer = String::from("ab");

        // Act
        apply_to(&mut buffer, &actions);

        // Assert
        assert_eq!(buffer, "abc");
    }

    #[test]
    fn test_backspace_on_empty_buffer_is_harmless() {
        let mut buffer = String::new();
        apply_to(&mut buffer, &[Action::backspace(), Action::intended('a')]);
        assert_eq!(buffer, "a");
    }

    #[test]
    fn test_pause_is_not_a_keystroke() {
        assert!(!Action::pause(10, ActionRole::Retype).is_keystroke());
        assert!(Action::backspace().is_keystroke());
        assert!(Action::intended('q').is_keystroke());
    }

    #[test]
    fn test_display_includes_role() {
        assert_eq!(Action::intended('a').to_string(), "typed 'a'");
        assert_eq!(
            Action::pause(120, ActionRole::Recognition).to_string(),
            "recognition pause 120ms"
        );
        assert_eq!(Action::backspace().to_string(), "backspace");
    }
}
