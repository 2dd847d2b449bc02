//! Recording key injector for tests.
//!
//! # Why a recording injector?
//!
//! A real injector sends keystrokes to whatever window has focus, which is
//! useless (and dangerous) in a test run.  `RecordingInjector` pushes every
//! call into a `Mutex<Vec<...>>` so assertions can inspect exactly what was
//! sent and in what order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let injector = Arc::new(RecordingInjector::new());
//! let engine = Engine::new(config, injector.clone(), dispatch)?;
//!
//! engine.start("hi")?.await?;
//!
//! assert_eq!(injector.typed_text(), "hi");
//! ```
//!
//! # Simulated failures
//!
//! Set `should_fail` to fail every call, `fail_on` to fail only one
//! character, or `fail_backspace` to fail every backspace.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::application::injection::{InjectionError, KeyInjector};

/// One recorded injector call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    Char(char),
    Shifted { base: char, ch: char },
    Backspace,
}

/// An injector that records every successful call.
#[derive(Debug, Default)]
pub struct RecordingInjector {
    /// Successful calls, in order.
    pub keystrokes: Mutex<Vec<Keystroke>>,
    /// When `true`, every call returns [`InjectionError::Platform`].
    pub should_fail: bool,
    /// Fails `type_char` / `type_shifted` for this character only.
    pub fail_on: Option<char>,
    /// Fails every `backspace` call.
    pub fail_backspace: bool,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// An injector that rejects `ch` and accepts everything else.
    pub fn failing_on(ch: char) -> Self {
        Self {
            fail_on: Some(ch),
            ..Self::default()
        }
    }

    /// Snapshot of the recorded calls.
    pub fn keystrokes(&self) -> Vec<Keystroke> {
        self.records().clone()
    }

    /// Replays the recorded calls into a text buffer, as an editor would.
    pub fn typed_text(&self) -> String {
        let mut text = String::new();
        for key in self.records().iter() {
            match key {
                Keystroke::Char(c) | Keystroke::Shifted { ch: c, .. } => text.push(*c),
                Keystroke::Backspace => {
                    text.pop();
                }
            }
        }
        text
    }

    fn records(&self) -> MutexGuard<'_, Vec<Keystroke>> {
        self.keystrokes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_char(&self, ch: char) -> Result<(), InjectionError> {
        if self.should_fail || self.fail_on == Some(ch) {
            return Err(InjectionError::Platform("mock failure".into()));
        }
        Ok(())
    }
}

impl KeyInjector for RecordingInjector {
    fn type_char(&self, ch: char) -> Result<(), InjectionError> {
        self.check_char(ch)?;
        self.records().push(Keystroke::Char(ch));
        Ok(())
    }

    fn type_shifted(&self, base: char, ch: char) -> Result<(), InjectionError> {
        self.check_char(ch)?;
        self.records().push(Keystroke::Shifted { base, ch });
        Ok(())
    }

    fn backspace(&self) -> Result<(), InjectionError> {
        if self.should_fail || self.fail_backspace {
            return Err(InjectionError::Platform("mock failure".into()));
        }
        self.records().push(Keystroke::Backspace);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_text_replays_backspaces() {
        let injector = RecordingInjector::new();
        injector.type_char('a').unwrap();
        injector.type_char('x').unwrap();
        injector.backspace().unwrap();
        injector.type_shifted('b', 'B').unwrap();

        assert_eq!(injector.typed_text(), "aB");
        assert_eq!(injector.keystrokes().len(), 4);
    }

    #[test]
    fn test_should_fail_rejects_every_call_and_records_nothing() {
        let injector = RecordingInjector {
            should_fail: true,
            ..RecordingInjector::default()
        };
        assert!(injector.type_char('a').is_err());
        assert!(injector.type_shifted('a', 'A').is_err());
        assert!(injector.backspace().is_err());
        assert!(injector.keystrokes().is_empty());
    }

    #[test]
    fn test_fail_on_only_rejects_that_character() {
        let injector = RecordingInjector::failing_on('q');
        assert!(injector.type_char('q').is_err());
        assert!(injector.type_char('w').is_ok());
        assert_eq!(injector.typed_text(), "w");
    }
}
