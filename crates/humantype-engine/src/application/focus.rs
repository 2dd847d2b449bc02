//! Focus-check port.
//!
//! Before each character the engine can ask whether the window it started
//! typing into still has focus.  The answer comes from a [`FocusProbe`]; the
//! engine only ever sees a boolean.

/// Opaque token describing the focus target captured when typing starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FocusHandle {
    label: String,
}

impl FocusHandle {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Human-readable description of the target (e.g. a window title).
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Answers "is the original target still focused?".
#[cfg_attr(test, mockall::automock)]
pub trait FocusProbe: Send + Sync {
    /// Records the current focus target.  Called once when typing begins.
    fn capture(&self) -> FocusHandle;

    /// Returns `false` once focus has moved away from `handle`.
    ///
    /// `char_index` is the 0-based index of the character about to be typed.
    fn check(&self, handle: &FocusHandle, char_index: usize) -> bool;
}
