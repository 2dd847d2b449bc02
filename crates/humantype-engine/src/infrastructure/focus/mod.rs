//! [`FocusProbe`] implementations.
//!
//! - [`AlwaysFocused`] – never aborts; used when no focus source exists.
//! - [`ScriptedFocusProbe`] – loses focus at a chosen character; for tests.
//! - **`window_title`** – compares the active window title against the one
//!   captured when typing began.

pub mod window_title;

use crate::application::focus::{FocusHandle, FocusProbe};

/// A probe that always reports the target as focused.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFocused;

impl FocusProbe for AlwaysFocused {
    fn capture(&self) -> FocusHandle {
        FocusHandle::default()
    }

    fn check(&self, _handle: &FocusHandle, _char_index: usize) -> bool {
        true
    }
}

/// A probe that reports focus lost from a given character index onwards.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedFocusProbe {
    lose_at: usize,
}

impl ScriptedFocusProbe {
    /// Focus is lost just before the character at `index` is typed.
    pub fn lose_focus_at(index: usize) -> Self {
        Self { lose_at: index }
    }
}

impl FocusProbe for ScriptedFocusProbe {
    fn capture(&self) -> FocusHandle {
        FocusHandle::new("scripted")
    }

    fn check(&self, _handle: &FocusHandle, char_index: usize) -> bool {
        char_index < self.lose_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_focused_never_reports_loss() {
        let probe = AlwaysFocused;
        let handle = probe.capture();
        assert!((0..1000).all(|i| probe.check(&handle, i)));
    }

    #[test]
    fn test_scripted_probe_loses_focus_at_index() {
        let probe = ScriptedFocusProbe::lose_focus_at(2);
        let handle = probe.capture();
        assert!(probe.check(&handle, 0));
        assert!(probe.check(&handle, 1));
        assert!(!probe.check(&handle, 2));
        assert!(!probe.check(&handle, 3));
    }
}
