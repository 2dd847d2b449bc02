//! Focus monitoring by active-window title.
//!
//! # How it works (for beginners)
//!
//! When typing begins, the monitor asks an [`ActiveWindowSource`] for the
//! title of the focused window and stores it in the [`FocusHandle`].  Every
//! `check_interval` characters it asks again: a different title means the
//! user (or a popup) moved focus, and the engine aborts the run.
//!
//! Querying the window system is comparatively slow, so checks in between
//! the interval return `true` without asking.  A source that cannot tell
//! (no title, empty title, query failure) never causes an abort.

use std::process::Command;

use tracing::debug;

use crate::application::focus::{FocusHandle, FocusProbe};

/// Characters between two title queries.
pub const DEFAULT_CHECK_INTERVAL: usize = 10;

/// Reports the title of the currently focused window.
pub trait ActiveWindowSource: Send + Sync {
    /// `None` when the title cannot be determined.
    fn active_title(&self) -> Option<String>;
}

/// Reads the title from the stdout of an external command.
///
/// [`CommandTitleSource::xdotool`] covers X11 desktops.
#[derive(Debug, Clone)]
pub struct CommandTitleSource {
    program: String,
    args: Vec<String>,
}

impl CommandTitleSource {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
        }
    }

    /// `xdotool getactivewindow getwindowname`.
    pub fn xdotool() -> Self {
        Self::new("xdotool", &["getactivewindow", "getwindowname"])
    }
}

impl ActiveWindowSource for CommandTitleSource {
    fn active_title(&self) -> Option<String> {
        match Command::new(&self.program).args(&self.args).output() {
            Ok(output) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_owned())
            }
            Ok(output) => {
                debug!("{} exited with {}", self.program, output.status);
                None
            }
            Err(e) => {
                debug!("cannot run {}: {e}", self.program);
                None
            }
        }
    }
}

/// A [`FocusProbe`] that compares window titles every `check_interval` characters.
#[derive(Debug)]
pub struct WindowTitleMonitor<S> {
    source: S,
    check_interval: usize,
}

impl<S: ActiveWindowSource> WindowTitleMonitor<S> {
    pub fn new(source: S) -> Self {
        Self::with_interval(source, DEFAULT_CHECK_INTERVAL)
    }

    /// An interval of zero is treated as one (check every character).
    pub fn with_interval(source: S, check_interval: usize) -> Self {
        Self {
            source,
            check_interval: check_interval.max(1),
        }
    }
}

impl<S: ActiveWindowSource> FocusProbe for WindowTitleMonitor<S> {
    fn capture(&self) -> FocusHandle {
        FocusHandle::new(self.source.active_title().unwrap_or_default())
    }

    fn check(&self, handle: &FocusHandle, char_index: usize) -> bool {
        if char_index % self.check_interval != 0 || handle.label().is_empty() {
            return true;
        }
        match self.source.active_title() {
            Some(title) if !title.is_empty() => title == handle.label(),
            _ => true,
        }
    }
}
