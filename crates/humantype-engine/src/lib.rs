//! humantype-engine library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the engine do? (for beginners)
//!
//! `humantype-core` decides *what* a human would type and *how long* each
//! keystroke takes.  This crate actually *performs* the typing:
//!
//! 1. Waits out a short countdown so the user can focus the target window.
//! 2. For every character, sleeps the planned delay and sends the planned
//!    keystrokes (including mistakes and their corrections) through a
//!    [`KeyInjector`](application::injection::KeyInjector).
//! 3. Between characters, honours pause, resume and stop requests and checks
//!    that the target window still has focus.
//! 4. Reports state changes, progress, log lines and a final summary to an
//!    observer through a single ordered event stream.
//!
//! The run executes on its own tokio task, so the caller stays responsive.

/// Application layer: the engine, its control block, events and ports.
pub mod application;

/// Infrastructure layer: injectors, focus probes and preset storage.
pub mod infrastructure;

pub use application::config::{ControlConfig, EngineConfig};
pub use application::control::{EngineState, RunControl};
pub use application::engine::{build_planners, Engine, EngineError, RunOutcome};
pub use application::events::{channel_dispatch, AbortReason, Dispatch, EngineEvent};
pub use application::focus::{FocusHandle, FocusProbe};
pub use application::injection::{InjectionError, KeyInjector};
pub use application::stats::RunStats;
