//! # humantype-core
//!
//! Planning library for human-like typing: it decides which keystrokes to
//! produce for a text and how long to wait before each one.
//!
//! This crate has zero dependencies on OS APIs, async runtimes, or I/O.  The
//! engine crate drives it; the planning itself is deterministic given a seed.
//!
//! # Architecture overview (for beginners)
//!
//! A typist does not strike keys at a metronomic pace, and occasionally hits
//! the wrong key, notices, and fixes it.  This crate models both effects:
//!
//! - **`keymap`** – The physical keyboard: which keys are neighbours, which
//!   characters need shift, and which finger strikes each key.
//!
//! - **`domain::timing`** – An eight-stage pipeline that turns a character and
//!   its context into a delay in milliseconds plus a per-stage breakdown.
//!
//! - **`domain::typo`** – A probabilistic planner that turns a character into
//!   a list of [`Action`]s: usually one keystroke, sometimes a mistake followed
//!   by pauses, backspaces and the correct key.
//!
//! - **`domain::preprocess`** – Clean-up of pasted text before typing.

pub mod domain;
pub mod error;
pub mod keymap;

// Re-export the most-used types at the crate root so callers can write
// `humantype_core::TimingModel` instead of `humantype_core::domain::timing::TimingModel`.
pub use domain::action::{apply_to, Action, ActionKind, ActionRole};
pub use domain::preprocess::{preprocess, NewlineMode, PreprocessConfig};
pub use domain::timing::{CharTiming, DelayBreakdown, DelayStage, TimingConfig, TimingModel};
pub use domain::typo::{
    CharPlan, PlannedChar, TypoConfig, TypoEvent, TypoKind, TypoModel, TypoStats, TypoWeights,
};
pub use error::ConfigError;
pub use keymap::{Finger, Hand, KeyboardLayout, LayoutError};
