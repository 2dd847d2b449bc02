//! Domain logic for human-like typing.
//!
//! This module contains the pure planning code: given text and configuration
//! it decides *what* keystrokes to produce and *when*.  Nothing here touches
//! the OS, a clock, or an async runtime, so every piece can be unit-tested
//! deterministically with a seeded random generator.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain**.  Domain code:
//!
//! - Contains the core rules of the application.
//! - Has **no** imports from OS APIs, async runtimes, or UI frameworks.
//! - Can be compiled and tested on any platform without any external setup.
//!
//! The engine crate (application + infrastructure layers) depends on this
//! module; this module never depends on the engine.

/// Keystroke directives produced by the typo planner.
pub mod action;

/// Text clean-up applied before a run.
pub mod preprocess;

/// The eight-stage per-character delay pipeline.
///
/// See [`timing::TimingModel`] for the main type.
pub mod timing;

/// Probabilistic typo decisions and corrective action sequences.
///
/// See [`typo::TypoModel`] for the main type.
pub mod typo;
