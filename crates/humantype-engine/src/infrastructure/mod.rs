//! Infrastructure layer for the typing engine.
//!
//! Contains the adapters behind the application-layer ports and the preset
//! file store.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `humantype_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`injection`** – `KeyInjector` implementations: a writer-backed typist
//!   for the terminal and a recording injector for tests.
//! - **`focus`** – `FocusProbe` implementations: always-focused, scripted,
//!   and a window-title monitor.
//! - **`storage`** – built-in presets and JSON / TOML preset files.

pub mod focus;
pub mod injection;
pub mod storage;
