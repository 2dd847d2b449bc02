//! Persistent storage for typing presets.

pub mod preset;
