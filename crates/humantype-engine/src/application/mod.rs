//! Application layer: the typing engine and the ports it drives.
//!
//! # What lives here?
//!
//! - **`engine`** – the [`Engine`](engine::Engine) state machine.  It owns a
//!   run's lifecycle (countdown, typing, pause, stop) and walks the text one
//!   character at a time, asking the core planners what to do.
//! - **`control`** – the lock-free state and stop bit shared between the
//!   worker task and the caller.
//! - **`events`** – [`EngineEvent`](events::EngineEvent) and the dispatch
//!   function that carries them to the observer in order.
//! - **`stats`** – the [`RunStats`](stats::RunStats) summary of a run.
//! - **`config`** – [`EngineConfig`](config::EngineConfig), validated once.
//! - **`injection`** / **`focus`** – port traits for the OS-facing side.
//!   Implementations live in `infrastructure` and are injected at
//!   construction time.

pub mod config;
pub mod control;
pub mod engine;
pub mod events;
pub mod focus;
pub mod injection;
pub mod stats;
