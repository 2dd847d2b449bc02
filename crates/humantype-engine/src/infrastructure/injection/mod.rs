//! [`KeyInjector`](crate::application::injection::KeyInjector) implementations.
//!
//! - **`stdout`** – writes keystrokes to any `Write` sink; the CLI uses it to
//!   "type" into the terminal.
//! - **`mock`** – records keystrokes in memory for tests.

pub mod mock;
pub mod stdout;
