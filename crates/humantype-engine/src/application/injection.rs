//! Key-injection port.
//!
//! The engine never talks to the OS directly.  It calls a [`KeyInjector`]
//! trait object that is handed to it at construction time; concrete
//! implementations live in the infrastructure layer.

use thiserror::Error;

/// Error type for key-injection operations.
#[derive(Debug, Error)]
pub enum InjectionError {
    /// The platform API rejected or failed the keystroke.
    #[error("platform error: {0}")]
    Platform(String),

    /// The injector has no way to produce this character.
    #[error("unsupported character: {0:?}")]
    Unsupported(char),
}

/// Platform-agnostic keystroke output.
///
/// Calls are synchronous and expected to return quickly; they are made from
/// the engine's worker task, one keystroke at a time.
pub trait KeyInjector: Send + Sync {
    /// Types `ch` as a single key press and release.
    fn type_char(&self, ch: char) -> Result<(), InjectionError>;

    /// Types `ch` by holding shift and striking `base`.
    ///
    /// Used in precise mode.  The default delegates to [`type_char`](Self::type_char)
    /// for injectors that cannot drive the modifier separately.
    fn type_shifted(&self, base: char, ch: char) -> Result<(), InjectionError> {
        let _ = base;
        self.type_char(ch)
    }

    /// Presses and releases backspace.
    fn backspace(&self) -> Result<(), InjectionError>;
}
