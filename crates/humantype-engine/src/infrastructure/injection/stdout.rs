//! Key injector that writes to a byte stream.
//!
//! Used by the `humantype` binary to replay a run in the terminal.  Each
//! keystroke is flushed immediately so the output appears at the pace the
//! engine types it.  Backspace is rendered as `\x08 \x08` (move left,
//! overwrite with a space, move left again), which erases the previous
//! glyph on ANSI terminals.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::application::injection::{InjectionError, KeyInjector};

/// Writes keystrokes to `W`.
#[derive(Debug)]
pub struct WriterInjector<W: Write + Send> {
    out: Mutex<W>,
}

/// The injector the CLI uses.
pub type StdoutInjector = WriterInjector<io::Stdout>;

impl StdoutInjector {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> WriterInjector<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, bytes: &[u8]) -> Result<(), InjectionError> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(bytes)
            .and_then(|()| out.flush())
            .map_err(|e| InjectionError::Platform(e.to_string()))
    }
}

impl<W: Write + Send> KeyInjector for WriterInjector<W> {
    fn type_char(&self, ch: char) -> Result<(), InjectionError> {
        let mut buf = [0u8; 4];
        self.write(ch.encode_utf8(&mut buf).as_bytes())
    }

    fn backspace(&self) -> Result<(), InjectionError> {
        self.write(b"\x08 \x08")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_utf8_characters_and_backspace_sequences() {
        let injector = WriterInjector::new(Vec::new());
        injector.type_char('é').unwrap();
        injector.backspace().unwrap();
        injector.type_shifted('1', '!').unwrap();

        let bytes = injector.into_inner();
        assert_eq!(bytes, "é\x08 \x08!".as_bytes());
    }

    #[test]
    fn test_write_errors_become_platform_errors() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let injector = WriterInjector::new(Broken);
        assert!(matches!(
            injector.type_char('a'),
            Err(InjectionError::Platform(_))
        ));
    }
}
