//! Text clean-up applied before a run.
//!
//! Text pasted from another application often carries Windows line endings,
//! stray indentation or runs of spaces.  [`preprocess`] normalises it in a
//! fixed order: line endings, trim, space runs, newline handling, length cap.

use serde::{Deserialize, Serialize};

/// What to do with newline characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewlineMode {
    /// Keep newlines; they are typed as Enter.
    #[default]
    Enter,
    /// Replace each newline with a space.
    Space,
    /// Drop newlines entirely.
    Remove,
}

/// Options for [`preprocess`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub crlf_normalize: bool,
    pub trim: bool,
    pub normalize_spaces: bool,
    pub newline_mode: NewlineMode,
    pub max_length_enabled: bool,
    /// Maximum length in characters (not bytes).
    pub max_length: usize,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            crlf_normalize: true,
            trim: true,
            normalize_spaces: false,
            newline_mode: NewlineMode::Enter,
            max_length_enabled: false,
            max_length: 10_000,
        }
    }
}

/// Returns a normalised copy of `text`.
pub fn preprocess(text: &str, config: &PreprocessConfig) -> String {
    let mut out = if config.crlf_normalize {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.to_owned()
    };

    if config.trim {
        out = out.trim().to_owned();
    }

    if config.normalize_spaces {
        out = collapse_spaces(&out);
    }

    match config.newline_mode {
        NewlineMode::Enter => {}
        NewlineMode::Space => out = out.replace('\n', " "),
        NewlineMode::Remove => out.retain(|c| c != '\n'),
    }

    if config.max_length_enabled {
        if let Some((byte_idx, _)) = out.char_indices().nth(config.max_length) {
            out.truncate(byte_idx);
        }
    }

    out
}

/// Collapses every run of two or more spaces into one.
fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for c in text.chars() {
        if c == ' ' {
            if !prev_space {
                out.push(c);
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
    }
    out
}
