//! Preset persistence: built-in presets plus user presets on disk.
//!
//! A preset bundles every tunable group of a run:
//!
//! ```toml
//! preset_name = "my preset"
//! preset_description = "slow, few typos"
//!
//! [timing]
//! base_delay_ms = 110.0
//!
//! [typo]
//! typo_rate = 0.002
//!
//! [control]
//! countdown_seconds = 5
//!
//! [preprocessing]
//! newline_mode = "space"
//! ```
//!
//! Every group (and every field inside it) may be omitted; missing values take
//! their defaults.  Files are read and written as JSON or TOML depending on
//! the extension.
//!
//! User presets live in the platform config directory:
//! - Windows:  `%APPDATA%\HumanType\presets`
//! - Linux:    `$XDG_CONFIG_HOME/humantype/presets` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/HumanType/presets`

use std::path::{Path, PathBuf};

use humantype_core::{
    ConfigError, PreprocessConfig, TimingConfig, TypoConfig, TypoWeights,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::application::config::{ControlConfig, EngineConfig};

/// Names of the presets compiled into the binary.
pub const BUILTIN_PRESETS: &[&str] = &["default", "fast_accurate", "slow_natural", "sloppy_beginner"];

/// Error type for preset operations.
#[derive(Debug, Error)]
pub enum PresetError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing preset at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read or write preset JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse preset TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to serialize preset TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The file extension is neither `.json` nor `.toml`.
    #[error("unsupported preset format: {0} (expected .json or .toml)")]
    UnsupportedFormat(PathBuf),

    #[error("no preset named {0:?}")]
    NotFound(String),

    /// Built-in presets cannot be overwritten or deleted.
    #[error("{0:?} is a built-in preset")]
    BuiltIn(String),

    /// The preset parsed but holds invalid values.
    #[error("invalid preset: {0}")]
    Config(#[from] ConfigError),
}

// ── Schema ────────────────────────────────────────────────────────────────────

/// On-disk preset schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub preset_name: String,
    pub preset_description: String,
    pub timing: TimingConfig,
    pub typo: TypoConfig,
    pub control: ControlConfig,
    pub preprocessing: PreprocessConfig,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            preset_name: "default".to_owned(),
            preset_description: "Average typist with occasional, mostly corrected typos".to_owned(),
            timing: TimingConfig::default(),
            typo: TypoConfig::default(),
            control: ControlConfig::default(),
            preprocessing: PreprocessConfig::default(),
        }
    }
}

impl Preset {
    /// Converts the preset into a validated engine configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PresetError::Config`] if any value is out of range.
    pub fn engine_config(&self) -> Result<EngineConfig, PresetError> {
        let config =
            EngineConfig::from_groups(self.timing.clone(), self.typo.clone(), &self.control);
        config.validate()?;
        Ok(config)
    }

    /// Looks up a built-in preset by name.
    pub fn builtin(name: &str) -> Option<Preset> {
        match name {
            "default" => Some(Preset::default()),
            "fast_accurate" => Some(Preset {
                preset_name: "fast_accurate".to_owned(),
                preset_description: "Fast, steady typist who rarely makes mistakes".to_owned(),
                timing: TimingConfig {
                    base_delay_ms: 45.0,
                    inter_word_pause_ms: 70.0,
                    punctuation_pause_ms: 120.0,
                    newline_pause_ms: 250.0,
                    burst_enabled: true,
                    jitter_ms: 8.0,
                    min_delay_ms: 10.0,
                    ..TimingConfig::default()
                },
                typo: TypoConfig {
                    typo_rate: 0.001,
                    correction_rate: 0.98,
                    ..TypoConfig::default()
                },
                ..Preset::default()
            }),
            "slow_natural" => Some(Preset {
                preset_name: "slow_natural".to_owned(),
                preset_description: "Relaxed typist who warms up and tires over long texts"
                    .to_owned(),
                timing: TimingConfig {
                    base_delay_ms: 110.0,
                    double_letter_enabled: true,
                    session_curve_enabled: true,
                    inter_word_pause_ms: 180.0,
                    punctuation_pause_ms: 300.0,
                    newline_pause_ms: 600.0,
                    jitter_ms: 25.0,
                    ..TimingConfig::default()
                },
                typo: TypoConfig {
                    typo_rate: 0.004,
                    weights: TypoWeights {
                        substitution: 0.6,
                        omission: 0.1,
                        doubling: 0.1,
                        transposition: 0.2,
                    },
                    correction_rate: 0.9,
                    ..TypoConfig::default()
                },
                ..Preset::default()
            }),
            "sloppy_beginner" => Some(Preset {
                preset_name: "sloppy_beginner".to_owned(),
                preset_description: "Hunt-and-peck beginner who leaves some typos in".to_owned(),
                timing: TimingConfig {
                    base_delay_ms: 150.0,
                    same_finger_factor: 1.35,
                    hand_alternation_factor: 1.0,
                    session_curve_enabled: true,
                    fatigue_factor: 0.1,
                    shift_penalty_ms: 60.0,
                    inter_word_pause_ms: 250.0,
                    jitter_ms: 40.0,
                    min_delay_ms: 30.0,
                    ..TimingConfig::default()
                },
                typo: TypoConfig {
                    typo_rate: 0.03,
                    weights: TypoWeights {
                        substitution: 0.5,
                        omission: 0.15,
                        doubling: 0.15,
                        transposition: 0.2,
                    },
                    correction_rate: 0.6,
                    always_correct: false,
                },
                ..Preset::default()
            }),
            _ => None,
        }
    }

    /// All built-in presets, in [`BUILTIN_PRESETS`] order.
    pub fn builtins() -> Vec<Preset> {
        BUILTIN_PRESETS.iter().filter_map(|n| Preset::builtin(n)).collect()
    }
}

// ── File I/O ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> Result<Format, PresetError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
        Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Format::Toml),
        _ => Err(PresetError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Reads a preset file, choosing the format from its extension.
///
/// # Errors
///
/// Returns [`PresetError::Io`] if the file cannot be read, a parse error if
/// the content is malformed, or [`PresetError::UnsupportedFormat`].
pub fn load_preset(path: &Path) -> Result<Preset, PresetError> {
    let format = format_of(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| PresetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let preset = match format {
        Format::Json => serde_json::from_str(&content)?,
        Format::Toml => toml::from_str(&content)?,
    };
    debug!("loaded preset from {}", path.display());
    Ok(preset)
}

/// Writes `preset` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`PresetError::Io`] for file-system failures, a serialization
/// error, or [`PresetError::UnsupportedFormat`].
pub fn save_preset(path: &Path, preset: &Preset) -> Result<(), PresetError> {
    let format = format_of(path)?;
    let content = match format {
        Format::Json => serde_json::to_string_pretty(preset)?,
        Format::Toml => toml::to_string_pretty(preset)?,
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| PresetError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| PresetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("saved preset to {}", path.display());
    Ok(())
}

// ── Preset store ──────────────────────────────────────────────────────────────

/// A directory of user presets, layered over the built-ins.
#[derive(Debug, Clone)]
pub struct PresetStore {
    dir: PathBuf,
}

impl PresetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Opens the store in the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns [`PresetError::NoPlatformConfigDir`] when the base directory
    /// cannot be determined from the environment.
    pub fn open_default() -> Result<Self, PresetError> {
        platform_config_dir()
            .map(|dir| Self::new(dir.join("presets")))
            .ok_or(PresetError::NoPlatformConfigDir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Names of the user presets, sorted.  A missing directory lists nothing.
    ///
    /// # Errors
    ///
    /// Returns [`PresetError::Io`] if the directory exists but cannot be read.
    pub fn list(&self) -> Result<Vec<String>, PresetError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PresetError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| format_of(path).is_ok())
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_owned))
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Loads a user preset by name, falling back to the built-ins.
    ///
    /// The name is sanitized the same way [`save`](Self::save) does, so only
    /// files directly inside the store directory are ever read.
    ///
    /// # Errors
    ///
    /// Returns [`PresetError::NotFound`] if neither exists, or the error from
    /// [`load_preset`] if the file is unreadable.
    pub fn load(&self, name: &str) -> Result<Preset, PresetError> {
        if let Some(path) = self.existing_file(name) {
            return load_preset(&path);
        }
        Preset::builtin(name).ok_or_else(|| PresetError::NotFound(name.to_owned()))
    }

    /// Saves `preset` as `<sanitized preset_name>.json` and returns the path.
    ///
    /// # Errors
    ///
    /// Returns [`PresetError::BuiltIn`] when the name collides with a
    /// built-in preset, [`PresetError::Config`] when the values are invalid,
    /// or an I/O or serialization error.
    pub fn save(&self, preset: &Preset) -> Result<PathBuf, PresetError> {
        let name = sanitize_name(&preset.preset_name);
        if BUILTIN_PRESETS.contains(&name.as_str()) {
            return Err(PresetError::BuiltIn(name));
        }
        preset.engine_config()?;
        let path = self.dir.join(format!("{name}.json"));
        save_preset(&path, preset)?;
        info!("saved preset {name:?}");
        Ok(path)
    }

    /// Deletes a user preset.  The name is sanitized as in [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns [`PresetError::BuiltIn`] for built-in names and
    /// [`PresetError::NotFound`] when no such file exists.
    pub fn delete(&self, name: &str) -> Result<(), PresetError> {
        let stem = sanitize_name(name);
        if BUILTIN_PRESETS.contains(&stem.as_str()) {
            return Err(PresetError::BuiltIn(stem));
        }
        let path = self
            .existing_file(name)
            .ok_or_else(|| PresetError::NotFound(name.to_owned()))?;
        std::fs::remove_file(&path).map_err(|source| PresetError::Io { path, source })?;
        info!("deleted preset {name:?}");
        Ok(())
    }

    fn existing_file(&self, name: &str) -> Option<PathBuf> {
        let stem = sanitize_name(name);
        ["json", "toml"]
            .iter()
            .map(|ext| self.dir.join(format!("{stem}.{ext}")))
            .find(|path| path.is_file())
    }
}

/// Maps a display name to a safe file stem: letters, digits, `-` and `_`
/// are kept, everything else becomes `_`.
fn sanitize_name(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "preset".to_owned()
    } else {
        stem
    }
}

/// Resolves the platform config base directory including the `HumanType` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("HumanType"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("humantype"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("HumanType")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
