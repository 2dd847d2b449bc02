//! Engine configuration.
//!
//! [`EngineConfig`] is the validated, in-memory configuration for one run.
//! [`ControlConfig`] is the `control` group of a preset file; together with
//! the timing and typo groups it converts into an `EngineConfig`.

use humantype_core::{ConfigError, TimingConfig, TypoConfig};
use serde::{Deserialize, Serialize};

/// The `control` group of a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Inject shifted characters as an explicit shift press + base key.
    pub precise_mode: bool,
    /// Seconds to wait before the first keystroke.
    pub countdown_seconds: i32,
    /// Abort the run when the target window loses focus.
    pub focus_monitor_enabled: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            precise_mode: false,
            countdown_seconds: 3,
            focus_monitor_enabled: true,
        }
    }
}

/// Everything the engine needs for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub timing: TimingConfig,
    pub typo: TypoConfig,
    pub countdown_seconds: i32,
    pub precise_mode: bool,
    pub focus_monitor_enabled: bool,
    /// Plan and report everything, but inject nothing and never wait.
    pub dry_run: bool,
    /// Fixed seed for reproducible runs; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_groups(
            TimingConfig::default(),
            TypoConfig::default(),
            &ControlConfig::default(),
        )
    }
}

impl EngineConfig {
    /// Assembles an engine config from the three preset groups.
    pub fn from_groups(timing: TimingConfig, typo: TypoConfig, control: &ControlConfig) -> Self {
        Self {
            timing,
            typo,
            countdown_seconds: control.countdown_seconds,
            precise_mode: control.precise_mode,
            focus_monitor_enabled: control.focus_monitor_enabled,
            dry_run: false,
            seed: None,
        }
    }

    /// Checks every group.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a negative countdown or any
    /// invalid timing or typo field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.countdown_seconds < 0 {
            return Err(ConfigError::Invalid {
                field: "countdown_seconds",
                reason: format!("must be >= 0, got {}", self.countdown_seconds),
            });
        }
        self.timing.validate()?;
        self.typo.validate()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
