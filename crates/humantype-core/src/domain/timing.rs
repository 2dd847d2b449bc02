//! Per-character delay pipeline.
//!
//! [`TimingModel::calculate_delay`] decides how long the typist waits before
//! striking a character.  The delay is built up by eight stages that always
//! run in the same order:
//!
//! | # | Stage        | Kind           | Models                                           |
//! |---|--------------|----------------|--------------------------------------------------|
//! | 1 | `base`       | start value    | overall typing speed                             |
//! | 2 | `class`      | multiplicative | digits and symbols are slower than letters       |
//! | 3 | `digraph`    | multiplicative | intra-word flow, repeats, same finger, alternation |
//! | 4 | `session`    | multiplicative | warm-up at the start, fatigue towards the end     |
//! | 5 | `shift`      | additive       | holding the shift modifier                        |
//! | 6 | `boundary`   | additive       | pauses after spaces, punctuation, newlines, bursts |
//! | 7 | `jitter`     | additive       | bounded random noise                              |
//! | 8 | `floor`      | clamp          | nobody types faster than the configured minimum   |
//!
//! # How multiplicative stages are recorded (for beginners)
//!
//! The breakdown stores every stage as the number of milliseconds it *added*
//! (possibly negative).  A ×0.8 factor applied to a running total of 70 ms is
//! recorded as `-14.0`.  Because every entry is a plain contribution, the
//! returned delay is always exactly the sum of the breakdown, and the floor
//! stage guarantees that sum is never below `min_delay_ms`.
//!
//! # Randomness
//!
//! Jitter, boundary-pause noise and burst lengths all draw from the model's
//! own [`StdRng`].  Two models built with the same seed and fed the same text
//! produce identical delays.

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ConfigError};
use crate::keymap::KeyboardLayout;

/// Characters after which a punctuation pause is inserted.
const PUNCTUATION_PAUSE_CHARS: &[char] = &['.', ',', '!', '?', ':', ';'];

/// Relative noise applied to the newline, punctuation and burst pauses.
const PAUSE_NOISE: f64 = 0.3;

/// Relative noise applied to the inter-word pause.
const WORD_PAUSE_NOISE: f64 = 0.2;

/// Jitter is truncated at this many standard deviations.
const JITTER_CLAMP_SIGMAS: f64 = 3.0;

// ── Configuration ─────────────────────────────────────────────────────────────

/// Parameters of the delay pipeline.
///
/// All durations are milliseconds.  Every field has a default, so a preset
/// file only needs to list the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    // Stage 1
    pub base_delay_ms: f64,

    // Stage 2
    pub digit_factor: f64,
    pub punctuation_factor: f64,
    pub whitespace_factor: f64,

    // Stage 3
    pub word_boundary_enabled: bool,
    pub intra_word_speed_factor: f64,
    pub double_letter_enabled: bool,
    pub double_letter_speed_factor: f64,
    pub same_finger_factor: f64,
    pub hand_alternation_factor: f64,

    // Stage 4
    #[serde(alias = "fatigue_enabled")]
    pub session_curve_enabled: bool,
    pub warmup_factor: f64,
    pub fatigue_factor: f64,

    // Stage 5
    pub shift_penalty_enabled: bool,
    pub shift_penalty_ms: f64,

    // Stage 6
    pub inter_word_pause_ms: f64,
    pub punctuation_pause_enabled: bool,
    pub punctuation_pause_ms: f64,
    pub newline_pause_enabled: bool,
    pub newline_pause_ms: f64,
    pub burst_enabled: bool,
    pub burst_length_min: u32,
    pub burst_length_max: u32,
    pub burst_pause_ms: f64,

    // Stage 7
    /// Standard deviation of the jitter noise.
    pub jitter_ms: f64,

    // Stage 8
    pub min_delay_ms: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 70.0,
            digit_factor: 1.15,
            punctuation_factor: 1.10,
            whitespace_factor: 0.90,
            word_boundary_enabled: true,
            intra_word_speed_factor: 0.8,
            double_letter_enabled: false,
            double_letter_speed_factor: 0.6,
            same_finger_factor: 1.2,
            hand_alternation_factor: 0.9,
            session_curve_enabled: false,
            warmup_factor: 0.1,
            fatigue_factor: 0.05,
            shift_penalty_enabled: true,
            shift_penalty_ms: 25.0,
            inter_word_pause_ms: 120.0,
            punctuation_pause_enabled: true,
            punctuation_pause_ms: 200.0,
            newline_pause_enabled: true,
            newline_pause_ms: 400.0,
            burst_enabled: false,
            burst_length_min: 2,
            burst_length_max: 5,
            burst_pause_ms: 40.0,
            jitter_ms: 15.0,
            min_delay_ms: 15.0,
        }
    }
}

impl TimingConfig {
    /// Checks every field, returning the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("base_delay_ms", self.base_delay_ms),
            ("digit_factor", self.digit_factor),
            ("punctuation_factor", self.punctuation_factor),
            ("whitespace_factor", self.whitespace_factor),
            ("intra_word_speed_factor", self.intra_word_speed_factor),
            ("double_letter_speed_factor", self.double_letter_speed_factor),
            ("same_finger_factor", self.same_finger_factor),
            ("hand_alternation_factor", self.hand_alternation_factor),
            ("warmup_factor", self.warmup_factor),
            ("fatigue_factor", self.fatigue_factor),
            ("shift_penalty_ms", self.shift_penalty_ms),
            ("inter_word_pause_ms", self.inter_word_pause_ms),
            ("punctuation_pause_ms", self.punctuation_pause_ms),
            ("newline_pause_ms", self.newline_pause_ms),
            ("burst_pause_ms", self.burst_pause_ms),
            ("jitter_ms", self.jitter_ms),
            ("min_delay_ms", self.min_delay_ms),
        ];
        for (field, value) in non_negative {
            ensure_non_negative(field, value)?;
        }

        if self.burst_length_min == 0 {
            return Err(ConfigError::invalid("burst_length_min", "must be at least 1"));
        }
        if self.burst_length_min > self.burst_length_max {
            return Err(ConfigError::invalid(
                "burst_length_max",
                format!(
                    "must be >= burst_length_min ({}), got {}",
                    self.burst_length_min, self.burst_length_max
                ),
            ));
        }
        Ok(())
    }
}

// ── Breakdown ─────────────────────────────────────────────────────────────────

/// One of the eight pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelayStage {
    Base,
    CharClass,
    Digraph,
    SessionCurve,
    Shift,
    Boundary,
    Jitter,
    Floor,
}

impl DelayStage {
    /// All stages in evaluation order.
    pub const ALL: [DelayStage; 8] = [
        DelayStage::Base,
        DelayStage::CharClass,
        DelayStage::Digraph,
        DelayStage::SessionCurve,
        DelayStage::Shift,
        DelayStage::Boundary,
        DelayStage::Jitter,
        DelayStage::Floor,
    ];

    /// Short name used in breakdown tags.
    pub fn name(self) -> &'static str {
        match self {
            DelayStage::Base => "base",
            DelayStage::CharClass => "class",
            DelayStage::Digraph => "digraph",
            DelayStage::SessionCurve => "session",
            DelayStage::Shift => "shift",
            DelayStage::Boundary => "boundary",
            DelayStage::Jitter => "jitter",
            DelayStage::Floor => "floor",
        }
    }
}

/// Millisecond contribution of every stage for one character, in stage order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DelayBreakdown {
    stages: Vec<(DelayStage, f64)>,
}

impl DelayBreakdown {
    fn push(&mut self, stage: DelayStage, ms: f64) {
        self.stages.push((stage, ms));
    }

    /// Sum of all stage contributions.
    pub fn total(&self) -> f64 {
        self.stages.iter().fold(0.0, |acc, (_, ms)| acc + ms)
    }

    /// Contribution of a single stage, `0.0` if it was not recorded.
    pub fn get(&self, stage: DelayStage) -> f64 {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, ms)| *ms)
            .unwrap_or(0.0)
    }

    /// Iterates `(stage, ms)` pairs in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (DelayStage, f64)> + '_ {
        self.stages.iter().copied()
    }
}

/// Renders a compact tag such as `[base:70.0 digraph:-14.0 jitter:+3.2]`.
/// Stages that contributed nothing are left out.
impl fmt::Display for DelayBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        let mut first = true;
        for (stage, ms) in &self.stages {
            if *stage != DelayStage::Base && *ms == 0.0 {
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            if *stage == DelayStage::Base {
                write!(f, "{}:{ms:.1}", stage.name())?;
            } else {
                write!(f, "{}:{ms:+.1}", stage.name())?;
            }
        }
        f.write_str("]")
    }
}

/// Delay planned for one character of a text.
#[derive(Debug, Clone, PartialEq)]
pub struct CharTiming {
    pub ch: char,
    pub delay_ms: f64,
    pub breakdown: DelayBreakdown,
}

// ── Character classes ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Letter,
    Digit,
    Punctuation,
    Whitespace,
}

fn classify(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Whitespace
    } else if c.is_ascii_digit() {
        CharClass::Digit
    } else if c.is_ascii_punctuation() {
        CharClass::Punctuation
    } else {
        CharClass::Letter
    }
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// Computes per-character delays.
///
/// Holds its configuration, a shared layout and an exclusively owned random
/// generator.  The only mutable state besides the generator is the burst
/// counter, which [`reset`](Self::reset) clears between texts.
#[derive(Debug)]
pub struct TimingModel {
    config: TimingConfig,
    layout: Arc<KeyboardLayout>,
    rng: StdRng,
    burst_counter: u32,
    burst_size: u32,
}

impl TimingModel {
    /// Validates `config` and builds a model drawing from `rng`.
    pub fn new(
        config: TimingConfig,
        layout: Arc<KeyboardLayout>,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut model = Self {
            config,
            layout,
            rng,
            burst_counter: 0,
            burst_size: 0,
        };
        model.reset();
        Ok(model)
    }

    /// Convenience constructor seeding the generator from `seed`.
    pub fn with_seed(
        config: TimingConfig,
        layout: Arc<KeyboardLayout>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::new(config, layout, StdRng::seed_from_u64(seed))
    }

    /// Clears per-text state.  Call before starting a new text.
    pub fn reset(&mut self) {
        self.burst_counter = 0;
        self.burst_size = self.draw_burst_size();
    }

    /// Computes the delay before typing `ch`.
    ///
    /// `prev` is the previously typed character (`None` for the first one),
    /// `index` is the 0-based position of `ch` and `total` the length of the
    /// text in characters.  The returned delay equals `breakdown.total()` and
    /// is never below `min_delay_ms`.
    pub fn calculate_delay(
        &mut self,
        ch: char,
        prev: Option<char>,
        index: usize,
        total: usize,
    ) -> (f64, DelayBreakdown) {
        let mut breakdown = DelayBreakdown::default();
        let mut running = 0.0;
        let mut record = |stage: DelayStage, ms: f64, running: &mut f64| {
            breakdown.push(stage, ms);
            *running += ms;
        };

        // 1. base
        record(DelayStage::Base, self.config.base_delay_ms, &mut running);

        // 2. character class
        let class_factor = self.class_factor(ch);
        let delta = running * (class_factor - 1.0);
        record(DelayStage::CharClass, delta, &mut running);

        // 3. digraph
        let digraph_factor = self.digraph_factor(ch, prev);
        let delta = running * (digraph_factor - 1.0);
        record(DelayStage::Digraph, delta, &mut running);

        // 4. session curve
        let session_factor = self.session_factor(index, total);
        let delta = running * (session_factor - 1.0);
        record(DelayStage::SessionCurve, delta, &mut running);

        // 5. shift
        let shift = if self.config.shift_penalty_enabled
            && self.layout.is_shift_required(ch).unwrap_or(false)
        {
            self.config.shift_penalty_ms
        } else {
            0.0
        };
        record(DelayStage::Shift, shift, &mut running);

        // 6. boundary
        let boundary = self.boundary_pause(ch, prev);
        record(DelayStage::Boundary, boundary, &mut running);

        // 7. jitter
        let jitter = self.jitter();
        record(DelayStage::Jitter, jitter, &mut running);

        // 8. floor
        let floor = (self.config.min_delay_ms - running).max(0.0);
        record(DelayStage::Floor, floor, &mut running);

        (breakdown.total(), breakdown)
    }

    /// Computes delays for every character of `text`, resetting burst state first.
    pub fn calculate_all(&mut self, text: &str) -> Vec<CharTiming> {
        self.reset();
        let total = text.chars().count();
        let mut prev = None;
        text.chars()
            .enumerate()
            .map(|(index, ch)| {
                let (delay_ms, breakdown) = self.calculate_delay(ch, prev, index, total);
                prev = Some(ch);
                CharTiming {
                    ch,
                    delay_ms,
                    breakdown,
                }
            })
            .collect()
    }

    // ── Stages ────────────────────────────────────────────────────────────────

    fn class_factor(&self, ch: char) -> f64 {
        match classify(ch) {
            CharClass::Letter => 1.0,
            CharClass::Digit => self.config.digit_factor,
            CharClass::Punctuation => self.config.punctuation_factor,
            CharClass::Whitespace => self.config.whitespace_factor,
        }
    }

    fn digraph_factor(&self, ch: char, prev: Option<char>) -> f64 {
        let Some(prev) = prev else {
            return 1.0;
        };
        let cfg = &self.config;
        let mut factor = 1.0;

        if cfg.word_boundary_enabled && !prev.is_whitespace() && !ch.is_whitespace() {
            factor *= cfg.intra_word_speed_factor;
        }

        let same_key = match (self.layout.base_key(ch), self.layout.base_key(prev)) {
            (Ok(a), Ok(b)) => a == b,
            _ => ch.to_lowercase().eq(prev.to_lowercase()),
        };
        if same_key {
            if cfg.double_letter_enabled {
                factor *= cfg.double_letter_speed_factor;
            }
            return factor;
        }

        if let (Ok(f_cur), Ok(f_prev)) = (self.layout.finger(ch), self.layout.finger(prev)) {
            if f_cur == f_prev && f_cur.hand().is_some() {
                factor *= cfg.same_finger_factor;
            } else if let (Some(h_cur), Some(h_prev)) = (f_cur.hand(), f_prev.hand()) {
                if h_cur != h_prev {
                    factor *= cfg.hand_alternation_factor;
                }
            }
        }
        factor
    }

    fn session_factor(&self, index: usize, total: usize) -> f64 {
        if !self.config.session_curve_enabled || total == 0 {
            return 1.0;
        }
        let progress = (index as f64 / total as f64).clamp(0.0, 1.0);
        let warmup = 1.0 + self.config.warmup_factor * (1.0 - progress).powi(2);
        let fatigue = 1.0 + self.config.fatigue_factor * progress;
        warmup * fatigue
    }

    fn boundary_pause(&mut self, ch: char, prev: Option<char>) -> f64 {
        let mut pause = 0.0;

        // A newline pause replaces the word pause.
        if self.config.newline_pause_enabled && prev == Some('\n') {
            pause += self.noisy(self.config.newline_pause_ms, PAUSE_NOISE);
        } else if self.config.word_boundary_enabled
            && matches!(prev, Some(' ') | Some('\t'))
            && !ch.is_whitespace()
        {
            pause += self.noisy(self.config.inter_word_pause_ms, WORD_PAUSE_NOISE);
        }

        if self.config.punctuation_pause_enabled
            && prev.is_some_and(|p| PUNCTUATION_PAUSE_CHARS.contains(&p))
        {
            pause += self.noisy(self.config.punctuation_pause_ms, PAUSE_NOISE);
        }

        if self.config.burst_enabled && self.burst_boundary() {
            pause += self.noisy(self.config.burst_pause_ms, PAUSE_NOISE);
        }

        pause
    }

    fn jitter(&mut self) -> f64 {
        let sigma = self.config.jitter_ms;
        if sigma == 0.0 {
            return 0.0;
        }
        let z: f64 = self.rng.sample(StandardNormal);
        (z * sigma).clamp(-JITTER_CLAMP_SIGMAS * sigma, JITTER_CLAMP_SIGMAS * sigma)
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// `ms * (1 + N(0, rel_sigma))`, clamped at zero.
    fn noisy(&mut self, ms: f64, rel_sigma: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        (ms * (1.0 + rel_sigma * z)).max(0.0)
    }

    fn burst_boundary(&mut self) -> bool {
        self.burst_counter += 1;
        if self.burst_counter >= self.burst_size {
            self.burst_counter = 0;
            self.burst_size = self.draw_burst_size();
            true
        } else {
            false
        }
    }

    fn draw_burst_size(&mut self) -> u32 {
        let (lo, hi) = (self.config.burst_length_min, self.config.burst_length_max);
        self.rng.gen_range(lo..=hi.max(lo))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
