//! Typo decisions and corrective action sequences.
//!
//! For every character the [`TypoModel`] first rolls against `typo_rate`.  In
//! the common case nothing happens and the plan is a single intended
//! keystroke.  When the roll hits, one of four typo kinds is picked by the
//! configured weights:
//!
//! | Kind            | Mistake                       | Correction (if noticed)                 |
//! |-----------------|-------------------------------|-----------------------------------------|
//! | `Substitution`  | a neighbouring key instead    | pause, backspace, pause, intended key   |
//! | `Omission`      | the key is skipped            | pause, intended key                     |
//! | `Doubling`      | the key is struck twice       | pause, backspace, pause                 |
//! | `Transposition` | this and the next key swapped | pause, 2× backspace, pause, both in order |
//!
//! A second roll against `correction_rate` (skipped when `always_correct` is
//! set) decides whether the typist notices the slip.  Corrected sequences
//! always leave the text field holding exactly the intended characters.
//!
//! # Why does transposition skip a character? (for beginners)
//!
//! A transposition types *two* source characters (`"ab"` becomes `"ba"`), so
//! the plan for `a` already covers `b`.  [`CharPlan::skip_next`] tells the
//! caller not to plan `b` again.

use std::fmt;
use std::sync::Arc;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::action::{Action, ActionRole};
use crate::error::{ensure_non_negative, ensure_probability, ConfigError};
use crate::keymap::KeyboardLayout;

/// `(mean, standard deviation, floor)` of a human pause in milliseconds.
type PauseShape = (f64, f64, f64);

const SUBSTITUTION_RECOGNITION: PauseShape = (200.0, 50.0, 30.0);
const SUBSTITUTION_RETYPE: PauseShape = (100.0, 30.0, 20.0);
const TRANSPOSITION_RECOGNITION: PauseShape = (275.0, 60.0, 50.0);
const TRANSPOSITION_RETYPE: PauseShape = (100.0, 30.0, 20.0);
const DOUBLING_RECOGNITION: PauseShape = (140.0, 40.0, 30.0);
const DOUBLING_RETYPE: PauseShape = (55.0, 15.0, 15.0);
const OMISSION_RECOGNITION: PauseShape = (180.0, 50.0, 30.0);

// ── Configuration ─────────────────────────────────────────────────────────────

/// The four kinds of typo the planner can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypoKind {
    Substitution,
    Omission,
    Doubling,
    Transposition,
}

impl TypoKind {
    /// Index order matches [`TypoWeights::as_array`].
    pub const ALL: [TypoKind; 4] = [
        TypoKind::Substitution,
        TypoKind::Omission,
        TypoKind::Doubling,
        TypoKind::Transposition,
    ];
}

impl fmt::Display for TypoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypoKind::Substitution => "substitution",
            TypoKind::Omission => "omission",
            TypoKind::Doubling => "doubling",
            TypoKind::Transposition => "transposition",
        };
        f.write_str(s)
    }
}

/// Relative likelihood of each typo kind once a typo has been triggered.
///
/// Weights are relative: `{1, 0, 1, 0}` means half substitutions, half
/// doublings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypoWeights {
    pub substitution: f64,
    pub omission: f64,
    pub doubling: f64,
    pub transposition: f64,
}

impl Default for TypoWeights {
    fn default() -> Self {
        Self {
            substitution: 1.0,
            omission: 0.0,
            doubling: 0.0,
            transposition: 0.0,
        }
    }
}

impl TypoWeights {
    /// A weight set that always picks `kind`.
    pub fn only(kind: TypoKind) -> Self {
        let mut w = Self {
            substitution: 0.0,
            omission: 0.0,
            doubling: 0.0,
            transposition: 0.0,
        };
        match kind {
            TypoKind::Substitution => w.substitution = 1.0,
            TypoKind::Omission => w.omission = 1.0,
            TypoKind::Doubling => w.doubling = 1.0,
            TypoKind::Transposition => w.transposition = 1.0,
        }
        w
    }

    fn as_array(&self) -> [f64; 4] {
        [
            self.substitution,
            self.omission,
            self.doubling,
            self.transposition,
        ]
    }
}

/// Parameters of the typo planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypoConfig {
    /// Probability (0–1) that any given character triggers a typo.
    pub typo_rate: f64,
    pub weights: TypoWeights,
    /// Probability (0–1) that a typo is noticed and corrected.
    pub correction_rate: f64,
    /// Correct every typo regardless of `correction_rate`.
    pub always_correct: bool,
}

impl Default for TypoConfig {
    fn default() -> Self {
        Self {
            typo_rate: 0.003,
            weights: TypoWeights::default(),
            correction_rate: 0.85,
            always_correct: false,
        }
    }
}

impl TypoConfig {
    /// A config that never produces typos.
    pub fn disabled() -> Self {
        Self {
            typo_rate: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validated_kinds().map(|_| ())
    }

    /// Runs every check and returns the typo-kind distribution on success.
    fn validated_kinds(&self) -> Result<WeightedIndex<f64>, ConfigError> {
        ensure_probability("typo_rate", self.typo_rate)?;
        ensure_probability("correction_rate", self.correction_rate)?;
        let weights = self.weights.as_array();
        for (kind, w) in TypoKind::ALL.iter().zip(weights) {
            let field = match kind {
                TypoKind::Substitution => "weights.substitution",
                TypoKind::Omission => "weights.omission",
                TypoKind::Doubling => "weights.doubling",
                TypoKind::Transposition => "weights.transposition",
            };
            ensure_non_negative(field, w)?;
        }
        WeightedIndex::new(weights)
            .map_err(|e| ConfigError::invalid("weights", format!("unusable typo weights: {e}")))
    }
}

// ── Plans and statistics ──────────────────────────────────────────────────────

/// Which typo fired for a character, and whether it was corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypoEvent {
    pub kind: TypoKind,
    pub corrected: bool,
}

/// The planned keystrokes for one source character.
#[derive(Debug, Clone, PartialEq)]
pub struct CharPlan {
    pub actions: Vec<Action>,
    /// The next source character is already covered by `actions`.
    pub skip_next: bool,
    pub typo: Option<TypoEvent>,
}

impl CharPlan {
    fn plain(ch: char) -> Self {
        Self {
            actions: vec![Action::intended(ch)],
            skip_next: false,
            typo: None,
        }
    }
}

/// A [`CharPlan`] tagged with the position of its source character.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChar {
    /// 0-based character index in the source text.
    pub index: usize,
    pub ch: char,
    pub plan: CharPlan,
}

/// Running tally of the planner's decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypoStats {
    pub total_chars: u64,
    pub substitution: u64,
    pub omission: u64,
    pub doubling: u64,
    pub transposition: u64,
    pub corrected: u64,
    pub uncorrected: u64,
}

impl TypoStats {
    /// Total number of typos across all kinds.
    pub fn total(&self) -> u64 {
        self.substitution + self.omission + self.doubling + self.transposition
    }

    pub fn count(&self, kind: TypoKind) -> u64 {
        match kind {
            TypoKind::Substitution => self.substitution,
            TypoKind::Omission => self.omission,
            TypoKind::Doubling => self.doubling,
            TypoKind::Transposition => self.transposition,
        }
    }

    fn record(&mut self, event: TypoEvent) {
        match event.kind {
            TypoKind::Substitution => self.substitution += 1,
            TypoKind::Omission => self.omission += 1,
            TypoKind::Doubling => self.doubling += 1,
            TypoKind::Transposition => self.transposition += 1,
        }
        if event.corrected {
            self.corrected += 1;
        } else {
            self.uncorrected += 1;
        }
    }
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// Plans typos and their corrections.
#[derive(Debug)]
pub struct TypoModel {
    config: TypoConfig,
    layout: Arc<KeyboardLayout>,
    rng: StdRng,
    kinds: WeightedIndex<f64>,
    stats: TypoStats,
}

impl TypoModel {
    /// Validates `config` and builds a planner drawing from `rng`.
    ///
    /// Negative or all-zero weights are rejected here, never per character.
    pub fn new(
        config: TypoConfig,
        layout: Arc<KeyboardLayout>,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        let kinds = config.validated_kinds()?;
        Ok(Self {
            config,
            layout,
            rng,
            kinds,
            stats: TypoStats::default(),
        })
    }

    pub fn with_seed(
        config: TypoConfig,
        layout: Arc<KeyboardLayout>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::new(config, layout, StdRng::seed_from_u64(seed))
    }

    pub fn stats(&self) -> TypoStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = TypoStats::default();
    }

    /// Plans the keystrokes for `ch`.
    ///
    /// `next` is needed for transpositions; without it a transposition
    /// degrades to a plain keystroke.  `_prev` is accepted for symmetry with
    /// the timing pipeline and does not influence the decision.
    pub fn process_char(&mut self, ch: char, _prev: Option<char>, next: Option<char>) -> CharPlan {
        self.stats.total_chars += 1;

        if self.rng.gen::<f64>() >= self.config.typo_rate {
            return CharPlan::plain(ch);
        }

        let kind = TypoKind::ALL[self.kinds.sample(&mut self.rng)];
        let corrected =
            self.config.always_correct || self.rng.gen::<f64>() < self.config.correction_rate;

        let plan = match kind {
            TypoKind::Substitution => self.substitution(ch, corrected),
            TypoKind::Omission => Some(self.omission(ch, corrected)),
            TypoKind::Doubling => Some(self.doubling(ch, corrected)),
            TypoKind::Transposition => next.map(|n| self.transposition(ch, n, corrected)),
        };

        match plan {
            Some((actions, skip_next)) => {
                let event = TypoEvent { kind, corrected };
                self.stats.record(event);
                debug!("planned {kind} typo on {ch:?} (corrected: {corrected})");
                CharPlan {
                    actions,
                    skip_next,
                    typo: Some(event),
                }
            }
            None => CharPlan::plain(ch),
        }
    }

    /// Plans every character of `text`, skipping characters consumed by a
    /// preceding transposition.
    pub fn process_text(&mut self, text: &str) -> Vec<PlannedChar> {
        let chars: Vec<char> = text.chars().collect();
        let mut planned = Vec::with_capacity(chars.len());
        let mut i = 0;
        while i < chars.len() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let plan = self.process_char(chars[i], prev, next);
            let step = if plan.skip_next { 2 } else { 1 };
            planned.push(PlannedChar {
                index: i,
                ch: chars[i],
                plan,
            });
            i += step;
        }
        planned
    }

    // ── Sequences ─────────────────────────────────────────────────────────────

    fn substitution(&mut self, ch: char, corrected: bool) -> Option<(Vec<Action>, bool)> {
        let neighbours = self.layout.adjacent_keys(ch).unwrap_or_default();
        if neighbours.is_empty() {
            return None;
        }
        let wrong = neighbours[self.rng.gen_range(0..neighbours.len())];

        let mut actions = vec![Action::mistake(wrong)];
        if corrected {
            actions.push(self.pause(SUBSTITUTION_RECOGNITION, ActionRole::Recognition));
            actions.push(Action::backspace());
            actions.push(self.pause(SUBSTITUTION_RETYPE, ActionRole::Retype));
            actions.push(Action::correction(ch));
        }
        Some((actions, false))
    }

    fn omission(&mut self, ch: char, corrected: bool) -> (Vec<Action>, bool) {
        if !corrected {
            return (Vec::new(), false);
        }
        let actions = vec![
            self.pause(OMISSION_RECOGNITION, ActionRole::Recognition),
            Action::correction(ch),
        ];
        (actions, false)
    }

    fn doubling(&mut self, ch: char, corrected: bool) -> (Vec<Action>, bool) {
        let mut actions = vec![Action::intended(ch), Action::mistake(ch)];
        if corrected {
            actions.push(self.pause(DOUBLING_RECOGNITION, ActionRole::Recognition));
            actions.push(Action::backspace());
            actions.push(self.pause(DOUBLING_RETYPE, ActionRole::Retype));
        }
        (actions, false)
    }

    fn transposition(&mut self, ch: char, next: char, corrected: bool) -> (Vec<Action>, bool) {
        let mut actions = vec![Action::mistake(next), Action::mistake(ch)];
        if corrected {
            actions.push(self.pause(TRANSPOSITION_RECOGNITION, ActionRole::Recognition));
            actions.push(Action::backspace());
            actions.push(Action::backspace());
            actions.push(self.pause(TRANSPOSITION_RETYPE, ActionRole::Retype));
            actions.push(Action::correction(ch));
            actions.push(Action::correction(next));
        }
        (actions, true)
    }

    /// Draws a normally distributed pause, floored.
    fn pause(&mut self, (mean, sd, floor): PauseShape, role: ActionRole) -> Action {
        let z: f64 = self.rng.sample(StandardNormal);
        let ms = (mean + sd * z).max(floor).round() as u64;
        Action::pause(ms, role)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
