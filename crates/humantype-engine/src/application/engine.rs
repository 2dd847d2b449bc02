//! The typing engine: a cancelable state machine that drives the planners.
//!
//! ```text
//! Idle ──start()──▶ Countdown ──countdown elapses──▶ Typing ──text consumed──▶ Done ──▶ Idle
//!                     │                               │  ▲
//!                     │                       pause() │  │ resume()
//!                     │                               ▼  │
//!                     │                              Paused
//!                     └──────── stop() from Countdown, Typing or Paused ──────────────▶ Idle
//! ```
//!
//! # Per-character loop (for beginners)
//!
//! Once typing starts, the worker repeats for every source character:
//!
//! 1. **Checkpoint** – honour a pending pause (park until resumed), exit on
//!    stop, abort if the focus probe says the target window changed.
//! 2. **Plan** – ask the [`TimingModel`] for a delay and the [`TypoModel`]
//!    for an action sequence.
//! 3. **Wait** the delay (a stop request interrupts the wait).
//! 4. **Execute** the actions through the [`KeyInjector`].  Once the first
//!    keystroke of a character is sent, the whole sequence runs to the end,
//!    so a mistake is never left half-corrected by a pause or stop.
//! 5. **Report** progress and a log line through the dispatch function.
//!
//! Injection failures are logged and the rest of that character's actions
//! are skipped; the run carries on with the next character.

use std::sync::Arc;
use std::time::Duration;

use humantype_core::{
    ActionKind, CharPlan, ConfigError, DelayBreakdown, KeyboardLayout, TimingModel, TypoModel,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::config::EngineConfig;
use super::control::{EngineState, RunControl};
use super::events::{AbortReason, Dispatch, EngineEvent};
use super::focus::{FocusHandle, FocusProbe};
use super::injection::{InjectionError, KeyInjector};
use super::stats::{RunStats, StatsAccumulator};

/// Error type for synchronous engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration was rejected at construction.
    #[error("invalid engine configuration: {0}")]
    Config(#[from] ConfigError),

    /// `start` was called while a run is still active.
    #[error("cannot start while the engine is {0:?}; it must be idle")]
    InvalidState(EngineState),

    /// `start` was called outside a tokio runtime.
    #[error("start must be called from within a tokio runtime")]
    NoRuntime,
}

/// How a run ended.  The worker's join handle resolves to this.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(RunStats),
    Aborted(AbortReason),
}

/// Drives one run at a time against a key injector.
pub struct Engine {
    config: EngineConfig,
    layout: Arc<KeyboardLayout>,
    injector: Arc<dyn KeyInjector>,
    focus: Option<Arc<dyn FocusProbe>>,
    dispatch: Dispatch,
    control: Arc<RunControl>,
}

impl Engine {
    /// Validates `config` and builds an idle engine.
    ///
    /// No focus probe is installed; add one with
    /// [`with_focus_probe`](Self::with_focus_probe).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if any part of `config` is invalid.
    pub fn new(
        config: EngineConfig,
        injector: Arc<dyn KeyInjector>,
        dispatch: Dispatch,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            layout: Arc::new(KeyboardLayout::us_qwerty()),
            injector,
            focus: None,
            dispatch,
            control: Arc::new(RunControl::new()),
        })
    }

    /// Installs the probe consulted before every character when
    /// `focus_monitor_enabled` is set.
    pub fn with_focus_probe(mut self, probe: Arc<dyn FocusProbe>) -> Self {
        self.focus = Some(probe);
        self
    }

    pub fn state(&self) -> EngineState {
        self.control.state()
    }

    /// Shared control block, for callers that need to stop the run from a
    /// context that does not own the engine (e.g. a signal handler).
    pub fn control(&self) -> Arc<RunControl> {
        Arc::clone(&self.control)
    }

    /// Starts typing `text` on a new tokio task.
    ///
    /// Must be called from within a tokio runtime.  The returned handle
    /// resolves once the run has reached `Idle` again.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidState`] if a run is already active; the
    /// active run is unaffected.  Returns [`EngineError::NoRuntime`] when
    /// called outside a tokio runtime; the engine stays idle.
    pub fn start(&self, text: &str) -> Result<JoinHandle<RunOutcome>, EngineError> {
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;
        let (timing, typo) = build_planners(&self.config, &self.layout)?;

        self.control
            .try_begin()
            .map_err(EngineError::InvalidState)?;

        let run_id = Uuid::new_v4();
        let worker = Worker {
            chars: text.chars().collect(),
            timing,
            typo,
            layout: Arc::clone(&self.layout),
            injector: Arc::clone(&self.injector),
            focus: if self.config.focus_monitor_enabled {
                self.focus.clone()
            } else {
                None
            },
            dispatch: Arc::clone(&self.dispatch),
            control: Arc::clone(&self.control),
            countdown_seconds: u32::try_from(self.config.countdown_seconds).unwrap_or(0),
            precise_mode: self.config.precise_mode,
            dry_run: self.config.dry_run,
            stats: StatsAccumulator::new(run_id),
        };

        let span = info_span!("run", run_id = %run_id);
        Ok(runtime.spawn(worker.run().instrument(span)))
    }

    /// Pauses at the next checkpoint.  No-op unless the engine is typing.
    pub fn pause(&self) {
        if self.control.pause() {
            debug!("pause requested");
        }
    }

    /// Resumes a paused run.  No-op unless the engine is paused.
    pub fn resume(&self) {
        if self.control.resume() {
            debug!("resume requested");
        }
    }

    /// Stops the active run at its next checkpoint.  No-op while idle.
    pub fn stop(&self) {
        if self.control.request_stop() {
            debug!("stop requested");
        }
    }
}

/// Builds fresh timing and typo planners for one run.
///
/// Both draw from independent generators derived from one root generator,
/// seeded from `config.seed` or from entropy.  With a fixed seed every call
/// returns identical planners, so a preview built from them matches what a
/// run with the same seed types.
///
/// # Errors
///
/// Returns [`ConfigError`] if the timing or typo group is invalid.
pub fn build_planners(
    config: &EngineConfig,
    layout: &Arc<KeyboardLayout>,
) -> Result<(TimingModel, TypoModel), ConfigError> {
    let mut root = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let timing = TimingModel::new(
        config.timing.clone(),
        Arc::clone(layout),
        StdRng::seed_from_u64(root.gen()),
    )?;
    let typo = TypoModel::new(
        config.typo.clone(),
        Arc::clone(layout),
        StdRng::seed_from_u64(root.gen()),
    )?;
    Ok((timing, typo))
}

// ── Worker ────────────────────────────────────────────────────────────────────

/// State owned exclusively by one run's task.
struct Worker {
    chars: Vec<char>,
    timing: TimingModel,
    typo: TypoModel,
    layout: Arc<KeyboardLayout>,
    injector: Arc<dyn KeyInjector>,
    /// `None` when focus checking is disabled or no probe is installed.
    focus: Option<Arc<dyn FocusProbe>>,
    dispatch: Dispatch,
    control: Arc<RunControl>,
    countdown_seconds: u32,
    precise_mode: bool,
    dry_run: bool,
    stats: StatsAccumulator,
}

impl Worker {
    async fn run(mut self) -> RunOutcome {
        info!(
            "run starting: {} characters on the {} layout",
            self.chars.len(),
            self.layout.name()
        );
        self.emit(EngineEvent::StateChanged(EngineState::Countdown));

        if let Err(reason) = self.countdown().await {
            return self.abort(reason);
        }
        if self.control.is_stop_requested()
            || self
                .control
                .transition(EngineState::Countdown, EngineState::Typing)
                .is_err()
        {
            return self.abort(AbortReason::Stopped);
        }
        self.emit(EngineEvent::StateChanged(EngineState::Typing));

        let handle = self.focus.as_ref().map(|probe| probe.capture());
        if let Some(handle) = &handle {
            debug!("focus target captured: {:?}", handle.label());
        }

        // Same per-text reset as `calculate_all`, so a seeded preview lines up.
        self.timing.reset();
        let started = Instant::now();
        let total = self.chars.len();
        let mut index = 0;

        while index < total {
            if let Err(reason) = self.checkpoint(index, handle.as_ref()).await {
                return self.abort(reason);
            }

            let ch = self.chars[index];
            let prev = index.checked_sub(1).map(|p| self.chars[p]);
            let next = self.chars.get(index + 1).copied();

            let (delay_ms, breakdown) = self.timing.calculate_delay(ch, prev, index, total);
            let plan = self.typo.process_char(ch, prev, next);

            if !self.dry_run && !self.control.sleep_or_stop(millis(delay_ms)).await {
                return self.abort(AbortReason::Stopped);
            }
            self.stats.record_delay(delay_ms);

            self.execute(ch, &plan).await;

            let mut consumed = 1;
            if plan.skip_next && index + 1 < total {
                // The swapped character was typed by this plan; its delay is
                // still computed so the statistics and burst state stay aligned.
                let (skipped_ms, _) =
                    self.timing
                        .calculate_delay(self.chars[index + 1], Some(ch), index + 1, total);
                self.stats.record_delay(skipped_ms);
                consumed = 2;
            }
            index += consumed;
            self.stats.record_characters(consumed);

            self.emit(EngineEvent::Progress {
                current: index,
                total,
            });
            let line = describe(started.elapsed(), ch, delay_ms, &breakdown, &plan);
            self.emit(EngineEvent::Log(line));
        }

        self.control.set_state(EngineState::Done);
        self.emit(EngineEvent::StateChanged(EngineState::Done));

        let stats = self.stats.finish(started.elapsed(), self.typo.stats());
        info!(
            "run completed: {} characters, {} typos, {:.0} cpm",
            stats.characters_typed, stats.typo_count, stats.cpm
        );
        self.emit(EngineEvent::Completed(stats.clone()));
        self.control.set_state(EngineState::Idle);
        RunOutcome::Completed(stats)
    }

    async fn countdown(&mut self) -> Result<(), AbortReason> {
        for remaining in (1..=self.countdown_seconds).rev() {
            if self.control.is_stop_requested() {
                return Err(AbortReason::Stopped);
            }
            self.emit(EngineEvent::Countdown {
                seconds_remaining: remaining,
            });
            self.emit(EngineEvent::Log(format!("starting in {remaining}...")));
            if !self.dry_run && !self.control.sleep_or_stop(Duration::from_secs(1)).await {
                return Err(AbortReason::Stopped);
            }
        }
        Ok(())
    }

    /// Pause, stop and focus handling between characters.
    async fn checkpoint(
        &mut self,
        index: usize,
        handle: Option<&FocusHandle>,
    ) -> Result<(), AbortReason> {
        if self.control.state() == EngineState::Paused && !self.control.is_stop_requested() {
            debug!("paused before character {index}");
            self.emit(EngineEvent::StateChanged(EngineState::Paused));
            self.emit(EngineEvent::Log(format!("paused before character {index}")));
            self.control.wait_while_paused().await;
            if self.control.is_stop_requested() {
                return Err(AbortReason::Stopped);
            }
            debug!("resumed at character {index}");
            self.emit(EngineEvent::StateChanged(EngineState::Typing));
            self.emit(EngineEvent::Log(format!("resumed at character {index}")));
        }

        if self.control.is_stop_requested() {
            return Err(AbortReason::Stopped);
        }

        if let (Some(probe), Some(handle)) = (&self.focus, handle) {
            if !probe.check(handle, index) {
                warn!(
                    "focus left {:?} before character {index}; aborting run",
                    handle.label()
                );
                return Err(AbortReason::FocusLost { char_index: index });
            }
        }
        Ok(())
    }

    /// Runs every action of `plan` in order.
    ///
    /// The first injection failure ends the sequence for this character.
    async fn execute(&mut self, ch: char, plan: &CharPlan) {
        for action in &plan.actions {
            let result = match action.kind {
                ActionKind::Pause(ms) => {
                    if !self.dry_run {
                        tokio::time::sleep(Duration::from_millis(ms)).await;
                    }
                    continue;
                }
                ActionKind::Type(c) => self.inject_char(c),
                ActionKind::Backspace => self.inject_backspace(),
            };

            match result {
                Ok(()) => self.stats.record_keystrokes(1),
                Err(e) => {
                    warn!("injection failed while typing {ch:?}: {e}");
                    self.stats.record_injection_failure();
                    self.emit(EngineEvent::Log(format!(
                        "injection failed for {}: {e}; skipping the rest of this character",
                        printable(ch)
                    )));
                    return;
                }
            }
        }
    }

    fn inject_char(&self, c: char) -> Result<(), InjectionError> {
        if self.dry_run {
            return Ok(());
        }
        if self.precise_mode && self.layout.is_shift_required(c).unwrap_or(false) {
            if let Ok(base) = self.layout.base_key(c) {
                return self.injector.type_shifted(base, c);
            }
        }
        self.injector.type_char(c)
    }

    fn inject_backspace(&self) -> Result<(), InjectionError> {
        if self.dry_run {
            return Ok(());
        }
        self.injector.backspace()
    }

    /// Logs why the run ended, reports the terminal abort event and returns
    /// the engine to idle.
    fn abort(&mut self, reason: AbortReason) -> RunOutcome {
        let line = match reason {
            AbortReason::Stopped => "stopped".to_owned(),
            AbortReason::FocusLost { char_index } => {
                format!("focus lost before character {char_index}; aborted")
            }
        };
        info!("run {line}");
        self.emit(EngineEvent::Log(line));
        self.emit(EngineEvent::Aborted(reason));
        self.control.set_state(EngineState::Idle);
        RunOutcome::Aborted(reason)
    }

    fn emit(&self, event: EngineEvent) {
        (self.dispatch)(event);
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn millis(ms: f64) -> Duration {
    Duration::from_secs_f64(ms.max(0.0) / 1000.0)
}

/// Makes whitespace visible in log lines.
fn printable(c: char) -> String {
    match c {
        ' ' => "'␣'".to_owned(),
        '\n' => "'↵'".to_owned(),
        '\t' => "'⇥'".to_owned(),
        _ => format!("'{c}'"),
    }
}

/// Formats the log line for one character: `[elapsed] 'c' label (delay) [breakdown]`.
fn describe(
    elapsed: Duration,
    ch: char,
    delay_ms: f64,
    breakdown: &DelayBreakdown,
    plan: &CharPlan,
) -> String {
    let label = match plan.typo {
        None => "typed".to_owned(),
        Some(event) if event.corrected => format!("{} typo, corrected", event.kind),
        Some(event) => format!("{} typo, left in", event.kind),
    };
    format!(
        "[{:>7.2}s] {} {label} ({delay_ms:.0} ms) {breakdown}",
        elapsed.as_secs_f64(),
        printable(ch)
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use humantype_core::{TimingConfig, TypoConfig, TypoKind, TypoWeights};
    use mockall::predicate::always;
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::application::events::channel_dispatch;
    use crate::application::focus::MockFocusProbe;
    use crate::infrastructure::injection::mock::{Keystroke, RecordingInjector};

    fn quick_config() -> EngineConfig {
        EngineConfig {
            timing: TimingConfig::default(),
            typo: TypoConfig::disabled(),
            countdown_seconds: 0,
            precise_mode: false,
            focus_monitor_enabled: true,
            dry_run: false,
            seed: Some(42),
        }
    }

    fn drain(rx: &mut UnboundedReceiver<EngineEvent>) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Ok(e) = rx.try_recv() {
            events.push(e);
        }
        events
    }

    fn state_changes(events: &[EngineEvent]) -> Vec<EngineState> {
        events
            .iter()
            .filter_map(|e| match e {
                EngineEvent::StateChanged(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    // ── Construction ──────────────────────────────────────────────────────────

    #[test]
    fn test_new_rejects_negative_countdown() {
        let (dispatch, _rx) = channel_dispatch();
        let config = EngineConfig {
            countdown_seconds: -3,
            ..quick_config()
        };
        let result = Engine::new(config, Arc::new(RecordingInjector::new()), dispatch);
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_new_engine_is_idle() {
        let (dispatch, _rx) = channel_dispatch();
        let engine =
            Engine::new(quick_config(), Arc::new(RecordingInjector::new()), dispatch).unwrap();
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn test_start_outside_a_runtime_fails_and_leaves_engine_idle() {
        // Arrange
        let (dispatch, _rx) = channel_dispatch();
        let injector = Arc::new(RecordingInjector::new());
        let engine = Engine::new(quick_config(), injector.clone(), dispatch).unwrap();

        // Act
        let result = engine.start("abc");

        // Assert: the engine is not wedged and a later start succeeds.
        assert!(matches!(result, Err(EngineError::NoRuntime)));
        assert_eq!(engine.state(), EngineState::Idle);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();
        let outcome = runtime.block_on(async { engine.start("abc").unwrap().await.unwrap() });
        assert!(matches!(outcome, RunOutcome::Completed(_)));
        assert_eq!(injector.typed_text(), "abc");
    }

    // ── Focus probe ───────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_focus_is_captured_once_and_checked_before_each_character() {
        // Arrange
        let mut probe = MockFocusProbe::new();
        probe
            .expect_capture()
            .times(1)
            .returning(|| FocusHandle::new("editor"));
        probe
            .expect_check()
            .with(always(), always())
            .times(3)
            .returning(|handle, _| handle.label() == "editor");
        let (dispatch, _rx) = channel_dispatch();
        let injector = Arc::new(RecordingInjector::new());
        let engine = Engine::new(quick_config(), injector.clone(), dispatch)
            .unwrap()
            .with_focus_probe(Arc::new(probe));

        // Act
        let outcome = engine.start("abc").unwrap().await.unwrap();

        // Assert
        assert!(matches!(outcome, RunOutcome::Completed(_)));
        assert_eq!(injector.typed_text(), "abc");
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_focus_monitor_never_queries_probe() {
        let mut probe = MockFocusProbe::new();
        probe.expect_capture().times(0);
        probe.expect_check().times(0);
        let (dispatch, _rx) = channel_dispatch();
        let config = EngineConfig {
            focus_monitor_enabled: false,
            ..quick_config()
        };
        let engine = Engine::new(config, Arc::new(RecordingInjector::new()), dispatch)
            .unwrap()
            .with_focus_probe(Arc::new(probe));

        let outcome = engine.start("xyz").unwrap().await.unwrap();

        assert!(matches!(outcome, RunOutcome::Completed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_loss_at_first_character_types_nothing() {
        let mut probe = MockFocusProbe::new();
        probe
            .expect_capture()
            .returning(|| FocusHandle::new("editor"));
        probe.expect_check().returning(|_, _| false);
        let (dispatch, mut rx) = channel_dispatch();
        let injector = Arc::new(RecordingInjector::new());
        let engine = Engine::new(quick_config(), injector.clone(), dispatch)
            .unwrap()
            .with_focus_probe(Arc::new(probe));

        let outcome = engine.start("abc").unwrap().await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Aborted(AbortReason::FocusLost { char_index: 0 })
        );
        assert!(injector.keystrokes().is_empty());
        let events = drain(&mut rx);
        assert!(events
            .iter()
            .all(|e| !matches!(e, EngineEvent::Progress { .. })));
        assert_eq!(
            &events[events.len() - 2..],
            &[
                EngineEvent::Log("focus lost before character 0; aborted".to_owned()),
                EngineEvent::Aborted(AbortReason::FocusLost { char_index: 0 }),
            ]
        );
    }

    // ── Injection ─────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_precise_mode_injects_shifted_characters_explicitly() {
        let (dispatch, _rx) = channel_dispatch();
        let injector = Arc::new(RecordingInjector::new());
        let config = EngineConfig {
            precise_mode: true,
            ..quick_config()
        };
        let engine = Engine::new(config, injector.clone(), dispatch).unwrap();

        engine.start("Hi!").unwrap().await.unwrap();

        assert_eq!(
            injector.keystrokes(),
            vec![
                Keystroke::Shifted { base: 'h', ch: 'H' },
                Keystroke::Char('i'),
                Keystroke::Shifted { base: '1', ch: '!' },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_injection_failure_is_logged_and_run_continues() {
        // Arrange
        let (dispatch, mut rx) = channel_dispatch();
        let injector = Arc::new(RecordingInjector::failing_on('b'));
        let engine = Engine::new(quick_config(), injector.clone(), dispatch).unwrap();

        // Act
        let outcome = engine.start("abc").unwrap().await.unwrap();

        // Assert
        let RunOutcome::Completed(stats) = outcome else {
            panic!("injection failures must not abort the run");
        };
        assert_eq!(stats.injection_failures, 1);
        assert_eq!(stats.characters_typed, 3);
        assert_eq!(injector.typed_text(), "ac");
        assert!(drain(&mut rx).iter().any(
            |e| matches!(e, EngineEvent::Log(line) if line.contains("injection failed for 'b'"))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_skips_the_rest_of_a_correction_sequence() {
        // Every character becomes a corrected doubling: type, type, pause, backspace, pause.
        let config = EngineConfig {
            typo: TypoConfig {
                typo_rate: 1.0,
                weights: TypoWeights::only(TypoKind::Doubling),
                correction_rate: 1.0,
                always_correct: true,
            },
            ..quick_config()
        };
        let (dispatch, _rx) = channel_dispatch();
        let injector = Arc::new(RecordingInjector {
            fail_backspace: true,
            ..RecordingInjector::default()
        });
        let engine = Engine::new(config, injector.clone(), dispatch).unwrap();

        let outcome = engine.start("ab").unwrap().await.unwrap();

        let RunOutcome::Completed(stats) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(stats.injection_failures, 2);
        assert_eq!(injector.typed_text(), "aabb");
    }

    // ── Dry run ───────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_dry_run_injects_nothing_and_never_waits() {
        let (dispatch, mut rx) = channel_dispatch();
        let injector = Arc::new(RecordingInjector::new());
        let config = EngineConfig {
            dry_run: true,
            countdown_seconds: 3,
            ..quick_config()
        };
        let engine = Engine::new(config, injector.clone(), dispatch).unwrap();
        let before = Instant::now();

        let outcome = engine.start("hello world").unwrap().await.unwrap();

        assert_eq!(before.elapsed(), Duration::ZERO);
        assert!(injector.keystrokes().is_empty());
        let RunOutcome::Completed(stats) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(stats.characters_typed, 11);
        let ticks = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, EngineEvent::Countdown { .. }))
            .count();
        assert_eq!(ticks, 3);
    }

    // ── Pause / resume ────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_pause_parks_between_characters_until_resumed() {
        // Arrange
        let (dispatch, mut rx) = channel_dispatch();
        let injector = Arc::new(RecordingInjector::new());
        let engine = Engine::new(quick_config(), injector.clone(), dispatch).unwrap();
        let handle = engine.start("abcdefghij").unwrap();

        // Act: let a few characters through, then pause.
        tokio::time::sleep(Duration::from_millis(250)).await;
        engine.pause();
        assert_eq!(engine.state(), EngineState::Paused);
        tokio::time::sleep(Duration::from_secs(2)).await;
        let typed_while_paused = injector.keystrokes().len();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(injector.keystrokes().len(), typed_while_paused);

        engine.resume();
        let outcome = handle.await.unwrap();

        // Assert
        assert!(matches!(outcome, RunOutcome::Completed(_)));
        assert_eq!(injector.typed_text(), "abcdefghij");
        let events = drain(&mut rx);
        let paused_at = events
            .iter()
            .position(|e| matches!(e, EngineEvent::Log(l) if l.starts_with("paused before character")))
            .expect("a pause log line");
        let resumed_at = events
            .iter()
            .position(|e| matches!(e, EngineEvent::Log(l) if l.starts_with("resumed at character")))
            .expect("a resume log line");
        assert!(paused_at < resumed_at);
        assert_eq!(
            state_changes(&events),
            vec![
                EngineState::Countdown,
                EngineState::Typing,
                EngineState::Paused,
                EngineState::Typing,
                EngineState::Done,
            ]
        );
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_while_paused_returns_to_idle() {
        let (dispatch, mut rx) = channel_dispatch();
        let engine =
            Engine::new(quick_config(), Arc::new(RecordingInjector::new()), dispatch).unwrap();
        let handle = engine.start("a long line of text").unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        engine.pause();
        tokio::time::sleep(Duration::from_secs(1)).await;
        engine.stop();

        assert_eq!(
            handle.await.unwrap(),
            RunOutcome::Aborted(AbortReason::Stopped)
        );
        assert_eq!(engine.state(), EngineState::Idle);
        let events = drain(&mut rx);
        assert_eq!(
            &events[events.len() - 2..],
            &[
                EngineEvent::Log("stopped".to_owned()),
                EngineEvent::Aborted(AbortReason::Stopped),
            ]
        );
    }

    // ── Transposition ─────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_transposition_advances_progress_by_two() {
        let config = EngineConfig {
            typo: TypoConfig {
                typo_rate: 1.0,
                weights: TypoWeights::only(TypoKind::Transposition),
                correction_rate: 1.0,
                always_correct: true,
            },
            ..quick_config()
        };
        let (dispatch, mut rx) = channel_dispatch();
        let injector = Arc::new(RecordingInjector::new());
        let engine = Engine::new(config, injector.clone(), dispatch).unwrap();

        engine.start("abcd").unwrap().await.unwrap();

        let progress: Vec<usize> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                EngineEvent::Progress { current, .. } => Some(current),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![2, 4]);
        assert_eq!(injector.typed_text(), "abcd");
    }

    // ── Log lines ─────────────────────────────────────────────────────────────

    #[test]
    fn test_describe_formats_character_delay_and_breakdown() {
        let plan = CharPlan {
            actions: vec![],
            skip_next: false,
            typo: None,
        };
        let line = describe(
            Duration::from_millis(1500),
            ' ',
            63.4,
            &DelayBreakdown::default(),
            &plan,
        );
        assert_eq!(line, "[   1.50s] '␣' typed (63 ms) []");
    }
}
