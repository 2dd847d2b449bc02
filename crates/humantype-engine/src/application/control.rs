//! Run control shared between the engine's worker and its callers.
//!
//! # How control works (for beginners)
//!
//! A run executes on its own tokio task.  The caller keeps an
//! `Arc<RunControl>` and flips its state from any thread:
//!
//! - `pause()` moves `Typing → Paused`, `resume()` moves `Paused → Typing`.
//!   Both are compare-and-swap operations, so calling them in any other state
//!   does nothing.
//! - `request_stop()` sets a sticky stop bit in the same atomic as the state.
//!   A new run begins from a plain `Idle` value, and the bit stays set until
//!   the worker stores its next state.
//!
//! None of these calls block.  The worker looks at the state only at its
//! checkpoints (between characters, between countdown ticks, during delay
//! waits) and reacts there.  A [`Notify`] wakes the worker when it is parked
//! in a pause or a delay wait.
//!
//! # Why `notify_one`?
//!
//! `Notify::notify_one` stores a permit when nobody is waiting, so a resume
//! or stop that lands between the worker's "am I paused?" check and its
//! `.await` is never lost.  Every waiter re-checks the state after waking, so
//! a stale permit is harmless.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    Idle,
    Countdown,
    Typing,
    Paused,
    Done,
}

impl EngineState {
    fn as_u8(self) -> u8 {
        match self {
            EngineState::Idle => 0,
            EngineState::Countdown => 1,
            EngineState::Typing => 2,
            EngineState::Paused => 3,
            EngineState::Done => 4,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value & !STOP_BIT {
            1 => EngineState::Countdown,
            2 => EngineState::Typing,
            3 => EngineState::Paused,
            4 => EngineState::Done,
            _ => EngineState::Idle,
        }
    }
}

/// High bit of the state byte: a stop has been requested for the active run.
const STOP_BIT: u8 = 0x80;

/// Atomic state and stop request for one engine.
#[derive(Debug)]
pub struct RunControl {
    /// `EngineState` in the low bits, [`STOP_BIT`] on top.
    state: AtomicU8,
    wake: Notify,
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RunControl {
    /// Creates a control block in [`EngineState::Idle`].
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(EngineState::Idle.as_u8()),
            wake: Notify::new(),
        }
    }

    pub fn state(&self) -> EngineState {
        EngineState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Claims the engine for a new run: `Idle → Countdown`.
    ///
    /// # Errors
    ///
    /// Returns the current state if it is not `Idle`.
    pub fn try_begin(&self) -> Result<(), EngineState> {
        self.transition(EngineState::Idle, EngineState::Countdown)
    }

    /// `Typing → Paused`.  Returns `false` (and changes nothing) in any other state.
    pub fn pause(&self) -> bool {
        self.transition(EngineState::Typing, EngineState::Paused).is_ok()
    }

    /// `Paused → Typing`.  Returns `false` (and changes nothing) in any other state.
    pub fn resume(&self) -> bool {
        let resumed = self
            .transition(EngineState::Paused, EngineState::Typing)
            .is_ok();
        if resumed {
            self.wake.notify_one();
        }
        resumed
    }

    /// Asks the active run to stop at its next checkpoint.
    ///
    /// Returns `false` when there is no active run.
    pub fn request_stop(&self) -> bool {
        let raised = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |value| {
                (EngineState::from_u8(value) != EngineState::Idle).then_some(value | STOP_BIT)
            })
            .is_ok();
        if raised {
            self.wake.notify_one();
        }
        raised
    }

    pub fn is_stop_requested(&self) -> bool {
        self.state.load(Ordering::Acquire) & STOP_BIT != 0
    }

    /// Unconditionally sets the state, dropping any stop request.  Only the
    /// worker calls this.
    pub(crate) fn set_state(&self, state: EngineState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    /// Compare-and-swap `from → to`; on failure returns the actual state.
    ///
    /// Fails while a stop is pending, since the stored value then carries
    /// [`STOP_BIT`].
    pub(crate) fn transition(&self, from: EngineState, to: EngineState) -> Result<(), EngineState> {
        self.state
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(EngineState::from_u8)
    }

    /// Parks until the state leaves `Paused` or a stop is requested.
    pub async fn wait_while_paused(&self) {
        loop {
            let notified = self.wake.notified();
            if self.state() != EngineState::Paused || self.is_stop_requested() {
                return;
            }
            notified.await;
        }
    }

    /// Sleeps for `duration` unless a stop is requested first.
    ///
    /// Returns `true` if the full duration elapsed, `false` if interrupted.
    pub async fn sleep_or_stop(&self, duration: Duration) -> bool {
        if self.is_stop_requested() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => !self.is_stop_requested(),
            _ = self.wait_for_stop() => false,
        }
    }

    async fn wait_for_stop(&self) {
        loop {
            let notified = self.wake.notified();
            if self.is_stop_requested() {
                return;
            }
            notified.await;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
