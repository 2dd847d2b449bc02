//! Events reported by the engine and the dispatch function that carries them.
//!
//! The engine calls the caller-supplied [`Dispatch`] synchronously from its
//! worker task, one event at a time, in the order the events happen.  What
//! the dispatch function does with an event (forward it to a UI thread, push
//! it into a channel, print it) is up to the caller.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::control::EngineState;
use super::stats::RunStats;

/// Why a run ended before consuming all of its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// `stop()` was called.
    Stopped,
    /// The focus probe reported that the target lost focus before the
    /// character at `char_index` was typed.
    FocusLost { char_index: usize },
}

/// One observable step of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A countdown tick, emitted once per second before typing starts.
    Countdown { seconds_remaining: u32 },
    StateChanged(EngineState),
    /// Human-readable description of what just happened.
    Log(String),
    /// `current` of `total` source characters have been consumed.
    Progress { current: usize, total: usize },
    /// Terminal event of a run that typed its whole text.
    Completed(RunStats),
    /// Terminal event of a run that ended early.
    Aborted(AbortReason),
}

impl EngineEvent {
    /// Returns `true` for [`Completed`](Self::Completed) and [`Aborted`](Self::Aborted).
    pub fn is_terminal(&self) -> bool {
        matches!(self, EngineEvent::Completed(_) | EngineEvent::Aborted(_))
    }
}

/// Caller-supplied event sink.
pub type Dispatch = Arc<dyn Fn(EngineEvent) + Send + Sync>;

/// Builds a [`Dispatch`] that forwards every event into an unbounded channel.
///
/// Sending never blocks the worker.  Events sent after the receiver is
/// dropped are discarded.
pub fn channel_dispatch() -> (Dispatch, mpsc::UnboundedReceiver<EngineEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let dispatch: Dispatch = Arc::new(move |event| {
        let _ = tx.send(event);
    });
    (dispatch, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_dispatch_preserves_order() {
        let (dispatch, mut rx) = channel_dispatch();
        dispatch(EngineEvent::StateChanged(EngineState::Countdown));
        dispatch(EngineEvent::Progress {
            current: 1,
            total: 1,
        });
        drop(dispatch);

        assert_eq!(
            rx.recv().await,
            Some(EngineEvent::StateChanged(EngineState::Countdown))
        );
        assert_eq!(
            rx.recv().await,
            Some(EngineEvent::Progress {
                current: 1,
                total: 1
            })
        );
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_dispatch_after_receiver_dropped_is_silent() {
        let (dispatch, rx) = channel_dispatch();
        drop(rx);
        dispatch(EngineEvent::Log("ignored".into()));
    }

    #[test]
    fn test_terminal_events() {
        assert!(EngineEvent::Aborted(AbortReason::Stopped).is_terminal());
        assert!(!EngineEvent::Log(String::new()).is_terminal());
    }
}
