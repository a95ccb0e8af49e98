//! Event-emitting engine around the session timer.
//!
//! This module adapts the core state machine for an event-driven host:
//! - `SessionEngine` forwards user intents into the timer and emits
//!   [`SessionEvent`]s for the presentation layer
//! - `TickSource` is the owned, cancelable ~1 Hz pulse generator the host
//!   holds only while the timer is running

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::session::{SessionSnapshot, SessionTimer};

// ============================================================================
// Constants
// ============================================================================

/// Nominal cadence of the countdown.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

// ============================================================================
// SessionEvent
// ============================================================================

/// Timer events for display and external integrations.
///
/// Intent events are only emitted when the underlying state actually
/// changed, so an idempotent repeat (`start` while running, `pause` while
/// paused, `reset` on an idle full countdown, reconfiguring the current
/// duration) is silent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Countdown started or resumed
    Started,
    /// Countdown paused
    Paused,
    /// Countdown reset to the configured duration
    Reset,
    /// Session length reconfigured
    DurationConfigured {
        /// New session length in seconds
        duration_seconds: u32,
    },
    /// One second elapsed
    Tick {
        /// Remaining seconds after the decrement
        remaining_seconds: u32,
    },
    /// A running countdown reached zero (fires at most once per session)
    Completed {
        /// Length of the completed session in seconds
        duration_seconds: u32,
    },
}

// ============================================================================
// EngineError
// ============================================================================

/// Engine-specific error types.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The event receiver was dropped while the engine was still emitting.
    #[error("event channel closed")]
    EventChannelClosed,
}

// ============================================================================
// SessionEngine
// ============================================================================

/// Owns the session timer and emits events on every effective transition.
pub struct SessionEngine {
    /// The timer state machine
    timer: SessionTimer,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionEngine {
    /// Creates an engine around a fresh timer.
    pub fn new(event_tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            timer: SessionTimer::new(),
            event_tx,
        }
    }

    /// Configures the session length from raw text input.
    ///
    /// Always lands on a clamped value; emits
    /// [`SessionEvent::DurationConfigured`] when the duration or the
    /// remaining time actually changed.
    pub fn configure_duration(&mut self, input: &str) -> Result<(), EngineError> {
        let before = self.config_state();
        let clamped = self.timer.configure_duration(input);
        if self.config_state() != before {
            tracing::debug!(minutes = clamped, "session length configured");
            self.emit(SessionEvent::DurationConfigured {
                duration_seconds: self.timer.configured_duration_seconds(),
            })?;
        }
        Ok(())
    }

    /// Configures the session length from a minute count.
    pub fn configure_duration_minutes(&mut self, minutes: u32) -> Result<(), EngineError> {
        let before = self.config_state();
        let clamped = self.timer.configure_duration_minutes(minutes);
        if self.config_state() != before {
            tracing::debug!(minutes = clamped, "session length configured");
            self.emit(SessionEvent::DurationConfigured {
                duration_seconds: self.timer.configured_duration_seconds(),
            })?;
        }
        Ok(())
    }

    /// Starts (or resumes) the countdown. Idempotent.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.timer.start() {
            tracing::debug!("countdown started");
            self.emit(SessionEvent::Started)?;
        }
        Ok(())
    }

    /// Pauses the countdown. Idempotent.
    pub fn pause(&mut self) -> Result<(), EngineError> {
        if self.timer.pause() {
            tracing::debug!("countdown paused");
            self.emit(SessionEvent::Paused)?;
        }
        Ok(())
    }

    /// Stops the countdown and re-syncs it to the configured duration.
    /// Idempotent on an idle timer already at its full duration.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        if self.timer.reset() {
            tracing::debug!("countdown reset");
            self.emit(SessionEvent::Reset)?;
        }
        Ok(())
    }

    /// Advances the countdown by one second.
    ///
    /// Emits [`SessionEvent::Tick`] for an effective decrement, followed by
    /// [`SessionEvent::Completed`] on the transition to zero. A tick in a
    /// non-running or finished state emits nothing.
    pub fn tick(&mut self) -> Result<(), EngineError> {
        let before = self.timer.remaining_seconds();
        let completed = self.timer.tick();

        if self.timer.remaining_seconds() != before {
            self.emit(SessionEvent::Tick {
                remaining_seconds: self.timer.remaining_seconds(),
            })?;
        }

        if let Some(done) = completed {
            tracing::debug!(
                duration_seconds = done.duration_seconds,
                "session completed"
            );
            self.emit(SessionEvent::Completed {
                duration_seconds: done.duration_seconds,
            })?;
        }

        Ok(())
    }

    /// Returns a reference to the current timer state.
    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    /// Builds the render snapshot for the presentation layer.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.timer.snapshot()
    }

    /// The pair a configure call can affect, for change detection.
    fn config_state(&self) -> (u32, u32) {
        (
            self.timer.configured_duration_seconds(),
            self.timer.remaining_seconds(),
        )
    }

    fn emit(&self, event: SessionEvent) -> Result<(), EngineError> {
        self.event_tx
            .send(event)
            .map_err(|_| EngineError::EventChannelClosed)
    }
}

// ============================================================================
// TickSource
// ============================================================================

/// The owned periodic pulse generator driving `tick()`.
///
/// The host acquires one on entering the running state and drops it on every
/// exit path out of it (pause, reset, completion, shutdown). Dropping aborts
/// the task, so a canceled source stops sending immediately and two sources
/// can never decrement the same countdown.
#[derive(Debug)]
pub struct TickSource {
    /// Handle to the spawned pulse task
    handle: JoinHandle<()>,
}

impl TickSource {
    /// Spawns a task that sends one pulse on `pulse_tx` per `period`.
    ///
    /// The first pulse lands one full period after the spawn, matching a
    /// countdown that starts from the configured value rather than skipping
    /// a second immediately.
    pub fn spawn(period: Duration, pulse_tx: mpsc::UnboundedSender<()>) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // interval() fires immediately on the first tick; swallow it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if pulse_tx.send(()).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    /// Cancels the pulse task immediately.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for TickSource {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ============================================================================
// Tests
// ============================================================================
