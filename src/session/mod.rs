//! Session timer state machine for the study timer.
//!
//! This module owns all timer and statistics state:
//! - Configurable countdown duration (1-120 minutes)
//! - Start/pause/reset intents and the one-second tick advance
//! - Exactly-once completion detection feeding cumulative statistics
//! - Render snapshot and display formatting for the presentation layer

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Minimum configurable session length in minutes.
pub const MIN_MINUTES: u32 = 1;

/// Maximum configurable session length in minutes.
pub const MAX_MINUTES: u32 = 120;

/// Default session length in minutes.
pub const DEFAULT_MINUTES: u32 = 25;

// ============================================================================
// SessionCompleted
// ============================================================================

/// One-shot completion notification.
///
/// Produced by [`SessionTimer::tick`] on the transition from one remaining
/// second to zero while running, and never again for the same countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCompleted {
    /// Length of the completed session in seconds
    pub duration_seconds: u32,
}

// ============================================================================
// SessionTimer
// ============================================================================

/// The session timer state machine.
///
/// Three logical states:
/// - Idle/Paused: `running == false`, `remaining_seconds > 0`
/// - Running: `running == true`, `remaining_seconds > 0`
/// - Finished: `running == false`, `remaining_seconds == 0`
///
/// The machine is cyclic: a finished timer is reset and started again.
/// All operations are total; invalid input is clamped or ignored, never
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimer {
    /// Configured session length in seconds (60-7200)
    configured_duration_seconds: u32,
    /// Seconds left in the current countdown
    remaining_seconds: u32,
    /// True while the countdown is actively decrementing
    running: bool,
    /// Lifetime count of completed sessions
    completed_sessions: u32,
    /// Lifetime studied time in seconds, summed over completed sessions
    total_studied_seconds: u64,
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTimer {
    /// Creates a timer in the idle state with the default 25 minute session.
    pub fn new() -> Self {
        Self {
            configured_duration_seconds: DEFAULT_MINUTES * 60,
            remaining_seconds: DEFAULT_MINUTES * 60,
            running: false,
            completed_sessions: 0,
            total_studied_seconds: 0,
        }
    }

    /// Returns the configured session length in seconds.
    pub fn configured_duration_seconds(&self) -> u32 {
        self.configured_duration_seconds
    }

    /// Returns the seconds left in the current countdown.
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Returns true while the countdown is actively decrementing.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns the lifetime count of completed sessions.
    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    /// Returns the lifetime studied time in seconds.
    pub fn total_studied_seconds(&self) -> u64 {
        self.total_studied_seconds
    }

    /// Configures the session length from raw text input.
    ///
    /// The leading run of digits is parsed as minutes; empty or non-numeric
    /// input counts as 0. The value is then clamped to 1-120 minutes, so the
    /// call always lands on a valid duration. Returns the clamped minutes.
    ///
    /// While running, the new duration is stored but the in-flight countdown
    /// is left untouched; the resync of `remaining_seconds` only happens
    /// while paused. The presentation layer is expected to disable the input
    /// during a run, but the state machine tolerates the call either way.
    pub fn configure_duration(&mut self, input: &str) -> u32 {
        self.configure_duration_minutes(parse_minutes(input))
    }

    /// Configures the session length from a minute count, with the same
    /// clamp and resync rules as [`configure_duration`].
    ///
    /// [`configure_duration`]: SessionTimer::configure_duration
    pub fn configure_duration_minutes(&mut self, minutes: u32) -> u32 {
        let clamped = minutes.clamp(MIN_MINUTES, MAX_MINUTES);
        self.configured_duration_seconds = clamped * 60;
        if !self.running {
            self.remaining_seconds = self.configured_duration_seconds;
        }
        clamped
    }

    /// Starts (or resumes) the countdown.
    ///
    /// Returns true if the call changed state, false on the idempotent
    /// repeat. Starting with zero remaining is allowed but inert: ticks
    /// cannot decrement past zero and completion cannot re-fire. Callers
    /// wanting a restart must reset first.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Pauses the countdown, leaving remaining time and statistics untouched.
    ///
    /// Returns true if the call changed state, false on the idempotent
    /// repeat.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Stops the countdown and re-syncs the remaining time to the configured
    /// duration.
    ///
    /// Returns true if the call changed state; resetting an idle timer that
    /// is already at its full duration is a no-op. Cumulative statistics are
    /// untouched: progress discarded by a reset earns neither credit nor
    /// penalty, even when the reset lands on a finished timer.
    pub fn reset(&mut self) -> bool {
        if !self.running && self.remaining_seconds == self.configured_duration_seconds {
            return false;
        }
        self.running = false;
        self.remaining_seconds = self.configured_duration_seconds;
        true
    }

    /// Advances the countdown by one second.
    ///
    /// Only effective while running with time remaining; in any other state
    /// the call is a safety no-op (the driver is expected not to schedule
    /// ticks there). On the transition to zero the completion side effects
    /// are applied as a single state update and the one-shot
    /// [`SessionCompleted`] value is returned.
    pub fn tick(&mut self) -> Option<SessionCompleted> {
        if !self.running || self.remaining_seconds == 0 {
            return None;
        }
        self.remaining_seconds -= 1;
        if self.remaining_seconds > 0 {
            return None;
        }
        self.running = false;
        self.completed_sessions += 1;
        self.total_studied_seconds += u64::from(self.configured_duration_seconds);
        Some(SessionCompleted {
            duration_seconds: self.configured_duration_seconds,
        })
    }

    /// Returns true when less than a minute (but more than nothing) remains.
    pub fn is_in_final_minute(&self) -> bool {
        self.remaining_seconds > 0 && self.remaining_seconds < 60
    }

    /// Returns true when the countdown has reached zero.
    pub fn is_finished(&self) -> bool {
        self.remaining_seconds == 0
    }

    /// Formats the remaining time as `MM:SS`.
    pub fn format_remaining(&self) -> String {
        format_clock(self.remaining_seconds)
    }

    /// Formats the lifetime studied time as `"{h}h {m}min"` or `"{m}min"`.
    pub fn format_total_studied(&self) -> String {
        format_study_total(self.total_studied_seconds)
    }

    /// Builds the render snapshot for the presentation layer.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from_timer(self)
    }
}

// ============================================================================
// SessionSnapshot
// ============================================================================

/// Render snapshot consumed by the presentation layer.
///
/// A pure projection of the timer fields plus the derived display state, so
/// the host renders without recomputing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Configured session length in seconds
    pub configured_duration_seconds: u32,
    /// Seconds left in the current countdown
    pub remaining_seconds: u32,
    /// Whether the countdown is actively decrementing
    pub running: bool,
    /// Lifetime count of completed sessions
    pub completed_sessions: u32,
    /// Lifetime studied time in seconds
    pub total_studied_seconds: u64,
    /// Remaining time as `MM:SS`
    pub formatted_remaining: String,
    /// Lifetime studied time as `"{h}h {m}min"` or `"{m}min"`
    pub formatted_total_studied: String,
    /// True when less than a minute remains
    pub in_final_minute: bool,
    /// True when the countdown has reached zero
    pub finished: bool,
}

impl SessionSnapshot {
    /// Creates a snapshot from the current timer state.
    pub fn from_timer(timer: &SessionTimer) -> Self {
        Self {
            configured_duration_seconds: timer.configured_duration_seconds(),
            remaining_seconds: timer.remaining_seconds(),
            running: timer.is_running(),
            completed_sessions: timer.completed_sessions(),
            total_studied_seconds: timer.total_studied_seconds(),
            formatted_remaining: timer.format_remaining(),
            formatted_total_studied: timer.format_total_studied(),
            in_final_minute: timer.is_in_final_minute(),
            finished: timer.is_finished(),
        }
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Formats a second count as `MM:SS`, both fields zero-padded to two digits.
pub fn format_clock(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Formats a studied-time total as `"{h}h {m}min"`, or `"{m}min"` while the
/// total is under an hour.
pub fn format_study_total(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    if hours > 0 {
        format!("{}h {}min", hours, minutes)
    } else {
        format!("{}min", minutes)
    }
}

/// Parses a minute count from raw text the way a numeric input field would:
/// surrounding whitespace is ignored and the leading run of digits is taken.
/// Anything without digits counts as 0 (which the duration clamp raises to
/// 1); a digit run too large for u64 saturates, so it still clamps high.
fn parse_minutes(input: &str) -> u32 {
    let digits: String = input
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits
        .parse::<u64>()
        .unwrap_or(u64::MAX)
        .min(u64::from(MAX_MINUTES)) as u32
}

// ============================================================================
// Tests
// ============================================================================
