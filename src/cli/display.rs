//! Display utilities for the study timer CLI.
//!
//! This module provides formatted output for:
//! - Countdown snapshots (text or JSON lines)
//! - The one-shot completion alert
//! - Statistics and status blocks
//! - Interactive help and error messages

use crate::session::SessionSnapshot;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the countdown line for the current state.
    pub fn show_snapshot(snapshot: &SessionSnapshot) {
        if snapshot.finished {
            println!("{}  [done] session complete", snapshot.formatted_remaining);
        } else if snapshot.in_final_minute {
            println!("{}  [!] final minute", snapshot.formatted_remaining);
        } else {
            println!("{}", snapshot.formatted_remaining);
        }
    }

    /// Shows the snapshot as a single JSON line.
    pub fn show_snapshot_json(snapshot: &SessionSnapshot) {
        match serde_json::to_string(snapshot) {
            Ok(line) => println!("{}", line),
            Err(e) => Self::show_error(&e.to_string()),
        }
    }

    /// Shows the one-shot completion alert.
    ///
    /// The caller guarantees this is invoked exactly once per completion.
    pub fn show_completed(duration_seconds: u32) {
        println!();
        println!(
            "* Session complete! You studied for {} minutes.",
            duration_seconds / 60
        );
    }

    /// Shows the lifetime statistics block.
    pub fn show_statistics(snapshot: &SessionSnapshot) {
        println!("  Sessions completed: {}", snapshot.completed_sessions);
        println!("  Total studied:      {}", snapshot.formatted_total_studied);
    }

    /// Shows the full status: state, countdown, and statistics.
    pub fn show_status(snapshot: &SessionSnapshot) {
        let state = if snapshot.running {
            "running"
        } else if snapshot.finished {
            "finished"
        } else {
            "paused"
        };

        println!("Study Timer Status");
        println!("------------------");
        println!("  State:     {}", state);
        println!("  Remaining: {}", snapshot.formatted_remaining);
        println!(
            "  Session:   {} min",
            snapshot.configured_duration_seconds / 60
        );
        Self::show_statistics(snapshot);
    }

    /// Shows the interactive command help.
    pub fn show_help() {
        println!("Commands:");
        println!("  s, start          start or resume the countdown");
        println!("  p, pause          pause the countdown");
        println!("  r, reset          reset to the configured session length");
        println!("  d, duration <m>   set the session length in minutes (1-120)");
        println!("  status            show the countdown and statistics");
        println!("  h, help           show this help");
        println!("  q, quit           exit");
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("error: {}", message);
    }
}

// ============================================================================
// Tests
// ============================================================================
