//! Study Timer Library
//!
//! This library provides the core functionality for the study timer CLI.
//! It includes:
//! - Session timer state machine with cumulative statistics
//! - Event-emitting engine and cancelable tick source
//! - CLI command parsing and display utilities
//! - Interactive host loop driving the countdown

pub mod app;
pub mod cli;
pub mod engine;
pub mod session;

// Re-export commonly used types for convenience
pub use app::{App, Command};
pub use cli::{Cli, Commands, Display, RunArgs};
pub use engine::{EngineError, SessionEngine, SessionEvent, TickSource, TICK_PERIOD};
pub use session::{SessionCompleted, SessionSnapshot, SessionTimer};
