//! Interactive host loop for the study timer.
//!
//! The loop is the single owner of the timer state: every user intent and
//! every tick pulse is applied on this task, so the at-most-once completion
//! invariant needs no locking. The tick source is an owned resource,
//! acquired on entering the running state and dropped on every path out of
//! it, including quit, stdin EOF and ctrl-c.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::cli::{Display, RunArgs};
use crate::engine::{EngineError, SessionEngine, SessionEvent, TickSource, TICK_PERIOD};

// ============================================================================
// Command
// ============================================================================

/// A user intent entered on the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Reset to the configured session length
    Reset,
    /// Reconfigure the session length from raw text
    Duration(String),
    /// Show the countdown and statistics
    Status,
    /// Show the command help
    Help,
    /// Exit the session
    Quit,
    /// Anything unrecognized
    Unknown,
}

impl Command {
    /// Parses one input line into a command.
    ///
    /// The first word selects the command; for `duration` the rest of the
    /// line is carried verbatim so the timer's own input sanitizing applies.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let (head, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (trimmed, ""),
        };

        match head.to_ascii_lowercase().as_str() {
            "start" | "s" => Command::Start,
            "pause" | "p" => Command::Pause,
            "reset" | "r" => Command::Reset,
            "duration" | "d" => Command::Duration(rest.to_string()),
            "status" => Command::Status,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            _ => Command::Unknown,
        }
    }
}

// ============================================================================
// App
// ============================================================================

/// One loop iteration's input.
enum LoopInput {
    /// A pulse from the active tick source
    Pulse,
    /// A line read from stdin (None on EOF)
    Line(Option<String>),
    /// Ctrl-c
    Shutdown,
}

/// Interactive session host.
pub struct App {
    /// Event-emitting engine around the timer
    engine: SessionEngine,
    /// Event receiver drained after every operation
    event_rx: mpsc::UnboundedReceiver<SessionEvent>,
    /// Sender handed to each spawned tick source
    tick_tx: mpsc::UnboundedSender<()>,
    /// The single tick source, held only while running
    ticker: Option<TickSource>,
    /// Render snapshots as JSON lines
    json: bool,
}

impl App {
    /// Creates the host and the pulse receiver its loop consumes.
    fn new(args: &RunArgs) -> Result<(Self, mpsc::UnboundedReceiver<()>), EngineError> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();

        let mut engine = SessionEngine::new(event_tx);
        engine.configure_duration_minutes(args.minutes)?;

        let app = Self {
            engine,
            event_rx,
            tick_tx,
            ticker: None,
            json: args.json,
        };
        Ok((app, tick_rx))
    }

    /// Runs an interactive session until quit, stdin EOF or ctrl-c.
    pub async fn run(args: &RunArgs) -> Result<()> {
        let (mut app, mut tick_rx) = App::new(args)?;
        app.run_loop(&mut tick_rx).await
    }

    async fn run_loop(&mut self, tick_rx: &mut mpsc::UnboundedReceiver<()>) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        Display::show_help();
        // Construction may have queued a configuration event; discard it so
        // the first snapshot renders exactly once.
        while self.event_rx.try_recv().is_ok() {}
        self.render_snapshot();

        loop {
            let input = tokio::select! {
                _ = tick_rx.recv() => LoopInput::Pulse,
                line = lines.next_line() => LoopInput::Line(line?),
                _ = tokio::signal::ctrl_c() => LoopInput::Shutdown,
            };

            match input {
                LoopInput::Pulse => {
                    self.engine.tick()?;
                    self.drain_events();
                    // Completion leaves the running state; release the ticker.
                    self.sync_ticker(tick_rx);
                }
                LoopInput::Line(Some(line)) => {
                    let command = Command::parse(&line);
                    tracing::debug!(?command, "command received");
                    if !self.handle_command(command, tick_rx)? {
                        break;
                    }
                }
                LoopInput::Line(None) | LoopInput::Shutdown => break,
            }
        }

        // Covers the shutdown paths: dropping the handle aborts the task.
        self.ticker = None;
        Ok(())
    }

    /// Applies one user command. Returns false when the session should end.
    fn handle_command(
        &mut self,
        command: Command,
        tick_rx: &mut mpsc::UnboundedReceiver<()>,
    ) -> Result<bool> {
        match command {
            Command::Start => {
                if self.engine.timer().is_finished() {
                    // Starting at zero would be inert; require an explicit
                    // reset instead of guessing a restart.
                    Display::show_error("session finished - reset ('r') before starting again");
                } else {
                    self.engine.start()?;
                    self.sync_ticker(tick_rx);
                    self.drain_events();
                }
            }
            Command::Pause => {
                self.engine.pause()?;
                self.sync_ticker(tick_rx);
                self.drain_events();
            }
            Command::Reset => {
                self.engine.reset()?;
                self.sync_ticker(tick_rx);
                self.drain_events();
            }
            Command::Duration(input) => {
                if self.engine.timer().is_running() {
                    // Mirrors the disabled input field of the original UI;
                    // the state machine itself would tolerate the call.
                    Display::show_error("pause the timer before changing the session length");
                } else {
                    self.engine.configure_duration(&input)?;
                    self.drain_events();
                }
            }
            Command::Status => Display::show_status(&self.engine.snapshot()),
            Command::Help | Command::Unknown => Display::show_help(),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Keeps exactly one tick source alive iff the timer is running.
    ///
    /// Stopping also discards pulses already queued, so a pulse emitted just
    /// before a pause can never reach the timer afterwards.
    fn sync_ticker(&mut self, tick_rx: &mut mpsc::UnboundedReceiver<()>) {
        if self.engine.timer().is_running() {
            if self.ticker.is_none() {
                self.ticker = Some(TickSource::spawn(TICK_PERIOD, self.tick_tx.clone()));
                tracing::debug!("tick source started");
            }
        } else if self.ticker.take().is_some() {
            while tick_rx.try_recv().is_ok() {}
            tracing::debug!("tick source stopped");
        }
    }

    /// Renders every event the last operation produced.
    fn drain_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.render(&event);
        }
    }

    fn render(&self, event: &SessionEvent) {
        match event {
            SessionEvent::Completed { duration_seconds } => {
                Display::show_completed(*duration_seconds);
                Display::show_statistics(&self.engine.snapshot());
            }
            SessionEvent::Started
            | SessionEvent::Paused
            | SessionEvent::Reset
            | SessionEvent::DurationConfigured { .. }
            | SessionEvent::Tick { .. } => self.render_snapshot(),
        }
    }

    fn render_snapshot(&self) {
        let snapshot = self.engine.snapshot();
        if self.json {
            Display::show_snapshot_json(&snapshot);
        } else {
            Display::show_snapshot(&snapshot);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Command Parsing Tests
    // ------------------------------------------------------------------------

    mod command_parse_tests {
        use super::*;

        #[test]
        fn test_parse_start() {
            assert_eq!(Command::parse("start"), Command::Start);
            assert_eq!(Command::parse("s"), Command::Start);
            assert_eq!(Command::parse("  START  "), Command::Start);
        }

        #[test]
        fn test_parse_pause() {
            assert_eq!(Command::parse("pause"), Command::Pause);
            assert_eq!(Command::parse("p"), Command::Pause);
        }

        #[test]
        fn test_parse_reset() {
            assert_eq!(Command::parse("reset"), Command::Reset);
            assert_eq!(Command::parse("r"), Command::Reset);
        }

        #[test]
        fn test_parse_duration_with_argument() {
            assert_eq!(
                Command::parse("duration 45"),
                Command::Duration("45".to_string())
            );
            assert_eq!(Command::parse("d 5"), Command::Duration("5".to_string()));
        }

        #[test]
        fn test_parse_duration_keeps_raw_text() {
            // Sanitizing is the timer's job, not the parser's.
            assert_eq!(
                Command::parse("duration abc"),
                Command::Duration("abc".to_string())
            );
            assert_eq!(Command::parse("duration"), Command::Duration(String::new()));
        }

        #[test]
        fn test_parse_status_help_quit() {
            assert_eq!(Command::parse("status"), Command::Status);
            assert_eq!(Command::parse("help"), Command::Help);
            assert_eq!(Command::parse("?"), Command::Help);
            assert_eq!(Command::parse("quit"), Command::Quit);
            assert_eq!(Command::parse("q"), Command::Quit);
            assert_eq!(Command::parse("exit"), Command::Quit);
        }

        #[test]
        fn test_parse_unknown() {
            assert_eq!(Command::parse("bogus"), Command::Unknown);
            assert_eq!(Command::parse(""), Command::Unknown);
        }
    }

    // ------------------------------------------------------------------------
    // Host Behavior Tests
    // ------------------------------------------------------------------------

    mod host_tests {
        use super::*;

        fn create_app(minutes: u32) -> (App, mpsc::UnboundedReceiver<()>) {
            let args = RunArgs {
                minutes,
                json: false,
            };
            App::new(&args).unwrap()
        }

        #[test]
        fn test_new_app_configures_duration() {
            let (app, _tick_rx) = create_app(5);
            assert_eq!(app.engine.timer().configured_duration_seconds(), 300);
            assert_eq!(app.engine.timer().remaining_seconds(), 300);
            assert!(app.ticker.is_none());
        }

        #[tokio::test]
        async fn test_start_acquires_ticker() {
            let (mut app, mut tick_rx) = create_app(25);

            let keep_going = app.handle_command(Command::Start, &mut tick_rx).unwrap();

            assert!(keep_going);
            assert!(app.engine.timer().is_running());
            assert!(app.ticker.is_some());
        }

        #[tokio::test]
        async fn test_pause_releases_ticker() {
            let (mut app, mut tick_rx) = create_app(25);

            app.handle_command(Command::Start, &mut tick_rx).unwrap();
            app.handle_command(Command::Pause, &mut tick_rx).unwrap();

            assert!(!app.engine.timer().is_running());
            assert!(app.ticker.is_none());
        }

        #[tokio::test]
        async fn test_reset_releases_ticker_and_resyncs() {
            let (mut app, mut tick_rx) = create_app(25);

            app.handle_command(Command::Start, &mut tick_rx).unwrap();
            app.engine.tick().unwrap();
            app.handle_command(Command::Reset, &mut tick_rx).unwrap();

            assert!(app.ticker.is_none());
            assert_eq!(app.engine.timer().remaining_seconds(), 1500);
        }

        #[tokio::test]
        async fn test_repeated_start_keeps_single_ticker() {
            let (mut app, mut tick_rx) = create_app(25);

            app.handle_command(Command::Start, &mut tick_rx).unwrap();
            app.handle_command(Command::Start, &mut tick_rx).unwrap();

            assert!(app.ticker.is_some());
        }

        #[tokio::test]
        async fn test_duration_refused_while_running() {
            let (mut app, mut tick_rx) = create_app(25);

            app.handle_command(Command::Start, &mut tick_rx).unwrap();
            app.handle_command(Command::Duration("5".to_string()), &mut tick_rx)
                .unwrap();

            // The running countdown is untouched.
            assert_eq!(app.engine.timer().configured_duration_seconds(), 1500);
            assert_eq!(app.engine.timer().remaining_seconds(), 1500);
        }

        #[tokio::test]
        async fn test_duration_applies_while_paused() {
            let (mut app, mut tick_rx) = create_app(25);

            app.handle_command(Command::Duration("5".to_string()), &mut tick_rx)
                .unwrap();

            assert_eq!(app.engine.timer().configured_duration_seconds(), 300);
            assert_eq!(app.engine.timer().remaining_seconds(), 300);
        }

        #[tokio::test]
        async fn test_start_refused_when_finished() {
            let (mut app, mut tick_rx) = create_app(1);

            app.handle_command(Command::Start, &mut tick_rx).unwrap();
            for _ in 0..60 {
                app.engine.tick().unwrap();
            }
            app.sync_ticker(&mut tick_rx);
            assert!(app.engine.timer().is_finished());
            assert!(app.ticker.is_none());

            app.handle_command(Command::Start, &mut tick_rx).unwrap();

            assert!(!app.engine.timer().is_running());
            assert!(app.ticker.is_none());
        }

        #[tokio::test]
        async fn test_reset_then_start_restarts_after_finish() {
            let (mut app, mut tick_rx) = create_app(1);

            app.handle_command(Command::Start, &mut tick_rx).unwrap();
            for _ in 0..60 {
                app.engine.tick().unwrap();
            }
            app.sync_ticker(&mut tick_rx);

            app.handle_command(Command::Reset, &mut tick_rx).unwrap();
            app.handle_command(Command::Start, &mut tick_rx).unwrap();

            assert!(app.engine.timer().is_running());
            assert_eq!(app.engine.timer().remaining_seconds(), 60);
            assert!(app.ticker.is_some());
        }

        #[tokio::test]
        async fn test_quit_ends_loop() {
            let (mut app, mut tick_rx) = create_app(25);

            let keep_going = app.handle_command(Command::Quit, &mut tick_rx).unwrap();

            assert!(!keep_going);
        }

        #[tokio::test]
        async fn test_stale_pulse_discarded_on_pause() {
            let (mut app, mut tick_rx) = create_app(25);

            app.handle_command(Command::Start, &mut tick_rx).unwrap();
            // A pulse emitted just before the pause is queued, not yet seen.
            app.tick_tx.send(()).unwrap();
            app.handle_command(Command::Pause, &mut tick_rx).unwrap();

            assert!(
                tick_rx.try_recv().is_err(),
                "queued pulse must be discarded when the ticker stops"
            );
        }
    }
}
