//! Reframe CLI - binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`reframe_engine`] (session state) and [`reframe_tui`]
//! (rendering), providing RAII-based terminal management with guaranteed
//! cleanup.
//!
//! # Event Loop
//!
//! The frame loop runs at a fixed cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`reframe_tui::InputPump`])
//! 3. Advance session state (`session.tick()`)
//! 4. Apply background outcomes (`session.process_events()`)
//! 5. Render frame
//!
//! All session mutation happens on this single logical thread, so commands
//! never interleave over shared state.

use anyhow::Result;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::{Backend, CrosstermBackend, Terminal};
use std::{
    env,
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use reframe_engine::{Condition, Session, StudyConfig};
use reframe_tui::{InputPump, ViewState, draw, handle_events};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // If we can't open a log file, prefer "no logs" over corrupting the TUI
    // by writing to stdout/stderr.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.reframe/logs/reframe.log
    if let Some(config_path) = StudyConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("reframe.log"));
    }

    // Fallback: ./.reframe/logs/reframe.log (useful in constrained environments)
    candidates.push(PathBuf::from(".reframe").join("logs").join("reframe.log"));

    candidates
}

/// Extract the condition token from `--condition <token>` / `--condition=<token>`.
fn condition_arg() -> Option<String> {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--condition" {
            return args.next();
        }
        if let Some(value) = arg.strip_prefix("--condition=") {
            return Some(value.to_string());
        }
    }
    None
}

/// Resolve the session condition once at startup.
///
/// Precedence: CLI flag, then `REFRAME_CONDITION`, then the config file.
/// Anything unrecognized falls back to baseline.
fn resolve_condition(config: &StudyConfig) -> Condition {
    let token = condition_arg()
        .or_else(|| env::var("REFRAME_CONDITION").ok())
        .or_else(|| config.condition_token().map(str::to_string));

    let Some(raw) = token else {
        return Condition::Baseline;
    };
    if Condition::parse(&raw).is_none() {
        tracing::warn!(token = %raw, "unrecognized condition, falling back to baseline");
    }
    Condition::resolve(Some(&raw))
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Manages raw mode, bracketed paste, and the alternate screen. On drop, all
/// terminal state is restored to its original configuration, so the terminal
/// remains usable even after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnableBracketedPaste) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            let _ = execute!(out, DisableBracketedPaste);
            return Err(err.into());
        }

        let backend = CrosstermBackend::new(out);
        let terminal = match Terminal::new(backend) {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                let mut out = stdout();
                let _ = execute!(out, LeaveAlternateScreen, DisableBracketedPaste);
                return Err(err.into());
            }
        };

        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        );
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = match StudyConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable config");
            StudyConfig::default()
        }
    };

    let condition = resolve_condition(&config);
    tracing::info!(condition = %condition, "starting study session");

    let mut session = Session::new(condition, &config, Instant::now())?;
    session.begin_problem_fetch();

    // The terminal guard drops (restoring the terminal) before any error
    // from the loop propagates to the caller's reporting.
    let mut terminal_session = TerminalSession::new()?;
    run_app(&mut terminal_session.terminal, &mut session).await
}

const FRAME_DURATION: Duration = Duration::from_millis(33);

async fn run_app<B>(terminal: &mut Terminal<B>, session: &mut Session) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut view = ViewState::default();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        let quit_now = match handle_events(session, &mut input) {
            Ok(q) => q,
            Err(e) => break Err(e),
        };
        if quit_now {
            break Ok(());
        }

        let now = Instant::now();
        session.tick(now);
        session.process_events(now);

        if let Err(e) = terminal.draw(|frame| draw(frame, session, &mut view)) {
            break Err(e.into());
        }
    };

    input.shutdown().await;
    result
}
