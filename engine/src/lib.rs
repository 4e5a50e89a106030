//! Session engine for Reframe - state machine and orchestration.
//!
//! This crate contains the [`Session`] state machine without TUI dependencies:
//!
//! - **Condition gating**: the visibility matrix is resolved once at session
//!   start and drives which windows offer assisted generation.
//! - **Unlock timers**: the two late windows (D, E) open after a configurable
//!   wall-clock threshold; timers are plain state advanced by `tick`.
//! - **Idea ledgers**: per-window ordered idea lists mutated through commands.
//! - **Generation coordination**: one outbound assistance request at a time,
//!   session-wide, with the lock released on every completion path.
//!
//! # Architecture
//!
//! The binary's frame loop owns the session and runs commands sequentially
//! (input -> tick -> process_events -> draw), so state mutations never
//! interleave. The only suspending work - the HTTP calls - runs on spawned
//! tokio tasks that report back over an mpsc channel drained by
//! [`Session::process_events`]. The TUI layer (`reframe_tui`) reads state from
//! `Session` and forwards commands to it; no rendering logic lives here.

mod config;
mod generation;
mod session;
mod unlock;

pub use config::{ConfigError, StudyConfig};
pub use generation::GenerationState;
pub use session::{DraftInput, Session};
pub use unlock::UnlockTimer;

pub use reframe_types::{Condition, IdeaLedger, Problem, Visibility, WindowId};
