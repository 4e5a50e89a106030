//! Generation lock and session events.

use reframe_client::ClientError;
use reframe_types::{GenerateResponse, Problem, WindowId};

/// Session-wide mutual exclusion for assistance requests.
///
/// While `Busy`, every generation affordance in every window is disabled -
/// the lock is deliberately not per-window, so two windows can never have
/// requests in flight at once. `Idle -> Busy` on request start,
/// `Busy -> Idle` on completion (success or failure); there are no other
/// transitions and no queuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    Busy {
        window: WindowId,
    },
}

impl GenerationState {
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, GenerationState::Busy { .. })
    }

    #[must_use]
    pub const fn busy_window(&self) -> Option<WindowId> {
        match self {
            GenerationState::Idle => None,
            GenerationState::Busy { window } => Some(*window),
        }
    }
}

/// Outcome of a background task, delivered to the session over its event
/// channel and applied by [`Session::process_events`](crate::Session::process_events).
#[derive(Debug)]
pub(crate) enum SessionEvent {
    ProblemsLoaded(Result<Vec<Problem>, ClientError>),
    GenerationFinished {
        window: WindowId,
        outcome: Result<GenerateResponse, ClientError>,
    },
}
