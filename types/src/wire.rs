//! Wire payloads for the two HTTP collaborators.
//!
//! The generation service accepts `{window_id, problem, ideas}` and answers
//! `{text?}`; the problem source returns an ordered collection of `{id, text}`
//! records. These types pin both formats; the clients in `reframe-client` do
//! the transport.

use serde::{Deserialize, Serialize};

use crate::{IdeaLedger, WindowId, WindowMap};

/// A problem statement record from the problem source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: i64,
    pub text: String,
}

/// Window-shaped idea context carried in a generation request.
///
/// The service reads a different shape per window: a bare array for B, the
/// early-window ledgers for C, and the late-window ledgers for both D and E
/// (the reframing windows build on each other).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ContextIdeas {
    Listing(Vec<String>),
    Diagnosis {
        idea_b: Vec<String>,
        idea_c: Vec<String>,
    },
    Reframing {
        idea_d: Vec<String>,
        idea_e: Vec<String>,
    },
}

impl ContextIdeas {
    /// Build the context payload for a window from the current ledgers.
    ///
    /// B sends only the problem text, so its idea context is empty on the
    /// wire.
    #[must_use]
    pub fn for_window(window: WindowId, ledgers: &WindowMap<IdeaLedger>) -> Self {
        let entries = |w: WindowId| ledgers[w].entries().to_vec();
        match window {
            WindowId::B => ContextIdeas::Listing(Vec::new()),
            WindowId::C => ContextIdeas::Diagnosis {
                idea_b: entries(WindowId::B),
                idea_c: entries(WindowId::C),
            },
            WindowId::D | WindowId::E => ContextIdeas::Reframing {
                idea_d: entries(WindowId::D),
                idea_e: entries(WindowId::E),
            },
        }
    }
}

/// Outbound request body for the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    pub window_id: WindowId,
    pub problem: String,
    pub ideas: ContextIdeas,
}

impl GenerateRequest {
    /// Assemble the request for `window` from the problem text and the
    /// current ledgers.
    ///
    /// An unloaded problem substitutes the empty string.
    #[must_use]
    pub fn assemble(
        window: WindowId,
        problem: Option<&Problem>,
        ledgers: &WindowMap<IdeaLedger>,
    ) -> Self {
        Self {
            window_id: window,
            problem: problem.map(|p| p.text.clone()).unwrap_or_default(),
            ideas: ContextIdeas::for_window(window, ledgers),
        }
    }
}

/// Response body from the generation service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// The generated text, if present and non-blank.
    #[must_use]
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
