//! Core domain types for Reframe.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies. Everything here can be used from any layer of the application.

mod ledger;
mod wire;

pub use ledger::IdeaLedger;
pub use wire::{ContextIdeas, GenerateRequest, GenerateResponse, Problem};

use serde::{Deserialize, Serialize};

// ============================================================================
// Windows
// ============================================================================

/// One of the four fixed reasoning windows shown to a participant.
///
/// Each variant carries its static per-window configuration (title,
/// participant instruction, gating) so the rest of the application can drive
/// all four windows through one generic code path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowId {
    B,
    C,
    D,
    E,
}

impl WindowId {
    pub const COUNT: usize = 4;

    /// All windows in display order.
    #[must_use]
    pub const fn all() -> &'static [WindowId] {
        &[WindowId::B, WindowId::C, WindowId::D, WindowId::E]
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            WindowId::B => "B",
            WindowId::C => "C",
            WindowId::D => "D",
            WindowId::E => "E",
        }
    }

    /// Pane heading shown above the window.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            WindowId::B => "What are the apparent problems?",
            WindowId::C => "Why is this problem difficult to solve?",
            WindowId::D => "How else can the problems be approached?",
            WindowId::E => "What could be potential solutions?",
        }
    }

    /// One-line instruction rendered under the heading.
    #[must_use]
    pub const fn instruction(self) -> &'static str {
        match self {
            WindowId::B => "Read the problem description carefully and list problems you can identify.",
            WindowId::C => "Think about why the apparent problems are difficult to solve.",
            WindowId::D => "Brainstorm alternative perspectives to address the problems.",
            WindowId::E => "Brainstorm solutions to the alternative problem frames you explored above.",
        }
    }

    /// Whether this window starts locked behind an unlock timer.
    #[must_use]
    pub const fn gated(self) -> bool {
        matches!(self, WindowId::D | WindowId::E)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            WindowId::B => 0,
            WindowId::C => 1,
            WindowId::D => 2,
            WindowId::E => 3,
        }
    }

    /// Next window in display order, wrapping E back to B.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            WindowId::B => WindowId::C,
            WindowId::C => WindowId::D,
            WindowId::D => WindowId::E,
            WindowId::E => WindowId::B,
        }
    }

    /// Previous window in display order, wrapping B back to E.
    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            WindowId::B => WindowId::E,
            WindowId::C => WindowId::B,
            WindowId::D => WindowId::C,
            WindowId::E => WindowId::D,
        }
    }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-size map from [`WindowId`] to a value, indexable by window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowMap<T>([T; WindowId::COUNT]);

impl<T> WindowMap<T> {
    pub fn from_fn(mut f: impl FnMut(WindowId) -> T) -> Self {
        Self([
            f(WindowId::B),
            f(WindowId::C),
            f(WindowId::D),
            f(WindowId::E),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = (WindowId, &T)> {
        WindowId::all().iter().map(|w| (*w, &self.0[w.index()]))
    }
}

impl<T> std::ops::Index<WindowId> for WindowMap<T> {
    type Output = T;

    fn index(&self, window: WindowId) -> &T {
        &self.0[window.index()]
    }
}

impl<T> std::ops::IndexMut<WindowId> for WindowMap<T> {
    fn index_mut(&mut self, window: WindowId) -> &mut T {
        &mut self.0[window.index()]
    }
}

// ============================================================================
// Experimental Conditions
// ============================================================================

/// The experimental treatment assigned to a session.
///
/// Controls which windows offer assisted generation. Immutable for the
/// session lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    Baseline,
    LlmAll,
    LlmEarly,
    LlmLater,
}

impl Condition {
    /// Parse a condition token.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baseline" => Some(Condition::Baseline),
            "llm_all" => Some(Condition::LlmAll),
            "llm_early" => Some(Condition::LlmEarly),
            "llm_later" => Some(Condition::LlmLater),
            _ => None,
        }
    }

    /// Resolve the session condition from an optional entry token.
    ///
    /// Absent and unrecognized tokens both fall back to [`Condition::Baseline`];
    /// there is no error path.
    #[must_use]
    pub fn resolve(token: Option<&str>) -> Self {
        token.and_then(Self::parse).unwrap_or_default()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Condition::Baseline => "baseline",
            Condition::LlmAll => "llm_all",
            Condition::LlmEarly => "llm_early",
            Condition::LlmLater => "llm_later",
        }
    }

    /// All recognized conditions.
    #[must_use]
    pub const fn all() -> &'static [Condition] {
        &[
            Condition::Baseline,
            Condition::LlmAll,
            Condition::LlmEarly,
            Condition::LlmLater,
        ]
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Visibility Matrix
// ============================================================================

/// Per-window "assistance affordance visible" matrix.
///
/// A pure function of [`Condition`], computed once at session start and never
/// mutated. Early windows (B, C) show assistance under `llm_all`/`llm_early`;
/// late windows (D, E) under `llm_all`/`llm_later`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    matrix: [bool; WindowId::COUNT],
}

impl Visibility {
    #[must_use]
    pub fn for_condition(condition: Condition) -> Self {
        let visible = |window: WindowId| match window {
            WindowId::B | WindowId::C => {
                matches!(condition, Condition::LlmAll | Condition::LlmEarly)
            }
            WindowId::D | WindowId::E => {
                matches!(condition, Condition::LlmAll | Condition::LlmLater)
            }
        };
        Self {
            matrix: [
                visible(WindowId::B),
                visible(WindowId::C),
                visible(WindowId::D),
                visible(WindowId::E),
            ],
        }
    }

    #[must_use]
    pub const fn visible(&self, window: WindowId) -> bool {
        self.matrix[window.index()]
    }

    /// True when no window offers assistance (the `baseline` matrix).
    #[must_use]
    pub fn all_hidden(&self) -> bool {
        self.matrix.iter().all(|v| !v)
    }
}

// ============================================================================
// Tests
// ============================================================================
