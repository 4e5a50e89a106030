//! The session controller.
//!
//! [`Session`] owns all per-session state - visibility matrix, unlock timers,
//! idea ledgers, draft inputs, and the generation lock - and exposes it to the
//! view through commands and read accessors. The view renders current state
//! and forwards commands; it owns no session logic.

use std::mem;
use std::time::{Duration, Instant};

use anyhow::Context;
use tokio::sync::mpsc;
use unicode_segmentation::UnicodeSegmentation;
use url::Url;

use reframe_client::{GenerationClient, ProblemClient};
use reframe_types::{
    Condition, GenerateRequest, IdeaLedger, Problem, Visibility, WindowId, WindowMap,
};

use crate::config::StudyConfig;
use crate::generation::{GenerationState, SessionEvent};
use crate::unlock::UnlockTimer;

// One request in flight plus the problem fetch; anything more is a bug.
const EVENT_CHANNEL_CAPACITY: usize = 16;

const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Single-line draft input for one window.
#[derive(Debug, Clone, Default)]
pub struct DraftInput {
    text: String,
}

impl DraftInput {
    pub fn insert(&mut self, c: char) {
        if !c.is_control() {
            self.text.push(c);
        }
    }

    /// Insert pasted text; control characters (including newlines) are
    /// dropped since the input is single-line.
    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert(c);
        }
    }

    /// Remove the last grapheme cluster.
    pub fn backspace(&mut self) {
        if let Some((idx, _)) = self.text.grapheme_indices(true).next_back() {
            self.text.truncate(idx);
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Default)]
struct WindowState {
    ledger: IdeaLedger,
    draft: DraftInput,
    selected: Option<usize>,
    changed: bool,
}

/// Per-session state machine driving the four-window study surface.
pub struct Session {
    condition: Condition,
    visibility: Visibility,
    problem: Option<Problem>,
    problem_pending: bool,
    windows: WindowMap<WindowState>,
    unlocks: WindowMap<Option<UnlockTimer>>,
    generation: GenerationState,
    focus: WindowId,
    notice: Option<(String, Instant)>,
    events_tx: mpsc::Sender<SessionEvent>,
    events_rx: mpsc::Receiver<SessionEvent>,
    generation_client: GenerationClient,
    problem_client: Option<ProblemClient>,
}

impl Session {
    /// Build a session for `condition`.
    ///
    /// The visibility matrix is derived here, once; the unlock timers for D
    /// and E start counting from `now`.
    pub fn new(condition: Condition, config: &StudyConfig, now: Instant) -> anyhow::Result<Self> {
        let base_url = Url::parse(config.backend_url()).context("invalid backend base_url")?;
        let generation_client = GenerationClient::new(&base_url, config.request_timeout())?;

        let problem_client = match config.problems_url() {
            Some(raw) => {
                let url = Url::parse(raw).context("invalid problems url")?;
                Some(ProblemClient::new(
                    url,
                    config.problems_api_key().map(str::to_string),
                    config.request_timeout(),
                )?)
            }
            None => None,
        };

        let threshold = config.unlock_threshold();
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            condition,
            visibility: Visibility::for_condition(condition),
            problem: None,
            problem_pending: problem_client.is_some(),
            windows: WindowMap::default(),
            unlocks: WindowMap::from_fn(|w| w.gated().then(|| UnlockTimer::new(threshold, now))),
            generation: GenerationState::Idle,
            focus: WindowId::B,
            notice: None,
            events_tx,
            events_rx,
            generation_client,
            problem_client,
        })
    }

    /// Kick off the one-time problem fetch on a background task.
    ///
    /// A fetch failure leaves `problem` unset; the view keeps showing its
    /// placeholder and generation requests substitute an empty string.
    pub fn begin_problem_fetch(&mut self) {
        let Some(client) = self.problem_client.clone() else {
            tracing::warn!("no problem source configured; showing placeholder");
            self.problem_pending = false;
            return;
        };
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = client.fetch().await;
            let _ = tx.send(SessionEvent::ProblemsLoaded(outcome)).await;
        });
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Type one character into the focused window's draft.
    pub fn insert_char(&mut self, c: char) {
        if self.input_enabled(self.focus) {
            self.windows[self.focus].draft.insert(c);
        }
    }

    /// Paste text into the focused window's draft.
    pub fn insert_str(&mut self, s: &str) {
        if self.input_enabled(self.focus) {
            self.windows[self.focus].draft.insert_str(s);
        }
    }

    pub fn backspace(&mut self) {
        if self.input_enabled(self.focus) {
            self.windows[self.focus].draft.backspace();
        }
    }

    /// Submit the focused window's draft to its ledger.
    ///
    /// Blank drafts are silently ignored; locked windows reject submission
    /// entirely. On success the draft is cleared.
    pub fn submit_idea(&mut self) {
        let window = self.focus;
        if !self.input_enabled(window) {
            return;
        }
        let state = &mut self.windows[window];
        let text = state.draft.as_str().to_string();
        if state.ledger.submit(&text) {
            state.draft.clear();
            state.changed = true;
        }
    }

    /// Remove the idea at `position` from `window`'s ledger.
    ///
    /// Out-of-range positions are silently ignored.
    pub fn remove_idea(&mut self, window: WindowId, position: usize) {
        if !self.input_enabled(window) {
            return;
        }
        let state = &mut self.windows[window];
        if state.ledger.remove(position) {
            state.changed = true;
            state.selected = match state.ledger.len() {
                0 => None,
                len => Some(position.min(len - 1)),
            };
        }
    }

    /// Remove the currently selected idea in the focused window.
    pub fn remove_selected(&mut self) {
        if let Some(position) = self.windows[self.focus].selected {
            self.remove_idea(self.focus, position);
        }
    }

    /// Move the idea selection up within the focused window.
    pub fn select_prev(&mut self) {
        let state = &mut self.windows[self.focus];
        state.selected = match (state.selected, state.ledger.len()) {
            (_, 0) => None,
            (None, len) => Some(len - 1),
            (Some(i), _) => Some(i.saturating_sub(1)),
        };
    }

    /// Move the idea selection down within the focused window.
    pub fn select_next(&mut self) {
        let state = &mut self.windows[self.focus];
        state.selected = match (state.selected, state.ledger.len()) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(i), len) => Some((i + 1).min(len - 1)),
        };
    }

    /// Whether the generation affordance for `window` is currently actionable.
    #[must_use]
    pub fn can_generate(&self, window: WindowId) -> bool {
        self.visibility.visible(window) && self.input_enabled(window) && !self.generation.is_busy()
    }

    /// Issue the assistance request for `window`.
    ///
    /// Ignored unless actionable (visible, unlocked, lock idle). Returns
    /// whether a request was started.
    pub fn request_generation(&mut self, window: WindowId) -> bool {
        if !self.can_generate(window) {
            return false;
        }

        let ledgers = WindowMap::from_fn(|w| self.windows[w].ledger.clone());
        let request = GenerateRequest::assemble(window, self.problem.as_ref(), &ledgers);
        self.generation = GenerationState::Busy { window };

        let client = self.generation_client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            // Exactly one outcome per request, success or failure; the send
            // is the lock-release path.
            let outcome = client.generate(&request).await;
            if tx
                .send(SessionEvent::GenerationFinished { window, outcome })
                .await
                .is_err()
            {
                tracing::warn!("session dropped before generation outcome arrived");
            }
        });
        true
    }

    /// Advance the unlock timers and expire the transient notice.
    pub fn tick(&mut self, now: Instant) {
        for window in WindowId::all() {
            if let Some(timer) = &mut self.unlocks[*window] {
                timer.tick(now);
            }
        }
        if let Some((_, shown_at)) = &self.notice
            && now.saturating_duration_since(*shown_at) > NOTICE_TTL
        {
            self.notice = None;
        }
    }

    /// Drain outcomes from background tasks and apply them to the session.
    pub fn process_events(&mut self, now: Instant) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                SessionEvent::ProblemsLoaded(outcome) => {
                    self.problem_pending = false;
                    match outcome {
                        Ok(problems) => {
                            if problems.is_empty() {
                                tracing::warn!("problem source returned no records");
                            }
                            self.problem = problems.into_iter().next();
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "failed to load problem records");
                        }
                    }
                }
                SessionEvent::GenerationFinished { window, outcome } => {
                    match outcome {
                        Ok(response) => {
                            if let Some(text) = response.non_empty_text() {
                                let text = text.to_string();
                                let state = &mut self.windows[window];
                                if state.ledger.append_generated(&text) {
                                    state.changed = true;
                                }
                            }
                        }
                        Err(err) => {
                            tracing::error!(window = %window, error = %err, "generation request failed");
                            self.notice =
                                Some(("assistance unavailable, try again".to_string(), now));
                        }
                    }
                    // Released on every completion path, success or failure.
                    self.generation = GenerationState::Idle;
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Read accessors for the view
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn condition(&self) -> Condition {
        self.condition
    }

    #[must_use]
    pub const fn focus(&self) -> WindowId {
        self.focus
    }

    #[must_use]
    pub fn problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    /// True until the first problem-fetch outcome arrives.
    #[must_use]
    pub const fn problem_pending(&self) -> bool {
        self.problem_pending
    }

    /// Whether `window` offers an assistance affordance under this condition.
    #[must_use]
    pub const fn generate_visible(&self, window: WindowId) -> bool {
        self.visibility.visible(window)
    }

    /// Whether `window` accepts input (ungated, or gated and unlocked).
    #[must_use]
    pub fn input_enabled(&self, window: WindowId) -> bool {
        self.unlocks[window].as_ref().is_none_or(UnlockTimer::unlocked)
    }

    /// Remaining lock time for `window`; `None` once unlocked (or never gated).
    #[must_use]
    pub fn unlock_remaining(&self, window: WindowId) -> Option<Duration> {
        self.unlocks[window]
            .as_ref()
            .filter(|timer| !timer.unlocked())
            .map(UnlockTimer::remaining)
    }

    #[must_use]
    pub const fn generation(&self) -> GenerationState {
        self.generation
    }

    #[must_use]
    pub const fn is_generating(&self) -> bool {
        self.generation.is_busy()
    }

    #[must_use]
    pub fn ledger(&self, window: WindowId) -> &[String] {
        self.windows[window].ledger.entries()
    }

    #[must_use]
    pub fn draft(&self, window: WindowId) -> &str {
        self.windows[window].draft.as_str()
    }

    #[must_use]
    pub fn selected(&self, window: WindowId) -> Option<usize> {
        self.windows[window].selected
    }

    /// Consume the `window` ledger's changed flag.
    ///
    /// Set on every ledger mutation; the view uses it to scroll the idea
    /// list to the newest entry.
    pub fn take_ledger_changed(&mut self, window: WindowId) -> bool {
        mem::take(&mut self.windows[window].changed)
    }

    /// Transient status-line notice, if any.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(text, _)| text.as_str())
    }
}
