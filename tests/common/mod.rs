//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::time::{Duration, Instant};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reframe_engine::{Condition, Session, StudyConfig};
use reframe_types::WindowId;

/// Start a mock server that simulates the generation backend.
pub async fn start_backend() -> MockServer {
    MockServer::start().await
}

/// Mount a generation response with the given body.
pub async fn mount_generation(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/prompt_llm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a failing generation endpoint.
pub async fn mount_generation_failure(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/prompt_llm"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Build a study config pointed at the mock backend.
pub fn backend_config(server: &MockServer, unlock_secs: u64) -> StudyConfig {
    let raw = format!(
        "[study]\nunlock_after_secs = {unlock_secs}\n\n[backend]\nbase_url = \"{}\"\ntimeout_secs = 5\n",
        server.uri()
    );
    toml::from_str(&raw).expect("test config is valid TOML")
}

/// Build a session against the mock backend.
pub fn session_for(condition: Condition, server: &MockServer, unlock_secs: u64) -> Session {
    let config = backend_config(server, unlock_secs);
    Session::new(condition, &config, Instant::now()).expect("session builds")
}

/// Pump the session until the generation lock releases.
pub async fn drive_until_idle(session: &mut Session) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while session.is_generating() {
        assert!(
            Instant::now() < deadline,
            "generation lock was never released"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.process_events(Instant::now());
    }
}

/// Type a line of text into the focused window.
pub fn type_text(session: &mut Session, text: &str) {
    for c in text.chars() {
        session.insert_char(c);
    }
}

/// Move focus to `window`.
pub fn focus_on(session: &mut Session, window: WindowId) {
    while session.focus() != window {
        session.focus_next();
    }
}
