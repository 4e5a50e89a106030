//! Generation round trips: payload shapes, the session-wide lock, and the
//! soft-failure path.

use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use reframe_engine::Condition;
use reframe_types::WindowId;

use crate::common::{
    drive_until_idle, focus_on, mount_generation, mount_generation_failure, session_for,
    start_backend, type_text,
};

#[tokio::test]
async fn window_c_round_trip_appends_to_ledger_c() {
    let server = start_backend().await;
    Mock::given(method("POST"))
        .and(path("/prompt_llm"))
        .and(body_json(json!({
            "window_id": "C",
            "problem": "",
            "ideas": { "idea_b": ["a"], "idea_c": [] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "generated c" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(Condition::LlmAll, &server, 300);
    type_text(&mut session, "a");
    session.submit_idea();

    assert!(session.request_generation(WindowId::C));
    drive_until_idle(&mut session).await;

    assert_eq!(session.ledger(WindowId::C), ["generated c"]);
    assert_eq!(session.ledger(WindowId::B), ["a"]);
    assert!(!session.is_generating());
    assert!(session.notice().is_none());
}

#[tokio::test]
async fn late_windows_send_the_reframing_payload() {
    let server = start_backend().await;
    Mock::given(method("POST"))
        .and(path("/prompt_llm"))
        .and(body_json(json!({
            "window_id": "E",
            "problem": "",
            "ideas": { "idea_d": ["frame"], "idea_e": [] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "What if ..." })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(Condition::LlmLater, &server, 0);
    session.tick(Instant::now());
    focus_on(&mut session, WindowId::D);
    type_text(&mut session, "frame");
    session.submit_idea();

    assert!(session.request_generation(WindowId::E));
    drive_until_idle(&mut session).await;
    assert_eq!(session.ledger(WindowId::E), ["What if ..."]);
}

#[tokio::test]
async fn empty_response_text_adds_nothing() {
    let server = start_backend().await;
    mount_generation(&server, json!({})).await;

    let mut session = session_for(Condition::LlmAll, &server, 300);
    assert!(session.request_generation(WindowId::B));
    drive_until_idle(&mut session).await;

    assert!(session.ledger(WindowId::B).is_empty());
    assert!(session.notice().is_none());
}

#[tokio::test]
async fn backend_failure_is_soft_and_releases_the_lock() {
    let server = start_backend().await;
    mount_generation_failure(&server, 500).await;

    let mut session = session_for(Condition::LlmAll, &server, 300);
    assert!(session.request_generation(WindowId::B));
    drive_until_idle(&mut session).await;

    assert!(session.ledger(WindowId::B).is_empty());
    assert!(!session.is_generating());
    assert!(session.notice().is_some());
    // The affordance is actionable again after the failure.
    assert!(session.can_generate(WindowId::B));
}

#[tokio::test]
async fn one_request_in_flight_disables_every_window() {
    let server = start_backend().await;
    Mock::given(method("POST"))
        .and(path("/prompt_llm"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "text": "slow b" }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(Condition::LlmAll, &server, 0);
    session.tick(Instant::now());

    assert!(session.request_generation(WindowId::B));
    assert!(session.is_generating());

    // The lock is session-wide: no window may start a second request,
    // regardless of its own visibility and unlock state.
    for window in WindowId::all() {
        assert!(!session.can_generate(*window));
    }
    assert!(!session.request_generation(WindowId::D));

    drive_until_idle(&mut session).await;
    assert_eq!(session.ledger(WindowId::B), ["slow b"]);
    assert!(session.ledger(WindowId::D).is_empty());
    assert!(session.can_generate(WindowId::D));
}
