//! Whole-session scenarios: unlock gating and the problem fetch.

use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reframe_engine::{Condition, Session, StudyConfig};
use reframe_types::WindowId;

use crate::common::{backend_config, focus_on, start_backend, type_text};

#[tokio::test]
async fn locked_window_ignores_input_until_the_timer_elapses() {
    let server = start_backend().await;
    let config = backend_config(&server, 300);
    let t0 = Instant::now();
    let mut session = Session::new(Condition::LlmLater, &config, t0).unwrap();

    focus_on(&mut session, WindowId::D);
    assert!(!session.input_enabled(WindowId::D));

    // Typing "idea1" and submitting while locked leaves the ledger empty.
    type_text(&mut session, "idea1");
    session.submit_idea();
    assert!(session.ledger(WindowId::D).is_empty());

    // Five minutes later the window opens and the same input lands.
    session.tick(t0 + Duration::from_secs(300));
    assert!(session.input_enabled(WindowId::D));
    type_text(&mut session, "idea1");
    session.submit_idea();
    assert_eq!(session.ledger(WindowId::D), ["idea1"]);
}

#[tokio::test]
async fn countdown_shrinks_and_disappears_on_unlock() {
    let server = start_backend().await;
    let config = backend_config(&server, 120);
    let t0 = Instant::now();
    let mut session = Session::new(Condition::Baseline, &config, t0).unwrap();

    let mut last = session.unlock_remaining(WindowId::E).unwrap();
    for secs in [10, 60, 119] {
        session.tick(t0 + Duration::from_secs(secs));
        let remaining = session.unlock_remaining(WindowId::E).unwrap();
        assert!(remaining <= last);
        last = remaining;
    }

    session.tick(t0 + Duration::from_secs(120));
    assert_eq!(session.unlock_remaining(WindowId::E), None);
    assert!(session.input_enabled(WindowId::E));

    // Ungated windows never report a countdown.
    assert_eq!(session.unlock_remaining(WindowId::B), None);
}

fn problems_config(server: &MockServer) -> StudyConfig {
    let raw = format!(
        concat!(
            "[backend]\nbase_url = \"{uri}\"\ntimeout_secs = 5\n\n",
            "[problems]\nurl = \"{uri}/problems\"\n",
        ),
        uri = server.uri()
    );
    toml::from_str(&raw).expect("test config is valid TOML")
}

async fn pump_problem_fetch(session: &mut Session) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while session.problem_pending() {
        assert!(Instant::now() < deadline, "problem fetch never completed");
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.process_events(Instant::now());
    }
}

#[tokio::test]
async fn session_displays_the_lowest_id_problem() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/problems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 3, "text": "second problem" },
            { "id": 1, "text": "first problem" },
        ])))
        .mount(&server)
        .await;

    let config = problems_config(&server);
    let mut session = Session::new(Condition::Baseline, &config, Instant::now()).unwrap();
    assert!(session.problem_pending());

    session.begin_problem_fetch();
    pump_problem_fetch(&mut session).await;

    assert_eq!(session.problem().unwrap().text, "first problem");
}

#[tokio::test]
async fn failed_problem_fetch_leaves_the_placeholder() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/problems"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = problems_config(&server);
    let mut session = Session::new(Condition::Baseline, &config, Instant::now()).unwrap();
    session.begin_problem_fetch();
    pump_problem_fetch(&mut session).await;

    assert!(session.problem().is_none());
    assert!(!session.problem_pending());
}

#[tokio::test]
async fn no_problem_source_configured_skips_the_fetch() {
    let server = start_backend().await;
    let config = backend_config(&server, 300);
    let mut session = Session::new(Condition::Baseline, &config, Instant::now()).unwrap();

    assert!(!session.problem_pending());
    session.begin_problem_fetch();
    assert!(session.problem().is_none());
}
