//! Condition-driven affordance gating, end to end through the session.

use std::time::Instant;

use reframe_engine::Condition;
use reframe_types::WindowId;

use crate::common::{session_for, start_backend};

#[tokio::test]
async fn baseline_offers_no_assistance_anywhere() {
    let server = start_backend().await;
    let session = session_for(Condition::Baseline, &server, 0);
    for window in WindowId::all() {
        assert!(!session.generate_visible(*window));
        assert!(!session.can_generate(*window));
    }
}

#[tokio::test]
async fn llm_all_offers_assistance_everywhere() {
    let server = start_backend().await;
    let session = session_for(Condition::LlmAll, &server, 0);
    for window in WindowId::all() {
        assert!(session.generate_visible(*window));
    }
}

#[tokio::test]
async fn llm_early_assists_only_b_and_c() {
    let server = start_backend().await;
    let mut session = session_for(Condition::LlmEarly, &server, 0);
    session.tick(Instant::now());

    assert!(session.can_generate(WindowId::B));
    assert!(session.can_generate(WindowId::C));
    // D and E are unlocked (zero threshold) but never offer assistance
    // under llm_early.
    assert!(session.input_enabled(WindowId::D));
    assert!(!session.generate_visible(WindowId::D));
    assert!(!session.can_generate(WindowId::D));
    assert!(!session.can_generate(WindowId::E));
}

#[tokio::test]
async fn llm_later_assists_only_d_and_e() {
    let server = start_backend().await;
    let session = session_for(Condition::LlmLater, &server, 0);

    assert!(!session.generate_visible(WindowId::B));
    assert!(!session.generate_visible(WindowId::C));
    assert!(session.generate_visible(WindowId::D));
    assert!(session.generate_visible(WindowId::E));
}

#[tokio::test]
async fn unrecognized_condition_behaves_like_baseline() {
    let server = start_backend().await;
    let condition = Condition::resolve(Some("llm_sometimes"));
    assert_eq!(condition, Condition::Baseline);

    let session = session_for(condition, &server, 0);
    for window in WindowId::all() {
        assert!(!session.generate_visible(*window));
    }
}
