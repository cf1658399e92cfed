//! End-to-end session tests against a mock analysis service.
//!
//! These run in real time: paused tokio time auto-advances while the mock
//! server's I/O is pending, which would fire timers early.

use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use trendwatch::{
    ApiClient, ApiConfig, SchedulePhase, Sender, Session, SessionEvent, SessionOptions,
    SystemClock,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

fn naive_utc_minutes_ago(minutes: i64) -> String {
    (Utc::now() - ChronoDuration::minutes(minutes))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn results_body(timestamp: &str) -> Value {
    json!([{
        "id": 1,
        "repo_name": "owner/repo",
        "repo_url": "https://github.com/owner/repo",
        "analysis_timestamp": timestamp,
        "one_liner_summary": "A repository.",
        "tech_stack": ["Rust"],
        "key_features": ["speed"],
        "community_focus": ["performance"]
    }])
}

async fn mount_service(server: &MockServer, interval: &str, timestamp: &str) {
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "trending_language": "rust",
            "schedule_interval_minutes": interval
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_body(timestamp)))
        .mount(server)
        .await;
}

async fn config_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/api/config")
        .count()
}

async fn next(events: &mut UnboundedReceiver<SessionEvent>) -> SessionEvent {
    tokio::time::timeout(EVENT_TIMEOUT, events.recv())
        .await
        .expect("event before timeout")
        .expect("session still running")
}

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(ApiConfig::new(server.uri())).expect("client")
}

#[tokio::test]
async fn loads_and_arms_from_service_data() {
    let server = MockServer::start().await;
    mount_service(&server, "60", &naive_utc_minutes_ago(10)).await;

    let client = client_for(&server);
    let (session, handle, mut events) = Session::new(
        client.clone(),
        client,
        SystemClock,
        SessionOptions::default(),
    );
    let task = session.spawn();

    assert!(matches!(next(&mut events).await, SessionEvent::Loading));
    match next(&mut events).await {
        SessionEvent::Loaded { config, results } => {
            assert_eq!(config.trending_language.as_deref(), Some("rust"));
            assert_eq!(results.len(), 1);
        }
        other => panic!("expected Loaded, got {other:?}"),
    }
    match next(&mut events).await {
        SessionEvent::Scheduled(state) => {
            assert_eq!(state.phase, SchedulePhase::Armed);
            let wait = state.next_fire_at.expect("next fire") - Utc::now();
            assert!(wait > ChronoDuration::minutes(49) && wait <= ChronoDuration::minutes(50));
        }
        other => panic!("expected Scheduled, got {other:?}"),
    }

    handle.shutdown().expect("shutdown");
    assert!(matches!(next(&mut events).await, SessionEvent::Stopped));
    task.await.expect("session task");
}

#[tokio::test]
async fn chat_reply_triggers_one_refetch() {
    let server = MockServer::start().await;
    mount_service(&server, "60", &naive_utc_minutes_ago(10)).await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({ "message": "track rust every 2 hours" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reply": "Done. Interval set to 120 minutes."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (session, handle, mut events) = Session::new(
        client.clone(),
        client,
        SystemClock,
        SessionOptions::default(),
    );
    let task = session.spawn();
    for _ in 0..3 {
        next(&mut events).await;
    }
    assert_eq!(config_requests(&server).await, 1);

    handle
        .send_chat("track rust every 2 hours")
        .expect("send chat");

    let mut reply = None;
    let mut refreshed = false;
    while reply.is_none() {
        match next(&mut events).await {
            SessionEvent::Refreshed { .. } => refreshed = true,
            SessionEvent::ChatMessage(message) if message.sender == Sender::Bot => {
                reply = Some(message)
            }
            _ => {}
        }
    }

    assert!(refreshed, "reply must be preceded by a refresh");
    assert_eq!(
        reply.expect("reply").text,
        "Done. Interval set to 120 minutes."
    );
    assert_eq!(config_requests(&server).await, 2);

    handle.shutdown().expect("shutdown");
    task.await.expect("session task");
}

#[tokio::test]
async fn chat_failure_shows_error_bubble() {
    let server = MockServer::start().await;
    mount_service(&server, "60", &naive_utc_minutes_ago(10)).await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (session, handle, mut events) = Session::new(
        client.clone(),
        client,
        SystemClock,
        SessionOptions::default(),
    );
    let task = session.spawn();
    for _ in 0..3 {
        next(&mut events).await;
    }

    handle.send_chat("hello").expect("send chat");
    assert!(matches!(
        next(&mut events).await,
        SessionEvent::ChatMessage(_)
    ));
    match next(&mut events).await {
        SessionEvent::ChatMessage(message) => {
            assert!(message.is_error);
            assert!(message.text.contains("500"), "got {}", message.text);
        }
        other => panic!("expected error bubble, got {other:?}"),
    }
    assert_eq!(config_requests(&server).await, 1);

    handle.shutdown().expect("shutdown");
    task.await.expect("session task");
}

#[tokio::test]
async fn failed_start_recovers_on_reload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_service(&server, "60", &naive_utc_minutes_ago(10)).await;

    let client = client_for(&server);
    let (session, handle, mut events) = Session::new(
        client.clone(),
        client,
        SystemClock,
        SessionOptions::default(),
    );
    let task = session.spawn();

    assert!(matches!(next(&mut events).await, SessionEvent::Loading));
    match next(&mut events).await {
        SessionEvent::LoadFailed { message } => assert!(message.contains("503")),
        other => panic!("expected LoadFailed, got {other:?}"),
    }

    handle.reload().expect("reload");
    assert!(matches!(next(&mut events).await, SessionEvent::Loading));
    assert!(matches!(
        next(&mut events).await,
        SessionEvent::Loaded { .. }
    ));

    handle.shutdown().expect("shutdown");
    task.await.expect("session task");
}

#[tokio::test]
async fn overdue_schedule_retries_after_catch_up_delay() {
    let server = MockServer::start().await;
    mount_service(&server, "10", &naive_utc_minutes_ago(120)).await;

    let client = client_for(&server);
    let options = SessionOptions {
        catch_up_delay: Duration::from_millis(200),
    };
    let (session, handle, mut events) =
        Session::new(client.clone(), client, SystemClock, options);
    let task = session.spawn();

    assert!(matches!(next(&mut events).await, SessionEvent::Loading));
    assert!(matches!(
        next(&mut events).await,
        SessionEvent::Loaded { .. }
    ));
    match next(&mut events).await {
        SessionEvent::Scheduled(state) => assert_eq!(state.phase, SchedulePhase::CatchingUp),
        other => panic!("expected Scheduled, got {other:?}"),
    }

    assert!(matches!(
        next(&mut events).await,
        SessionEvent::Refreshed { .. }
    ));
    assert_eq!(config_requests(&server).await, 2);

    handle.shutdown().expect("shutdown");
    task.await.expect("session task");
}
