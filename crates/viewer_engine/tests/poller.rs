mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use url::Url;
use viewer_engine::{ClientSettings, EngineEvent, PollError, ReqwestSessionClient, StatusPoller};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn poller(server: &MockServer, interval: Duration) -> StatusPoller {
    let client = ReqwestSessionClient::new(ClientSettings::default(), None).unwrap();
    let url = Url::parse(&format!("{}/status/", server.uri())).unwrap();
    StatusPoller::new(Arc::new(client), url, interval)
}

#[tokio::test]
async fn first_fetch_is_immediate_and_sequence_increases() {
    common::init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "Procesando", "status_code": "processing"})),
        )
        .mount(&server)
        .await;

    let (sink, mut rx) = common::TestSink::new();
    // A long interval proves the first tick does not wait for it.
    let handle = poller(&server, Duration::from_secs(60)).spawn(sink.clone());

    match common::next_event(&mut rx).await {
        EngineEvent::Status { seq, result } => {
            assert_eq!(seq, 1);
            assert_eq!(result.unwrap().status.as_deref(), Some("Procesando"));
        }
        other => panic!("unexpected event {other:?}"),
    }
    handle.stop();
}

#[tokio::test]
async fn failures_keep_polling_until_stopped() {
    common::init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (sink, mut rx) = common::TestSink::new();
    let handle = poller(&server, Duration::from_millis(20)).spawn(sink.clone());

    let mut seqs = Vec::new();
    for _ in 0..3 {
        match common::next_event(&mut rx).await {
            EngineEvent::Status { seq, result } => {
                assert_eq!(result.unwrap_err(), PollError::HttpStatus(503));
                seqs.push(seq);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(seqs, vec![1, 2, 3]);
    assert!(!handle.is_stopped());
    handle.stop();
}

#[tokio::test]
async fn stop_is_idempotent_and_silences_the_poller() {
    common::init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "Esperando", "status_code": "waiting_user"})),
        )
        .mount(&server)
        .await;

    let (sink, mut rx) = common::TestSink::new();
    let handle = poller(&server, Duration::from_millis(20)).spawn(sink.clone());
    common::next_event(&mut rx).await;

    handle.stop();
    handle.stop();
    assert!(handle.is_stopped());

    tokio::time::sleep(Duration::from_millis(30)).await;
    sink.take();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(sink.take().is_empty());
}

#[tokio::test]
async fn stop_drops_in_flight_response() {
    common::init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_json(json!({"status": "Completado", "status_code": "completed"})),
        )
        .mount(&server)
        .await;

    let (sink, _rx) = common::TestSink::new();
    let handle = poller(&server, Duration::from_secs(60)).spawn(sink.clone());
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.stop();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(sink.take().is_empty());
}
