//! Reqwest chunk source tests using wiremock.
//!
//! These tests verify the request sent to `POST /generate` and that a real
//! HTTP body flows through the session into state.

mod common;

use agentview::adapters::ReqwestChunkSource;
use agentview::config::ConsoleConfig;
use agentview::error::StreamError;
use agentview::session::{SessionStatus, StreamSession};
use agentview::traits::{ChunkSource, TransportError};
use common::{log_frame, SCENARIO};
use futures_util::StreamExt;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source_for(server: &MockServer) -> ReqwestChunkSource {
    let config = ConsoleConfig::default().with_base_url(server.uri());
    ReqwestChunkSource::from_config(&config).unwrap()
}

#[tokio::test]
async fn test_open_posts_task_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(header("accept", "text/event-stream"))
        .and(body_json(serde_json::json!({"task": "写一个排序函数"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(log_frame("hello")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server);
    let mut chunks = source.open("写一个排序函数").await.unwrap();

    let mut body = Vec::new();
    while let Some(chunk) = chunks.next().await {
        body.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(String::from_utf8(body).unwrap(), log_frame("hello"));
}

#[tokio::test]
async fn test_open_maps_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("pipeline crashed"))
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server);
    match source.open("task").await {
        Err(TransportError::ServerError { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "pipeline crashed");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected server error"),
    }
}

#[tokio::test]
async fn test_session_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(SCENARIO),
        )
        .mount(&mock_server)
        .await;

    let session = StreamSession::new(source_for(&mock_server));
    let outcome = session.start("print something").unwrap().wait().await;

    assert_eq!(outcome.status, SessionStatus::Completed);
    let state = session.snapshot();
    assert_eq!(state.logs, vec!["start"]);
    assert_eq!(state.code_buffer, "print(2)");
    assert!(state.review.as_ref().is_some_and(|r| r.pass));
}

#[tokio::test]
async fn test_session_reports_refused_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(422).set_body_string("task missing"))
        .mount(&mock_server)
        .await;

    let session = StreamSession::new(source_for(&mock_server));
    let outcome = session.start("task").unwrap().wait().await;

    assert_eq!(outcome.status, SessionStatus::Failed);
    assert!(matches!(
        outcome.error,
        Some(StreamError::OpenFailed {
            source: TransportError::ServerError { status: 422, .. }
        })
    ));
    assert_eq!(
        session.snapshot().logs,
        vec!["System Error: Server error (422): task missing"]
    );
}
