// ABOUTME: Integration tests for the health probe and bounded verifier.
// ABOUTME: Uses a local mock server and a closed port; no external network.

mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use support::{MockHttpServer, MockResponse};
use warship::health::{Backoff, HealthStatus, HealthVerifier, ProbeUrl, probe_once};
use warship::types::{ContextPath, HostName};

fn url(port: u16, context: &str, index: &str) -> ProbeUrl {
    ProbeUrl::new(
        HostName::new("127.0.0.1").unwrap(),
        port,
        &ContextPath::new(context).unwrap(),
        index,
    )
    .unwrap()
}

#[tokio::test]
async fn healthy_on_2xx_with_head_request() {
    let server = MockHttpServer::fixed(200, "").await;

    let status = probe_once(&url(server.port(), "/shop", "index.jsp"), Duration::from_secs(2)).await;
    assert_eq!(status, HealthStatus::Healthy);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "HEAD");
    assert_eq!(requests[0].path, "/shop/index.jsp");
}

#[tokio::test]
async fn non_2xx_is_unexpected_status() {
    let server = MockHttpServer::fixed(503, "").await;
    let status = probe_once(&url(server.port(), "/", "index.html"), Duration::from_secs(2)).await;
    assert_eq!(status, HealthStatus::UnexpectedStatus(503));
}

#[tokio::test]
async fn refused_connection_is_unreachable_within_bound() {
    support::init_tracing();
    let port = support::closed_port();
    let verifier = HealthVerifier::new(Duration::from_millis(500), 3)
        .backoff(Backoff::Fixed(Duration::from_millis(50)));

    let started = Instant::now();
    let status = verifier.probe(&url(port, "/shop", "index.html")).await;

    assert_eq!(status, HealthStatus::Unreachable);
    assert!(started.elapsed() <= Duration::from_millis(3 * 500) + Duration::from_millis(200));
}

#[tokio::test]
async fn default_backoff_stays_within_attempts_times_timeout() {
    let port = support::closed_port();
    let verifier = HealthVerifier::new(Duration::from_millis(300), 3);
    assert_eq!(verifier.total_bound(), Duration::from_millis(900));

    let started = Instant::now();
    let status = verifier.probe(&url(port, "/shop", "")).await;

    assert_eq!(status, HealthStatus::Unreachable);
    assert!(
        started.elapsed() <= Duration::from_millis(900) + Duration::from_millis(200),
        "took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn retries_until_healthy() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let server = MockHttpServer::start(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            MockResponse::new(503, "")
        } else {
            MockResponse::new(200, "")
        }
    })
    .await;

    let verifier = HealthVerifier::new(Duration::from_secs(1), 5)
        .backoff(Backoff::Fixed(Duration::from_millis(10)));
    let status = verifier.probe(&url(server.port(), "/", "")).await;

    assert_eq!(status, HealthStatus::Healthy);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn returns_last_status_after_all_attempts() {
    let server = MockHttpServer::fixed(404, "").await;
    let verifier = HealthVerifier::new(Duration::from_secs(1), 2)
        .backoff(Backoff::Fixed(Duration::from_millis(10)));

    let status = verifier.probe(&url(server.port(), "/", "missing")).await;
    assert_eq!(status, HealthStatus::UnexpectedStatus(404));
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn deadline_cuts_the_loop_short() {
    let port = support::closed_port();
    let verifier = HealthVerifier::new(Duration::from_secs(1), 100)
        .backoff(Backoff::Fixed(Duration::from_secs(1)))
        .deadline(Duration::from_millis(300));

    let started = Instant::now();
    let status = verifier.probe(&url(port, "/", "")).await;

    assert_eq!(status, HealthStatus::Unreachable);
    assert!(started.elapsed() < Duration::from_secs(2));
}
