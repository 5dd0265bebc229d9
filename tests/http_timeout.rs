use async_trait::async_trait;
use fetchkit::{HttpClient, Request, RequestErrorKind, RequestOptions, Transport};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Never answers.
#[derive(Default)]
struct SilentTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for SilentTransport {
    async fn fetch(&self, _request: &Request) -> fetchkit::Result<reqwest::Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_slow_server_times_out_with_configured_value() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1_000)))
        .mount(&server)
        .await;

    let options = RequestOptions::new().with_timeout_ms(75);
    let err = fetchkit::get(server.uri(), options)
        .await
        .expect_err("request should time out");

    let request_error = err.as_request_error().expect("request error");
    assert_eq!(request_error.kind(), RequestErrorKind::Timeout(75));
    assert!(request_error.message().contains("75"));
    assert!(request_error.response().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_never_resolving_transport_times_out_on_every_attempt() {
    let transport = Arc::new(SilentTransport::default());
    let client = HttpClient::new().with_transport(transport.clone());

    let options = RequestOptions::new().with_timeout_ms(30_000).with_max_retry(2);
    let err = client
        .get("https://unreachable.example/", options)
        .await
        .expect_err("request should time out");

    assert!(err.to_string().contains("30000"));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
}
