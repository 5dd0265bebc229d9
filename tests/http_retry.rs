use fetchkit::{FetchError, RequestOptions};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

async fn hits(server: &MockServer) -> usize {
    server.received_requests().await.expect("requests").len()
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_retries_on_http_500_until_budget_spent() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/retry"))
        .respond_with(ResponseTemplate::new(500).set_body_string("try again"))
        .mount(&server)
        .await;

    let options = RequestOptions::new().with_max_retry(2);
    let err = fetchkit::get(format!("{}/retry", server.uri()), options)
        .await
        .expect_err("request should fail");

    let request_error = err.as_request_error().expect("request error");
    assert_eq!(request_error.status().map(|s| s.as_u16()), Some(500));
    assert_eq!(hits(&server).await, 3);
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_succeeds_after_transient_failures() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&server)
        .await;

    let options = RequestOptions::new().with_max_retry(5);
    let body = fetchkit::get(format!("{}/flaky", server.uri()), options)
        .await
        .expect("request should succeed");
    assert_eq!(body, "recovered");
    assert_eq!(hits(&server).await, 3);
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_client_errors_are_retried_too() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let options = RequestOptions::new().with_max_retry(1);
    let err = fetchkit::get(format!("{}/missing", server.uri()), options)
        .await
        .expect_err("request should fail");
    assert!(err.to_string().contains("404"));
    assert_eq!(hits(&server).await, 2);
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_no_retry_by_default() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = fetchkit::get(server.uri(), RequestOptions::new())
        .await
        .expect_err("request should fail");
    assert!(err.as_request_error().is_some());
    assert_eq!(hits(&server).await, 1);
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_timeouts_are_retried() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fast"))
        .mount(&server)
        .await;

    let options = RequestOptions::new().with_timeout_ms(100).with_max_retry(1);
    let body = fetchkit::get(server.uri(), options)
        .await
        .expect("second attempt should succeed");
    assert_eq!(body, "fast");
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_connection_refused_is_retried_and_surfaced() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0");
        match listener {
            Ok(listener) => listener.local_addr().expect("addr").port(),
            Err(_) => return,
        }
    };

    let options = RequestOptions::new().with_max_retry(2).with_timeout_ms(2_000);
    let err = fetchkit::get(format!("http://127.0.0.1:{}/", port), options)
        .await
        .expect_err("nothing listens on the port");
    assert!(matches!(err, FetchError::Transport(_)));
}
