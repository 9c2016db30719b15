use rusty_book_catalog::adapters::http::HttpRatingClient;
use rusty_book_catalog::domain::BookId;
use rusty_book_catalog::ports::{RatingService, RatingServiceError, RatingSubmission};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, timeout: Duration) -> HttpRatingClient {
    HttpRatingClient::new(server.uri(), timeout).expect("client should build")
}

#[tokio::test]
async fn test_fetch_average() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ratings/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "average": 4.5 })))
        .expect(1)
        .mount(&server)
        .await;

    let average = client(&server, Duration::from_secs(2))
        .fetch_average(BookId::from_i64(7))
        .await
        .unwrap();

    assert_eq!(average, 4.5);
}

#[tokio::test]
async fn test_fetch_average_with_trailing_slash_in_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ratings/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "average": 3.0 })))
        .mount(&server)
        .await;

    let client =
        HttpRatingClient::new(format!("{}/", server.uri()), Duration::from_secs(2)).unwrap();

    assert_eq!(client.fetch_average(BookId::from_i64(7)).await.unwrap(), 3.0);
}

#[tokio::test]
async fn test_fetch_average_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ratings/7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client(&server, Duration::from_secs(2))
        .fetch_average(BookId::from_i64(7))
        .await;

    assert!(matches!(result, Err(RatingServiceError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_fetch_average_missing_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ratings/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 2 })))
        .mount(&server)
        .await;

    let result = client(&server, Duration::from_secs(2))
        .fetch_average(BookId::from_i64(7))
        .await;

    assert!(matches!(result, Err(RatingServiceError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_fetch_average_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ratings/7"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client(&server, Duration::from_secs(2))
        .fetch_average(BookId::from_i64(7))
        .await;

    assert!(matches!(result, Err(RatingServiceError::UnexpectedStatus(500))));
}

#[tokio::test]
async fn test_fetch_average_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ratings/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "average": 4.5 }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let timeout = Duration::from_millis(100);
    let started = std::time::Instant::now();
    let result = client(&server, timeout)
        .fetch_average(BookId::from_i64(7))
        .await;

    assert!(matches!(result, Err(RatingServiceError::Timeout(d)) if d == timeout));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_unreachable_service() {
    // 何も待ち受けていないポート
    let client =
        HttpRatingClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();

    let result = client.fetch_average(BookId::from_i64(1)).await;

    assert!(matches!(
        result,
        Err(RatingServiceError::Request(_)) | Err(RatingServiceError::Timeout(_))
    ));
}

#[tokio::test]
async fn test_submit_rating_sends_encoded_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ratings/7"))
        .and(query_param("value", "5"))
        .and(query_param("email", "reader+books@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let submission = RatingSubmission {
        value: "5".to_string(),
        email: "reader+books@example.com".to_string(),
    };
    let ack = client(&server, Duration::from_secs(2))
        .submit_rating(BookId::from_i64(7), &submission)
        .await
        .unwrap();

    assert_eq!(ack, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_submit_rating_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ratings/7"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client(&server, Duration::from_secs(2))
        .submit_rating(BookId::from_i64(7), &RatingSubmission::default())
        .await;

    assert!(matches!(result, Err(RatingServiceError::UnexpectedStatus(503))));
}
