use std::time::Duration;

use restsync_engine::{FailureKind, Method, ReqwestTransport, Transport, TransportSettings};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn post_sends_json_and_parses_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chocolates"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "Dark", "cocoaPercentage": 70})))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"id": 5, "name": "Dark", "cocoaPercentage": 70})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(TransportSettings::default()).expect("client");
    let url = format!("{}/chocolates", server.uri());
    let body = json!({"name": "Dark", "cocoaPercentage": 70});

    let response = transport
        .request(Method::Post, &url, Some(&body))
        .await
        .expect("request ok");
    assert_eq!(response.status, 201);
    assert!(response.is_success());
    assert_eq!(
        response.body,
        Some(json!({"id": 5, "name": "Dark", "cocoaPercentage": 70}))
    );
}

#[tokio::test]
async fn non_success_status_is_a_response_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/chocolates/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such chocolate"))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(TransportSettings::default()).expect("client");
    let url = format!("{}/chocolates/9", server.uri());

    let response = transport
        .request(Method::Delete, &url, None)
        .await
        .expect("request ok");
    assert_eq!(response.status, 404);
    assert_eq!(response.body, None);
    let err = response.into_success_body().unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!([])),
        )
        .mount(&server)
        .await;

    let settings = TransportSettings {
        request_timeout: Duration::from_millis(50),
        ..TransportSettings::default()
    };
    let transport = ReqwestTransport::new(settings).expect("client");
    let url = format!("{}/slow", server.uri());

    let err = transport.request(Method::Get, &url, None).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
    assert!(err.is_transport_failure());
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/json")
                .set_body_string("[1,2,3,4,5]"),
        )
        .mount(&server)
        .await;

    let settings = TransportSettings {
        max_bytes: 10,
        ..TransportSettings::default()
    };
    let transport = ReqwestTransport::new(settings).expect("client");
    let url = format!("{}/large", server.uri());

    let err = transport.request(Method::Get, &url, None).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn unparsable_url_is_rejected_before_sending() {
    let transport = ReqwestTransport::new(TransportSettings::default()).expect("client");
    let err = transport
        .request(Method::Get, "::not a url::", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn oversized_error_page_keeps_its_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(502).set_body_string("x".repeat(64)))
        .mount(&server)
        .await;

    let settings = TransportSettings {
        max_bytes: 10,
        ..TransportSettings::default()
    };
    let transport = ReqwestTransport::new(settings).expect("client");
    let url = format!("{}/broken", server.uri());

    let response = transport
        .request(Method::Get, &url, None)
        .await
        .expect("status reported");
    assert_eq!(response.status, 502);
    assert_eq!(response.body, None);
    let err = response.into_success_body().unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(502));
    assert!(!err.is_transport_failure());
}
