/*
 * vRelay HTTP to SMTP relay gateway
 * Copyright (C) 2023 viridIT SAS
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or any later version.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT
 * ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
 * FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * this program. If not, see https://www.gnu.org/licenses/.
 *
*/

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use pretty_assertions::assert_eq;
use tower::ServiceExt;
use vrelay_config::Config;
use vrelay_delivery::{DeliveryOutcome, Transport, TransportError};
use vrelay_server::{router, AppState};

/// Records what would have gone on the wire instead of dialing a relay.
struct StubTransport {
    outcome: fn(usize) -> Result<DeliveryOutcome, TransportError>,
    sent: std::sync::Mutex<Vec<(lettre::address::Envelope, Vec<u8>)>>,
}

impl StubTransport {
    fn accepting() -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self {
            outcome: |count| Ok(DeliveryOutcome::accepted(count)),
            sent: std::sync::Mutex::new(vec![]),
        })
    }

    fn failing(outcome: fn(usize) -> Result<DeliveryOutcome, TransportError>) -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self {
            outcome,
            sent: std::sync::Mutex::new(vec![]),
        })
    }
}

#[async_trait::async_trait]
impl Transport for StubTransport {
    async fn send(
        &self,
        envelope: &lettre::address::Envelope,
        message: &[u8],
    ) -> Result<DeliveryOutcome, TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((envelope.clone(), message.to_vec()));
        (self.outcome)(envelope.to().len())
    }
}

fn app(transport: std::sync::Arc<StubTransport>) -> axum::Router {
    router(AppState::new(Config::default(), transport))
}

fn post(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/sparkpost/api/v1/transmissions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn valid_request() -> serde_json::Value {
    serde_json::json!({
        "recipients": [
            {"address": "b@example.com"},
            {"address": {"email": "hidden@example.com", "header_to": "b@example.com"}}
        ],
        "content": {
            "from": {"email": "a@example.com", "name": "Alice"},
            "subject": "Hello",
            "text": "plain body",
            "html": "<p>html body</p>"
        }
    })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn accepted_transmission_reports_every_recipient() {
    let transport = StubTransport::accepting();
    let response = app(transport.clone()).oneshot(post(valid_request())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["results"]["total_accepted_recipients"], 2);
    assert_eq!(body["results"]["total_rejected_recipients"], 0);
    assert!(!body["results"]["id"].as_str().unwrap().is_empty());

    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (envelope, wire) = &sent[0];

    // the hidden recipient is on the envelope but never in the headers
    let rcpt: Vec<_> = envelope.to().iter().map(ToString::to_string).collect();
    assert_eq!(rcpt, ["b@example.com", "hidden@example.com"]);
    let wire = String::from_utf8(wire.clone()).unwrap();
    assert!(wire.contains("To: b@example.com\r\n"));
    assert!(!wire.contains("Bcc"));
    assert!(wire.contains("multipart/alternative"));
}

#[tokio::test]
async fn simple_text_transmission_relays_the_body_verbatim() {
    let transport = StubTransport::accepting();
    let body = serde_json::json!({
        "recipients": [{"address": "b@example.com"}],
        "content": {"from": "a@example.com", "subject": "Hi", "text": "hello"}
    });
    let response = app(transport.clone()).oneshot(post(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let sent = transport.sent.lock().unwrap();
    let (envelope, wire) = &sent[0];
    assert_eq!(envelope.from().unwrap().to_string(), "a@example.com");
    let wire = String::from_utf8(wire.clone()).unwrap();
    assert!(wire.contains("Subject: Hi\r\n"));
    assert!(wire.contains("\r\n\r\nhello\r\n"));
    assert!(!wire.contains("multipart"));
}

#[tokio::test]
async fn invalid_request_reports_every_field() {
    let body = serde_json::json!({
        "recipients": [],
        "content": {"from": "not-an-address", "subject": "Hi", "text": "x"}
    });
    let response = app(StubTransport::accepting()).oneshot(post(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    let fields: Vec<_> = errors
        .iter()
        .map(|error| error["description"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"content.from"));
    assert!(fields.contains(&"recipients"));
}

#[tokio::test]
async fn wrong_content_type_is_a_client_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/sparkpost/api/v1/transmissions")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(valid_request().to_string()))
        .unwrap();
    let response = app(StubTransport::accepting()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transient_failure_maps_to_bad_gateway() {
    let transport =
        StubTransport::failing(|_| Err(TransportError::Transient("connection refused".to_owned())));
    let response = app(transport).oneshot(post(valid_request())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["code"], "transport_transient");
}

#[tokio::test]
async fn permanent_failure_maps_to_internal_error() {
    let transport =
        StubTransport::failing(|_| Err(TransportError::Permanent("550 rejected".to_owned())));
    let response = app(transport).oneshot(post(valid_request())).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["code"], "transport_permanent");
}

#[tokio::test]
async fn nothing_is_sent_when_validation_fails() {
    let transport = StubTransport::accepting();
    let body = serde_json::json!({"recipients": [], "content": {}});
    let _response = app(transport.clone()).oneshot(post(body)).await.unwrap();
    assert!(transport.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn healthcheck_answers_get_and_head() {
    for method in ["GET", "HEAD"] {
        let request = Request::builder()
            .method(method)
            .uri("/healthcheck")
            .body(Body::empty())
            .unwrap();
        let response = app(StubTransport::accepting()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{method}");
    }
    let request = Request::builder()
        .method("GET")
        .uri("/healthcheck")
        .body(Body::empty())
        .unwrap();
    let response = app(StubTransport::accepting()).oneshot(request).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
