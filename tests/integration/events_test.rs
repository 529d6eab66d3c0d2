//! Integration tests for the server-sent event stream.

use std::time::Duration;

use axum::body::BodyDataStream;
use axum::http::StatusCode;
use axum::http::header::{CONTENT_TYPE, SET_COOKIE};
use futures::StreamExt;
use serde_json::{Value, json};

use crate::helpers::TestApp;

/// Splits an SSE body into `(event name, JSON data)` pairs.
struct EventReader {
    body: BodyDataStream,
    buf: String,
}

impl EventReader {
    fn new(body: BodyDataStream) -> Self {
        Self {
            body,
            buf: String::new(),
        }
    }

    async fn next_event(&mut self) -> Option<(String, Value)> {
        loop {
            if let Some(end) = self.buf.find("\n\n") {
                let frame: String = self.buf.drain(..end + 2).collect();
                let mut name = None;
                let mut data = String::new();
                for line in frame.lines() {
                    if let Some(value) = line.strip_prefix("event:") {
                        name = Some(value.trim_start().to_string());
                    } else if let Some(value) = line.strip_prefix("data:") {
                        data.push_str(value.trim_start());
                    }
                }
                if let Some(name) = name {
                    return Some((name, serde_json::from_str(&data).ok()?));
                }
                continue;
            }

            let chunk = self.body.next().await?.ok()?;
            self.buf.push_str(&String::from_utf8_lossy(&chunk));
        }
    }

    async fn expect_event(&mut self) -> (String, Value) {
        tokio::time::timeout(Duration::from_secs(2), self.next_event())
            .await
            .expect("Timed out waiting for an event")
            .expect("Stream ended")
    }

    async fn expect_silence(&mut self) {
        let next = tokio::time::timeout(Duration::from_millis(100), self.next_event()).await;
        assert!(next.is_err(), "Unexpected event: {next:?}");
    }
}

/// Open a stream and return the reader plus the `ecid=<id>` cookie.
async fn open_stream(app: &TestApp, token: &str) -> (EventReader, String) {
    let response = app.raw("GET", "/api/v1/events", Some(token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers()[CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));

    let cookie = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("ecid="))
        .expect("ecid cookie");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=31536000"));
    let cookie = cookie.split(';').next().unwrap().to_string();

    (EventReader::new(response.into_body().into_data_stream()), cookie)
}

fn broker_body(name: &str) -> Value {
    json!({
        "name": name,
        "server": "mqtt.example.com",
        "port": 1883,
        "keepAlive": 60,
        "icon": { "name": "server", "backgroundColor": "#000000" },
        "isSsl": false
    })
}

#[tokio::test]
async fn test_stream_requires_access_token() {
    let app = TestApp::new();
    let response = app.raw("GET", "/api/v1/events", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_broker_creation_is_streamed() {
    let app = TestApp::new();
    let session = app.sign_up("stream@example.com").await;
    let (mut events, _cookie) = open_stream(&app, &session.access).await;

    let created = app
        .request("POST", "/api/v1/brokers", Some(broker_body("Home")), Some(&session.access))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let (name, data) = events.expect_event().await;
    assert_eq!(name, "ENTITY_CREATED");
    assert_eq!(data["data"]["action"], "ENTITY_CREATED");
    assert_eq!(data["data"]["entity"]["name"], "BROKERS");
    assert_eq!(data["data"]["entity"]["id"], created.body["id"]);
    events.expect_silence().await;
}

#[tokio::test]
async fn test_broadcast_reaches_every_channel_of_the_user_only() {
    let app = TestApp::new();
    let owner = app.sign_up("owner@example.com").await;
    let other = app.sign_up("other@example.com").await;

    let (mut first, _) = open_stream(&app, &owner.access).await;
    let (mut second, _) = open_stream(&app, &owner.access).await;
    let (mut foreign, _) = open_stream(&app, &other.access).await;

    let response = app
        .request(
            "PATCH",
            "/api/v1/users/me",
            Some(json!({ "theme": "dark" })),
            Some(&owner.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    for events in [&mut first, &mut second] {
        let (name, data) = events.expect_event().await;
        assert_eq!(name, "ENTITY_UPDATED");
        assert_eq!(data["data"]["entity"]["name"], "USER");
        events.expect_silence().await;
    }
    foreign.expect_silence().await;
}

#[tokio::test]
async fn test_logout_closes_only_the_calling_channel() {
    let app = TestApp::new();
    let session = app.sign_up("logout@example.com").await;

    let (mut closing, cookie) = open_stream(&app, &session.access).await;
    let (mut staying, _) = open_stream(&app, &session.access).await;

    let response = app
        .request_with_cookie(
            "POST",
            "/api/v1/users/logout",
            None,
            Some(&session.access),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let (name, _) = closing.expect_event().await;
    assert_eq!(name, "CHANNEL_CLOSED");
    let end = tokio::time::timeout(Duration::from_secs(2), closing.next_event())
        .await
        .expect("Stream did not end");
    assert!(end.is_none());

    staying.expect_silence().await;
}

#[tokio::test]
async fn test_control_event_relates_device_and_broker() {
    let app = TestApp::new();
    let session = app.sign_up("controls@example.com").await;

    let broker = app
        .request("POST", "/api/v1/brokers", Some(broker_body("Garage")), Some(&session.access))
        .await;
    let broker_id = broker.body["id"].clone();
    let device = app
        .request(
            "POST",
            "/api/v1/devices",
            Some(json!({
                "brokerId": broker_id,
                "name": "Door",
                "icon": { "name": "door", "backgroundColor": "#112233" }
            })),
            Some(&session.access),
        )
        .await;
    assert_eq!(device.status, StatusCode::CREATED);
    let device_id = device.body["id"].as_str().unwrap().to_string();

    let (mut events, _) = open_stream(&app, &session.access).await;

    let control = app
        .request(
            "POST",
            &format!("/api/v1/devices/{device_id}/controls"),
            Some(json!({
                "name": "Open",
                "type": "button",
                "topic": "garage/door",
                "icon": { "name": "open", "backgroundColor": "#ffffff" },
                "isConfirmationRequired": true,
                "isAvailable": true,
                "canNotifyOnPublish": false,
                "canDisplayName": true
            })),
            Some(&session.access),
        )
        .await;
    assert_eq!(control.status, StatusCode::CREATED);

    let (name, data) = events.expect_event().await;
    assert_eq!(name, "ENTITY_CREATED");
    assert_eq!(data["data"]["entity"]["name"], "DEVICE_CONTROLS");
    assert_eq!(data["data"]["entity"]["id"], device_id.as_str());
    assert_eq!(data["data"]["related"][0]["name"], "DEVICES");
    assert_eq!(data["data"]["related"][1]["name"], "BROKERS");
    assert_eq!(data["data"]["related"][1]["id"], broker_id);
}
