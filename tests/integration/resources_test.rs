//! Integration tests for brokers, devices and device controls.

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::helpers::{Session, TestApp};

fn broker_body() -> Value {
    json!({
        "name": "Home",
        "server": "mqtt.example.com",
        "port": 8883,
        "keepAlive": 30,
        "icon": { "name": "home", "backgroundColor": "#336699" },
        "isSsl": true,
        "clientId": "dash-1"
    })
}

fn control_body(control_type: &str) -> Value {
    json!({
        "name": "Status",
        "type": control_type,
        "topic": "home/status",
        "icon": { "name": "info", "backgroundColor": "#000000" },
        "qualityOfService": 1,
        "attributes": { "onPayload": "ON", "offPayload": "OFF" },
        "isConfirmationRequired": false,
        "isAvailable": true,
        "canNotifyOnPublish": true,
        "canDisplayName": true
    })
}

async fn create(app: &TestApp, session: &Session, path: &str, body: Value) -> String {
    let response = app.request("POST", path, Some(body), Some(&session.access)).await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_broker_crud() {
    let app = TestApp::new();
    let session = app.sign_up("brokers@example.com").await;
    let id = create(&app, &session, "/api/v1/brokers", broker_body()).await;

    let response = app
        .request("GET", &format!("/api/v1/brokers/{id}"), None, Some(&session.access))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["port"], 8883);
    assert_eq!(response.body["icon"]["backgroundColor"], "#336699");
    assert_eq!(response.body["clientId"], "dash-1");
    assert!(response.body.get("password").is_none());

    let response = app
        .request(
            "PATCH",
            &format!("/api/v1/brokers/{id}"),
            Some(json!({ "name": "Cabin", "clientId": null })),
            Some(&session.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .request("GET", "/api/v1/brokers", None, Some(&session.access))
        .await;
    let brokers = response.body.as_array().unwrap();
    assert_eq!(brokers.len(), 1);
    assert_eq!(brokers[0]["name"], "Cabin");
    assert!(brokers[0]["clientId"].is_null());

    let response = app
        .request("DELETE", &format!("/api/v1/brokers/{id}"), None, Some(&session.access))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .request("GET", &format!("/api/v1/brokers/{id}"), None, Some(&session.access))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "broker not found");
}

#[tokio::test]
async fn test_broker_credentials_round_trip() {
    let app = TestApp::new();
    let session = app.sign_up("creds@example.com").await;
    let id = create(&app, &session, "/api/v1/brokers", broker_body()).await;
    let path = format!("/api/v1/brokers/{id}/credentials");

    let response = app
        .request("PUT", &path, Some(json!({ "username": "mqtt" })), Some(&session.access))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        "both username and password have to be provided"
    );

    let response = app
        .request(
            "PUT",
            &path,
            Some(json!({ "username": "mqtt", "password": "s3cret" })),
            Some(&session.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.request("GET", &path, None, Some(&session.access)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], "mqtt");
    assert_eq!(response.body["password"], "s3cret");
}

#[tokio::test]
async fn test_brokers_are_private() {
    let app = TestApp::new();
    let owner = app.sign_up("private-owner@example.com").await;
    let intruder = app.sign_up("intruder@example.com").await;
    let id = create(&app, &owner, "/api/v1/brokers", broker_body()).await;

    let response = app
        .request("GET", &format!("/api/v1/brokers/{id}"), None, Some(&intruder.access))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request("GET", "/api/v1/brokers", None, Some(&intruder.access))
        .await;
    assert_eq!(response.body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_malformed_id_is_a_bad_request() {
    let app = TestApp::new();
    let session = app.sign_up("badid@example.com").await;
    let response = app
        .request("GET", "/api/v1/devices/not-a-uuid", None, Some(&session.access))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_device_must_use_own_broker() {
    let app = TestApp::new();
    let owner = app.sign_up("dev-owner@example.com").await;
    let other = app.sign_up("dev-other@example.com").await;
    let foreign_broker = create(&app, &other, "/api/v1/brokers", broker_body()).await;

    let response = app
        .request(
            "POST",
            "/api/v1/devices",
            Some(json!({
                "brokerId": foreign_broker,
                "name": "Lamp",
                "icon": { "name": "lamp", "backgroundColor": "#ffee00" }
            })),
            Some(&owner.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "broker not found");
}

#[tokio::test]
async fn test_devices_filter_by_broker_and_detach() {
    let app = TestApp::new();
    let session = app.sign_up("devices@example.com").await;
    let broker = create(&app, &session, "/api/v1/brokers", broker_body()).await;

    let attached = create(
        &app,
        &session,
        "/api/v1/devices",
        json!({
            "brokerId": broker,
            "name": "Thermostat",
            "icon": { "name": "thermo", "backgroundColor": "#ff0000" },
            "placing": "Hall"
        }),
    )
    .await;
    create(
        &app,
        &session,
        "/api/v1/devices",
        json!({
            "name": "Loose",
            "icon": { "name": "plug", "backgroundColor": "#00ff00" }
        }),
    )
    .await;

    let response = app
        .request(
            "GET",
            &format!("/api/v1/devices?brokerId={broker}"),
            None,
            Some(&session.access),
        )
        .await;
    let devices = response.body.as_array().unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0]["id"], attached.as_str());
    assert_eq!(devices[0]["placing"], "Hall");

    let response = app
        .request(
            "PATCH",
            &format!("/api/v1/devices/{attached}"),
            Some(json!({ "brokerId": null, "placing": null })),
            Some(&session.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .request(
            "GET",
            &format!("/api/v1/devices/{attached}"),
            None,
            Some(&session.access),
        )
        .await;
    assert!(response.body["brokerId"].is_null());
    assert!(response.body["placing"].is_null());

    let response = app
        .request("GET", "/api/v1/devices", None, Some(&session.access))
        .await;
    assert_eq!(response.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_single_state_control_per_device() {
    let app = TestApp::new();
    let session = app.sign_up("state@example.com").await;
    let device = create(
        &app,
        &session,
        "/api/v1/devices",
        json!({ "name": "Gate", "icon": { "name": "gate", "backgroundColor": "#123456" } }),
    )
    .await;
    let controls = format!("/api/v1/devices/{device}/controls");

    let state = create(&app, &session, &controls, control_body("state")).await;
    let switch = create(&app, &session, &controls, control_body("switch")).await;

    let response = app
        .request("POST", &controls, Some(control_body("state")), Some(&session.access))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["message"], "device already has a state control");

    let response = app
        .request(
            "PATCH",
            &format!("{controls}/{switch}"),
            Some(json!({ "type": "state" })),
            Some(&session.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = app
        .request(
            "PATCH",
            &format!("{controls}/{state}"),
            Some(json!({ "type": "state", "name": "Gate state" })),
            Some(&session.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.request("GET", &controls, None, Some(&session.access)).await;
    let list = response.body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    let state_control = list.iter().find(|c| c["id"] == state.as_str()).unwrap();
    assert_eq!(state_control["name"], "Gate state");
    assert_eq!(state_control["qualityOfService"], 1);
    assert_eq!(state_control["attributes"]["onPayload"], "ON");

    let response = app
        .request(
            "DELETE",
            &format!("{controls}/{switch}"),
            None,
            Some(&session.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_controls_of_foreign_device_are_hidden() {
    let app = TestApp::new();
    let owner = app.sign_up("ctl-owner@example.com").await;
    let other = app.sign_up("ctl-other@example.com").await;
    let device = create(
        &app,
        &owner,
        "/api/v1/devices",
        json!({ "name": "Fan", "icon": { "name": "fan", "backgroundColor": "#abcdef" } }),
    )
    .await;

    let response = app
        .request(
            "GET",
            &format!("/api/v1/devices/{device}/controls"),
            None,
            Some(&other.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "device not found");
}
