#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use govly_api::{ApiClient, CapabilityCommand, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let key: secrecy::SecretString = "test-api-key".to_string().into();
    let client = ApiClient::new(&server.uri(), &key, Duration::from_secs(5)).unwrap();
    (server, client)
}

fn devices_envelope() -> serde_json::Value {
    json!({
        "code": 200,
        "message": "success",
        "data": [{
            "device": "14:09:D0:C9:07:9B:33:27",
            "sku": "H7141",
            "type": "devices.types.humidifier",
            "deviceName": "Office Humidifier",
            "capabilities": [
                {"type": "devices.capabilities.on_off", "instance": "powerSwitch",
                 "parameters": {"dataType": "ENUM",
                     "options": [{"name": "on", "value": 1}, {"name": "off", "value": 0}]}}
            ]
        }]
    })
}

// ── Auth header / device listing ────────────────────────────────────

#[tokio::test]
async fn list_devices_sends_api_key_header() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/user/devices"))
        .and(header("Govee-API-Key", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(devices_envelope()))
        .mount(&server)
        .await;

    let devices = client.list_devices().await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].sku, "H7141");
    assert_eq!(devices[0].device_name.as_deref(), Some("Office Humidifier"));
    assert_eq!(devices[0].capabilities.len(), 1);
}

// ── Error classification ────────────────────────────────────────────

#[tokio::test]
async fn unauthorized_classifies_as_unauthenticated() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/user/devices"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_devices().await;
    assert!(
        matches!(result, Err(Error::Unauthenticated)),
        "expected Unauthenticated, got: {result:?}"
    );
}

#[tokio::test]
async fn too_many_requests_classifies_as_rate_limited() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/device/state"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let result = client.device_state("H7141", "14:09:D0:C9:07:9B:33:27").await;
    assert!(
        matches!(result, Err(Error::RateLimited)),
        "expected RateLimited, got: {result:?}"
    );
}

#[tokio::test]
async fn server_error_classifies_as_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/user/devices"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    match client.list_devices().await {
        Err(Error::Api { status: 500, ref message }) => {
            assert!(message.contains("internal error"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── Device state ────────────────────────────────────────────────────

#[tokio::test]
async fn device_state_posts_request_id_and_unwraps_payload() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/device/state"))
        .and(body_partial_json(json!({
            "payload": {"sku": "H7141", "device": "dev-1"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": "req-1",
            "code": 200,
            "msg": "success",
            "payload": {
                "sku": "H7141",
                "device": "dev-1",
                "capabilities": [
                    {"type": "devices.capabilities.on_off", "instance": "powerSwitch",
                     "state": {"value": 1}},
                    {"type": "devices.capabilities.range", "instance": "humidity",
                     "state": {"value": 45}}
                ]
            }
        })))
        .mount(&server)
        .await;

    let state = client.device_state("H7141", "dev-1").await.unwrap();

    assert_eq!(state.capabilities.len(), 2);
    assert_eq!(state.capabilities[1].instance, "humidity");
    assert_eq!(state.capabilities[1].state, Some(json!({"value": 45})));
}

// ── Control ─────────────────────────────────────────────────────────

#[tokio::test]
async fn control_sends_single_command_as_bare_object() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/device/control"))
        .and(body_partial_json(json!({
            "payload": {
                "sku": "H7141",
                "device": "dev-1",
                "capability": {
                    "type": "devices.capabilities.on_off",
                    "instance": "powerSwitch",
                    "value": 1
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": "req-2",
            "code": 200,
            "msg": "success",
            "capability": {
                "type": "devices.capabilities.on_off",
                "instance": "powerSwitch",
                "value": 1
            }
        })))
        .mount(&server)
        .await;

    let echo = client
        .control(
            "H7141",
            "dev-1",
            vec![CapabilityCommand {
                kind: "devices.capabilities.on_off".into(),
                instance: "powerSwitch".into(),
                value: json!(1),
            }],
        )
        .await
        .unwrap();

    assert_eq!(echo.len(), 1);
    assert_eq!(echo[0].instance, "powerSwitch");
    assert_eq!(echo[0].value, Some(json!(1)));
}

#[tokio::test]
async fn control_sends_command_list_in_one_request() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/device/control"))
        .and(body_partial_json(json!({
            "payload": {
                "capability": [
                    {"type": "devices.capabilities.range", "instance": "brightness", "value": 50},
                    {"type": "devices.capabilities.on_off", "instance": "powerSwitch", "value": 1}
                ]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": "req-3",
            "capability": [
                {"type": "devices.capabilities.range", "instance": "brightness", "value": 50},
                {"type": "devices.capabilities.on_off", "instance": "powerSwitch", "value": 1}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let echo = client
        .control(
            "H6008",
            "dev-2",
            vec![
                CapabilityCommand {
                    kind: "devices.capabilities.range".into(),
                    instance: "brightness".into(),
                    value: json!(50),
                },
                CapabilityCommand {
                    kind: "devices.capabilities.on_off".into(),
                    instance: "powerSwitch".into(),
                    value: json!(1),
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(echo.len(), 2);
}

#[tokio::test]
async fn control_without_echo_returns_empty() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/device/control"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": "req-4",
            "code": 200,
            "msg": "success"
        })))
        .mount(&server)
        .await;

    let echo = client
        .control(
            "H7141",
            "dev-1",
            vec![CapabilityCommand {
                kind: "devices.capabilities.on_off".into(),
                instance: "powerSwitch".into(),
                value: json!(0),
            }],
        )
        .await
        .unwrap();

    assert!(echo.is_empty());
}

// ── Scenes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn list_scenes_passes_sku_and_device_params() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/device/scenes"))
        .and(query_param("sku", "H6008"))
        .and(query_param("device", "dev-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "message": "success",
            "data": {
                "capabilities": [{
                    "type": "devices.capabilities.dynamic_scene",
                    "instance": "lightScene",
                    "parameters": {"dataType": "ENUM", "options": [
                        {"name": "Cozy", "value": {"id": 6114, "paramId": 4126}}
                    ]}
                }]
            }
        })))
        .mount(&server)
        .await;

    let scenes = client.list_scenes("H6008", "dev-2").await.unwrap();
    assert_eq!(scenes.capabilities.len(), 1);
    assert_eq!(scenes.capabilities[0].instance, "lightScene");
}

// ── Event subscription ──────────────────────────────────────────────

#[tokio::test]
async fn subscribe_events_posts_device_ref() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/device/event/subscribe"))
        .and(body_partial_json(json!({
            "payload": {"device": "dev-1", "sku": "H7141"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": "req-5",
            "code": 200,
            "msg": "success"
        })))
        .expect(1)
        .mount(&server)
        .await;

    client.subscribe_events("H7141", "dev-1").await.unwrap();
}

// ── Request counter ─────────────────────────────────────────────────

#[tokio::test]
async fn request_counter_increments_per_call() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/user/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(devices_envelope()))
        .mount(&server)
        .await;

    assert_eq!(client.requests_today(), 0);
    client.list_devices().await.unwrap();
    client.list_devices().await.unwrap();
    assert_eq!(client.requests_today(), 2);
}

#[tokio::test]
async fn failed_requests_still_count() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/user/devices"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let _ = client.list_devices().await;
    assert_eq!(client.requests_today(), 1);
}
