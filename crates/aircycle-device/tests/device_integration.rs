//! Integration tests for DeviceApiClient using wiremock.
//!
//! These exercise the public client surface against a mock vendor cloud.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use aircycle_core::DeviceConfig;
use aircycle_device::{DeviceApiClient, DeviceError, PropertyName};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DSN: &str = "AC000W000000042";

fn device_config(base: &str) -> DeviceConfig {
    DeviceConfig {
        username: "user@example.com".to_string(),
        password: "secret".to_string(),
        app_id: "app".to_string(),
        app_secret: "shh".to_string(),
        dsn: DSN.to_string(),
        user_base_url: base.to_string(),
        ads_base_url: base.to_string(),
        request_timeout_secs: 5,
    }
}

async fn mount_sign_in(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/users/sign_in.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok",
            "refresh_token": "ref",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_cycle_against_mock_cloud() {
    let mock_server = MockServer::start().await;
    mount_sign_in(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(format!("/apiv1/dsns/{}/properties.json", DSN)))
        .and(header("Authorization", "auth_token tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"property": {"name": "t_fan_vertical", "value": 7}},
            {"property": {"name": "t_temp", "value": 20}}
        ])))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!(
            "/apiv1/dsns/{}/properties/t_fan_vertical/datapoints.json",
            DSN
        )))
        .and(body_json(serde_json::json!({"datapoint": {"value": 8}})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!(
            "/apiv1/dsns/{}/properties/t_temp/datapoints.json",
            DSN
        )))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = DeviceApiClient::new(device_config(&mock_server.uri())).unwrap();

    client.login().await.unwrap();
    assert_eq!(client.get_louver_position().await.unwrap(), "7");
    assert_eq!(client.get_temperature().await.unwrap(), 20.0);
    client.set_louver_position("8").await.unwrap();
    assert_eq!(
        client.set_temperature(24.0).await.unwrap(),
        PropertyName::TargetTemperature
    );
}

#[tokio::test]
async fn test_auth_failure_during_setpoint_write_is_not_masked() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/sign_in.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok",
            "expires_in": 3600
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!(
            "/apiv1/dsns/{}/properties/t_temp/datapoints.json",
            DSN
        )))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&mock_server)
        .await;

    let mut client = DeviceApiClient::new(device_config(&mock_server.uri())).unwrap();
    let result = client.set_temperature(24.0).await;

    assert!(matches!(result, Err(DeviceError::Authentication(_))));
}

#[tokio::test]
async fn test_unreachable_cloud_is_network_error() {
    // Nothing listens on port 9 on loopback.
    let mut client = DeviceApiClient::new(device_config("http://127.0.0.1:9")).unwrap();
    let result = client.login().await;

    assert!(matches!(result, Err(DeviceError::Network(_))));
}
