//! Integration tests for the keyward server

mod common;

use common::spawn_app;

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app();

    let response = app
        .client
        .get(&format!("{}/health_check", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["code"], 200);
}

#[tokio::test]
async fn health_check_does_not_expose_restore_activity() {
    let app = spawn_app();
    app.signup("john@example.com", "old-pass").await;
    app.restore(&serde_json::json!({ "email": "john@example.com" }), None)
        .await;

    let body: serde_json::Value = app
        .client
        .get(&format!("{}/health_check", app.address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    let fields: Vec<&String> = body.as_object().unwrap().keys().collect();
    assert_eq!(fields, vec!["code", "status"]);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = spawn_app();

    let response = app
        .client
        .get(&format!("{}/nope", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(404, response.status().as_u16());
}
