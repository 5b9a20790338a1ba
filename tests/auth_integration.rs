mod common;

use common::spawn_app;
use serde_json::{json, Value};

// --- Signup Tests ---

#[tokio::test]
async fn signup_returns_201_and_token() {
    let app = spawn_app();

    let response = app
        .post("/auth/signup", &json!({ "email": "john@example.com", "password": "SecurePass123" }))
        .await;

    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["code"], 201);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
}

#[tokio::test]
async fn signup_returns_409_for_registered_email() {
    let app = spawn_app();
    app.signup("john@example.com", "SecurePass123").await;

    let response = app
        .post("/auth/signup", &json!({ "email": "john@example.com", "password": "Other" }))
        .await;

    assert_eq!(409, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "this email is registered");
}

#[tokio::test]
async fn signup_returns_400_for_invalid_data() {
    let app = spawn_app();
    let test_cases = vec![
        (json!({ "email": "not-an-email", "password": "pw" }), "invalid email"),
        (json!({ "email": "john@example.com", "password": "" }), "empty password"),
        (json!({ "password": "pw" }), "missing email"),
        (json!({ "email": "john@example.com", "password": "x".repeat(73) }), "password too long"),
    ];

    for (body, description) in test_cases {
        let response = app.post("/auth/signup", &body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            description
        );
    }
}

#[tokio::test]
async fn malformed_json_returns_400() {
    let app = spawn_app();

    let response = app
        .client
        .post(&format!("{}/auth/signup", app.address))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

// --- Login Tests ---

#[tokio::test]
async fn login_returns_200_for_valid_credentials() {
    let app = spawn_app();
    app.signup("john@example.com", "SecurePass123").await;

    let response = app
        .post("/auth/login", &json!({ "email": "john@example.com", "password": "SecurePass123" }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["code"], 200);
}

#[tokio::test]
async fn login_returns_401_for_wrong_password_or_unknown_email() {
    let app = spawn_app();
    app.signup("john@example.com", "SecurePass123").await;

    let wrong_password = app
        .post("/auth/login", &json!({ "email": "john@example.com", "password": "nope" }))
        .await;
    let unknown_email = app
        .post("/auth/login", &json!({ "email": "jane@example.com", "password": "SecurePass123" }))
        .await;

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_email.status().as_u16());

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_email.json().await.unwrap();
    assert_eq!(a["message"], b["message"]);
}

#[tokio::test]
async fn login_returns_400_for_missing_fields() {
    let app = spawn_app();

    let response = app.post("/auth/login", &json!({ "email": "john@example.com" })).await;

    assert_eq!(400, response.status().as_u16());
}

// --- Token probe and protected routes ---

#[tokio::test]
async fn token_valid_reports_validity() {
    let app = spawn_app();
    let token = app.signup("john@example.com", "SecurePass123").await;

    let valid: Value = app
        .post("/auth/valid", &json!({ "token": token }))
        .await
        .json()
        .await
        .unwrap();
    let invalid: Value = app
        .post("/auth/valid", &json!({ "token": "garbage" }))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(valid["valid"], true);
    assert_eq!(valid["code"], 200);
    assert_eq!(invalid["valid"], false);
}

#[tokio::test]
async fn token_valid_requires_token() {
    let app = spawn_app();

    let response = app.post("/auth/valid", &json!({})).await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn me_returns_identity_for_valid_token() {
    let app = spawn_app();
    let token = app.signup("john@example.com", "SecurePass123").await;

    let response = app
        .client
        .get(&format!("{}/api/me", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "john@example.com");
    assert_eq!(body["code"], 200);
}

#[tokio::test]
async fn me_returns_401_without_valid_token() {
    let app = spawn_app();

    let missing = app
        .client
        .get(&format!("{}/api/me", app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    let invalid = app
        .client
        .get(&format!("{}/api/me", app.address))
        .bearer_auth("invalid.token.here")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, missing.status().as_u16());
    assert_eq!(401, invalid.status().as_u16());
}
