use async_trait::async_trait;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use keyward::configuration::{ApplicationSettings, JwtSettings, RestoreSettings, Settings};
use keyward::email_client::MailSender;
use keyward::error::EmailError;
use keyward::startup::{run, Services};
use keyward::user_store::InMemoryUserStore;

/// Captures outgoing mail so tests can read restore codes.
#[derive(Default)]
pub struct RecordingMailSender {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl MailSender for RecordingMailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub address: String,
    pub mailer: Arc<RecordingMailSender>,
    pub client: reqwest::Client,
}

pub fn test_settings() -> Settings {
    Settings {
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            hash_cost: 4,
        },
        database: None,
        jwt: JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            issuer: "keyward".to_string(),
            purpose: "auth".to_string(),
            token_expiry_seconds: 3600,
        },
        restore: RestoreSettings::default(),
        email: None,
    }
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let settings = test_settings();
    let mailer = Arc::new(RecordingMailSender::default());
    let services = Services::build(
        &settings,
        Arc::new(InMemoryUserStore::new()),
        mailer.clone(),
    );

    let server = run(listener, services).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        mailer,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub async fn post(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn restore(&self, body: &serde_json::Value, token: Option<&str>) -> reqwest::Response {
        let mut request = self
            .client
            .put(&format!("{}/auth/restore", self.address))
            .json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request.")
    }

    /// Register a user and return its bearer token.
    pub async fn signup(&self, email: &str, password: &str) -> String {
        let response = self
            .post(
                "/auth/signup",
                &serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(201, response.status().as_u16());

        let body: serde_json::Value = response.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn login_status(&self, email: &str, password: &str) -> u16 {
        self.post(
            "/auth/login",
            &serde_json::json!({ "email": email, "password": password }),
        )
        .await
        .status()
        .as_u16()
    }

    /// Code from the most recent restore mail. Delivery is asynchronous, so
    /// this polls briefly.
    pub async fn mailed_code(&self) -> String {
        for _ in 0..100 {
            if let Some((_, _, body)) = self.mailer.sent.lock().unwrap().last() {
                let line = body.lines().next().unwrap();
                return line.rsplit(' ').next().unwrap().to_string();
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("no restore mail was sent");
    }
}
