use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;

use keyward::configuration::{get_configuration, Settings};
use keyward::email_client::{EmailClient, LogMailSender, MailSender};
use keyward::startup::{run, Services};
use keyward::telemetry::init_telemetry;
use keyward::user_store::{InMemoryUserStore, PgUserStore, UserStore};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    if let Err(e) = configuration.validate() {
        tracing::error!("Invalid configuration: {}", e);
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Configuration error",
        ));
    }

    let store = build_user_store(&configuration).await?;
    let mailer = build_mail_sender(&configuration)?;

    let services = Services::build(&configuration, store, mailer);
    let sweeper = services.spawn_sweeper(&configuration);

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, services)?;
    let result = server.await;

    sweeper.shutdown().await;
    tracing::info!("Server stopped");

    result
}

async fn build_user_store(configuration: &Settings) -> std::io::Result<Arc<dyn UserStore>> {
    let Some(database) = &configuration.database else {
        tracing::warn!("No database configured, using in-memory user store");
        return Ok(Arc::new(InMemoryUserStore::new()));
    };

    tracing::info!("Attempting to connect to database");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run migrations: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "Database migration error")
    })?;

    tracing::info!("Database connection pool created successfully");
    Ok(Arc::new(PgUserStore::new(pool)))
}

fn build_mail_sender(configuration: &Settings) -> std::io::Result<Arc<dyn MailSender>> {
    let Some(email) = &configuration.email else {
        tracing::warn!("No email service configured, restore mail will only be logged");
        return Ok(Arc::new(LogMailSender));
    };

    let client = EmailClient::from_settings(email).map_err(|e| {
        tracing::error!("Failed to build email client: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Email configuration error")
    })?;

    Ok(Arc::new(client))
}
