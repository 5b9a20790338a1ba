use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use chrono::Duration;
use std::net::TcpListener;
use std::sync::Arc;

use crate::accounts::AccountService;
use crate::auth::{CredentialHasher, TokenCodec};
use crate::configuration::Settings;
use crate::email_client::MailSender;
use crate::logger::LoggerMiddleware;
use crate::middleware::BearerAuth;
use crate::restore::{RestoreOrchestrator, RestoreSessionTable, SessionSweeper, SweeperHandle};
use crate::routes::{
    code_valid, health_check, json_error_handler, login, restore, signup, token_valid, whoami,
};
use crate::user_store::UserStore;

/// Largest accepted JSON body, in bytes
const MAX_JSON_PAYLOAD: usize = 4 * 1024;

/// Process-wide components, built once at startup and shared by every
/// worker.
#[derive(Clone)]
pub struct Services {
    pub codec: Arc<TokenCodec>,
    pub sessions: Arc<RestoreSessionTable>,
    pub accounts: Arc<AccountService>,
    pub orchestrator: Arc<RestoreOrchestrator>,
}

impl Services {
    pub fn build(
        settings: &Settings,
        store: Arc<dyn UserStore>,
        mailer: Arc<dyn MailSender>,
    ) -> Self {
        let codec = Arc::new(TokenCodec::new(&settings.jwt));
        let hasher = CredentialHasher::new(settings.application.hash_cost);
        let sessions = Arc::new(RestoreSessionTable::new(Duration::seconds(
            settings.restore.session_ttl_seconds,
        )));

        let accounts = Arc::new(AccountService::new(
            Arc::clone(&codec),
            Arc::clone(&store),
            hasher,
        ));
        let orchestrator = Arc::new(RestoreOrchestrator::new(
            Arc::clone(&codec),
            store,
            mailer,
            Arc::clone(&sessions),
            hasher,
            settings.restore.code_length,
        ));

        Self {
            codec,
            sessions,
            accounts,
            orchestrator,
        }
    }

    /// Start the background sweeper for this instance's session table.
    pub fn spawn_sweeper(&self, settings: &Settings) -> SweeperHandle {
        SessionSweeper::spawn(
            Arc::clone(&self.sessions),
            std::time::Duration::from_secs(settings.restore.sweep_interval_seconds),
        )
    }
}

pub fn run(listener: TcpListener, services: Services) -> Result<Server, std::io::Error> {
    let accounts = web::Data::from(services.accounts);
    let orchestrator = web::Data::from(services.orchestrator);
    let codec = services.codec;

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(
                web::JsonConfig::default()
                    .limit(MAX_JSON_PAYLOAD)
                    .error_handler(json_error_handler),
            )
            .app_data(accounts.clone())
            .app_data(orchestrator.clone())

            // Public routes
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    .route("/login", web::post().to(login))
                    .route("/signup", web::post().to(signup))
                    .route("/restore", web::put().to(restore))
                    .route("/restore/valid", web::post().to(code_valid))
                    .route("/valid", web::post().to(token_valid)),
            )

            // Protected routes (require a bearer token)
            .service(
                web::scope("/api")
                    .wrap(BearerAuth::new(Arc::clone(&codec)))
                    .route("/me", web::get().to(whoami)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
