pub mod accounts;
pub mod auth;
pub mod configuration;
pub mod email_client;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod restore;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod user_store;
pub mod validators;
