use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    /// Postgres user store; the in-memory store is used when absent
    #[serde(default)]
    pub database: Option<DatabaseSettings>,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub restore: RestoreSettings,
    /// HTTP email API; outgoing mail is only logged when absent
    #[serde(default)]
    pub email: Option<EmailSettings>,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    #[serde(default = "default_hash_cost")]
    pub hash_cost: u32,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Bearer token settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_purpose")]
    pub purpose: String,
    #[serde(default = "default_token_expiry")]
    pub token_expiry_seconds: i64, // 86400 = 24 hours
}

/// Restore session settings
#[derive(serde::Deserialize, Clone)]
pub struct RestoreSettings {
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: i64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    #[serde(default = "default_code_length")]
    pub code_length: usize,
}

impl Default for RestoreSettings {
    fn default() -> Self {
        Self {
            session_ttl_seconds: default_session_ttl(),
            sweep_interval_seconds: default_sweep_interval(),
            code_length: default_code_length(),
        }
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct EmailSettings {
    pub base_url: String,
    pub sender: String,
    #[serde(default = "default_email_timeout")]
    pub timeout_milliseconds: u64,
}

impl EmailSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

impl Settings {
    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), crate::error::ConfigError> {
        use crate::error::ConfigError::{InvalidValue, MissingRequired};

        if self.jwt.secret.is_empty() {
            return Err(MissingRequired("jwt.secret".to_string()));
        }
        if self.jwt.token_expiry_seconds <= 0 {
            return Err(InvalidValue("jwt.token_expiry_seconds must be positive".to_string()));
        }
        if !(4..=31).contains(&self.application.hash_cost) {
            return Err(InvalidValue("application.hash_cost must be in 4..=31".to_string()));
        }
        if self.restore.session_ttl_seconds <= 0 {
            return Err(InvalidValue("restore.session_ttl_seconds must be positive".to_string()));
        }
        if self.restore.sweep_interval_seconds == 0 {
            return Err(InvalidValue("restore.sweep_interval_seconds must be positive".to_string()));
        }
        if self.restore.code_length == 0 {
            return Err(InvalidValue("restore.code_length must be positive".to_string()));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_hash_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_issuer() -> String {
    "keyward".to_string()
}

fn default_purpose() -> String {
    "auth".to_string()
}

fn default_token_expiry() -> i64 {
    24 * 60 * 60
}

fn default_session_ttl() -> i64 {
    15 * 60
}

fn default_sweep_interval() -> u64 {
    5 * 60
}

fn default_code_length() -> usize {
    32
}

fn default_email_timeout() -> u64 {
    10_000
}

/// Load settings from `configuration.yaml` (optional) overlaid by `APP_*`
/// environment variables, e.g. `APP_JWT__SECRET`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_defaults() {
        let restore = RestoreSettings::default();
        assert_eq!(restore.session_ttl_seconds, 900);
        assert_eq!(restore.sweep_interval_seconds, 300);
        assert_eq!(restore.code_length, 32);
    }

    #[test]
    fn test_minimal_settings_deserialize() {
        let settings = config::Config::builder()
            .set_override("application.port", 8080_i64)
            .unwrap()
            .set_override("jwt.secret", "test-secret")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<Settings>()
            .expect("Failed to deserialize settings");

        assert_eq!(settings.application.host, "127.0.0.1");
        assert_eq!(settings.application.hash_cost, bcrypt::DEFAULT_COST);
        assert_eq!(settings.jwt.issuer, "keyward");
        assert_eq!(settings.jwt.purpose, "auth");
        assert_eq!(settings.jwt.token_expiry_seconds, 86400);
        assert!(settings.database.is_none());
        assert!(settings.email.is_none());
    }

    fn valid_settings() -> Settings {
        Settings {
            application: ApplicationSettings {
                host: default_host(),
                port: 0,
                hash_cost: 4,
            },
            database: None,
            jwt: JwtSettings {
                secret: "test-secret".to_string(),
                issuer: default_issuer(),
                purpose: default_purpose(),
                token_expiry_seconds: default_token_expiry(),
            },
            restore: RestoreSettings::default(),
            email: None,
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unusable_values() {
        let mut settings = valid_settings();
        settings.jwt.secret.clear();
        assert!(matches!(
            settings.validate(),
            Err(crate::error::ConfigError::MissingRequired(_))
        ));

        let mut settings = valid_settings();
        settings.restore.session_ttl_seconds = 0;
        assert!(matches!(
            settings.validate(),
            Err(crate::error::ConfigError::InvalidValue(_))
        ));

        let mut settings = valid_settings();
        settings.restore.code_length = 0;
        assert!(settings.validate().is_err());

        let mut settings = valid_settings();
        settings.application.hash_cost = 2;
        assert!(settings.validate().is_err());
    }
}
