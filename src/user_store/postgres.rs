use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::UserStore;
use crate::error::DatabaseError;

/// Postgres-backed user store. Identity uniqueness is enforced by the
/// `users.email` unique constraint.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_hash(&self, identity: &str) -> Result<Option<String>, DatabaseError> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE email = $1",
        )
        .bind(identity)
        .fetch_optional(&self.pool)
        .await?;

        Ok(hash)
    }

    async fn insert(&self, identity: &str, password_hash: &str) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(identity)
        .bind(password_hash)
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_hash(
        &self,
        identity: &str,
        password_hash: &str,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $1, updated_at = $2
            WHERE email = $3
            "#,
        )
        .bind(password_hash)
        .bind(Utc::now())
        .bind(identity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::QueryExecution(
                "password update matched no user".to_string(),
            ));
        }

        Ok(())
    }

    async fn exists(&self, identity: &str) -> Result<bool, DatabaseError> {
        let registered = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(identity)
        .fetch_one(&self.pool)
        .await?;

        Ok(registered)
    }
}
