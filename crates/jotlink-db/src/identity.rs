//! Identity token repository: bearer token → stable actor id.
//!
//! Tokens are stored hashed; a lookup miss means the caller stays anonymous.

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use jotlink_core::{Error, IdentityRepository, Result};

/// PostgreSQL implementation of IdentityRepository.
pub struct PgIdentityRepository {
    pool: Pool<Postgres>,
}

impl PgIdentityRepository {
    /// Create a new PgIdentityRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Compute the stored hash of a bearer token.
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("sha256:{}", hex::encode(hasher.finalize()))
    }

    /// Register a token for a user (provisioning path).
    pub async fn insert_token(&self, user_id: Uuid, token: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO api_tokens (token_hash, user_id, created_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (token_hash) DO NOTHING",
        )
        .bind(Self::hash_token(token))
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }
}

#[async_trait]
impl IdentityRepository for PgIdentityRepository {
    async fn resolve_token(&self, token: &str) -> Result<Option<Uuid>> {
        let user_id: Option<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM api_tokens WHERE token_hash = $1")
                .bind(Self::hash_token(token))
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?;

        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_and_prefixed() {
        let a = PgIdentityRepository::hash_token("secret-token");
        let b = PgIdentityRepository::hash_token("secret-token");
        assert_eq!(a, b);
        assert!(a.starts_with("sha256:"));
    }

    #[test]
    fn test_hash_token_differs_per_token() {
        assert_ne!(
            PgIdentityRepository::hash_token("token-a"),
            PgIdentityRepository::hash_token("token-b")
        );
    }
}
