// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! PostgreSQL bearer-token repository backed by the `auth_tokens` table.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::domain::repository::{AuthTokenRepository, RepositoryError};
use crate::domain::token::{AuthToken, TokenId};
use crate::domain::user::UserId;

pub struct PostgresAuthTokenRepository {
    pool: PgPool,
}

impl PostgresAuthTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<AuthToken, RepositoryError> {
        Ok(AuthToken {
            id: TokenId(row.try_get::<Uuid, _>("id")?),
            user_id: UserId(row.try_get::<Uuid, _>("user_id")?),
            token: row.try_get("token")?,
            expires_at: row.try_get("expires_at")?,
            revoked: row.try_get("revoked")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl AuthTokenRepository for PostgresAuthTokenRepository {
    async fn insert(&self, token: &AuthToken) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO auth_tokens (id, user_id, token, expires_at, revoked, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(token.id.0)
        .bind(token.user_id.0)
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(token.revoked)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to insert token: {}", e)))?;
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<AuthToken>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM auth_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn update(&self, token: &AuthToken) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE auth_tokens SET expires_at = $1, revoked = $2 WHERE id = $3",
        )
        .bind(token.expires_at)
        .bind(token.revoked)
        .bind(token.id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to update token: {}", e)))?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("auth token".into()));
        }
        Ok(())
    }
}
