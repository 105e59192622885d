// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! PostgreSQL User Repository backed by the `users` table.
//!
//! All lookup paths filter on `dcyn = 'N'`: a soft-deleted account is gone
//! from authentication and administration alike.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::domain::repository::{RepositoryError, UserRepository};
use crate::domain::user::{User, UserId, UserRole};

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<User, RepositoryError> {
        let role_str: String = row.try_get("role")?;
        let role = UserRole::parse(&role_str).ok_or_else(|| {
            RepositoryError::Serialization(format!("unknown user role '{role_str}'"))
        })?;
        let dcyn: String = row.try_get("dcyn")?;
        Ok(User {
            id: UserId(row.try_get::<Uuid, _>("id")?),
            email: row.try_get("email")?,
            hashed_credential: row.try_get("hashed_credential")?,
            name: row.try_get("name")?,
            role,
            department: row.try_get("department")?,
            position: row.try_get("position")?,
            phone: row.try_get("phone")?,
            is_active: row.try_get("is_active")?,
            last_login_at: row.try_get("last_login_at")?,
            deleted: dcyn == "Y",
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, hashed_credential, name, role, department, position,
                phone, is_active, last_login_at, dcyn, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.id.0)
        .bind(&user.email)
        .bind(&user.hashed_credential)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(&user.department)
        .bind(&user.position)
        .bind(&user.phone)
        .bind(user.is_active)
        .bind(user.last_login_at)
        .bind(if user.deleted { "Y" } else { "N" })
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to insert user: {}", e)))?;
        Ok(())
    }

    async fn find_active(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1 AND dcyn = 'N'")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1 AND dcyn = 'N'")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list_active(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM users WHERE dcyn = 'N' ORDER BY created_at DESC OFFSET $1 LIMIT $2",
        )
        .bind(offset as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = $1, hashed_credential = $2, name = $3, role = $4,
                department = $5, position = $6, phone = $7, is_active = $8,
                last_login_at = $9, dcyn = $10, updated_at = $11
            WHERE id = $12
            "#,
        )
        .bind(&user.email)
        .bind(&user.hashed_credential)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(&user.department)
        .bind(&user.position)
        .bind(&user.phone)
        .bind(user.is_active)
        .bind(user.last_login_at)
        .bind(if user.deleted { "Y" } else { "N" })
        .bind(user.updated_at)
        .bind(user.id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to update user: {}", e)))?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("user {}", user.id)));
        }
        Ok(())
    }
}
