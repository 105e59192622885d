// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! PostgreSQL read access to the `application_logs` audit trail.
//!
//! Rows are only ever inserted by
//! `PostgresApplicationRepository::update_checked`, inside the same
//! transaction as the row mutation they describe; this repository reads them
//! back for trail views.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::domain::application::ApplicationId;
use crate::domain::log::{ApplicationLog, LogAction, LogId};
use crate::domain::repository::{ApplicationLogRepository, RepositoryError};
use crate::domain::user::UserId;

pub struct PostgresApplicationLogRepository {
    pool: PgPool,
}

impl PostgresApplicationLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<ApplicationLog, RepositoryError> {
        let action_str: String = row.try_get("action")?;
        let action = LogAction::parse(&action_str).ok_or_else(|| {
            RepositoryError::Serialization(format!("unknown log action '{action_str}'"))
        })?;
        Ok(ApplicationLog {
            id: LogId(row.try_get::<Uuid, _>("id")?),
            application_id: ApplicationId(row.try_get::<Uuid, _>("application_id")?),
            user_id: UserId(row.try_get::<Uuid, _>("user_id")?),
            action,
            reason: row.try_get("reason")?,
            details: row.try_get("details")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl ApplicationLogRepository for PostgresApplicationLogRepository {
    async fn find_by_application(
        &self,
        id: ApplicationId,
    ) -> Result<Vec<ApplicationLog>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, application_id, user_id, action, reason, details, created_at
            FROM application_logs
            WHERE application_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
        rows.iter().map(Self::map_row).collect()
    }
}
