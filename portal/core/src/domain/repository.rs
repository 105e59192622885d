// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for each aggregate root, following the DDD
//! Repository pattern: one repository per aggregate, interface defined in the
//! domain layer, implemented in `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `ApplicationRepository` | `Application` | `InMemoryApplicationRepository`, `PostgresApplicationRepository` |
//! | `ApplicationLogRepository` | `ApplicationLog` | `InMemoryApplicationLogRepository`, `PostgresApplicationLogRepository` |
//! | `UserRepository` | `User` | `InMemoryUserRepository`, `PostgresUserRepository` |
//! | `AuthTokenRepository` | `AuthToken` | `InMemoryAuthTokenRepository`, `PostgresAuthTokenRepository` |
//!
//! ## Transition commits
//!
//! Status and deletion changes must reach the store together with exactly one
//! audit row. `ApplicationRepository::update_checked` is that single commit
//! point: it re-validates the stored status against `expected_status` at
//! commit time and refuses with `RepositoryError::Conflict` when a concurrent
//! transition got there first. Audit rows are only ever written through it,
//! which is why `ApplicationLogRepository` exposes reads alone.
//!
//! ## Storage backend selection
//!
//! Concrete implementations are selected at process start from
//! `PortalConfig::storage`. In-memory implementations serve development and
//! tests; PostgreSQL implementations serve production.

use async_trait::async_trait;

use crate::domain::application::{Application, ApplicationId, ApplicationStatus};
use crate::domain::log::ApplicationLog;
use crate::domain::token::AuthToken;
use crate::domain::user::{User, UserId};
use crate::domain::visibility::Visibility;

/// Filters and pagination for application listings.
#[derive(Debug, Clone)]
pub struct ApplicationQuery {
    pub status: Option<ApplicationStatus>,
    pub offset: usize,
    pub limit: usize,
}

impl Default for ApplicationQuery {
    fn default() -> Self {
        Self {
            status: None,
            offset: 0,
            limit: 100,
        }
    }
}

/// Repository interface for Application aggregates.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Persist a newly created application.
    async fn insert(&self, application: &Application) -> Result<(), RepositoryError>;

    /// Fetch by id without any visibility filtering. Callers apply the
    /// visibility policy before exposing the row.
    async fn find(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;

    /// List rows the given visibility permits, newest first.
    async fn list(
        &self,
        visibility: &Visibility,
        query: &ApplicationQuery,
    ) -> Result<Vec<Application>, RepositoryError>;

    /// Commit a mutation, optionally with its audit row, as one atomic unit.
    ///
    /// The stored row must still carry `expected_status` and must not be
    /// soft-deleted; otherwise nothing is written and
    /// `RepositoryError::Conflict` is returned.
    async fn update_checked(
        &self,
        application: &Application,
        expected_status: ApplicationStatus,
        log: Option<&ApplicationLog>,
    ) -> Result<(), RepositoryError>;
}

/// Read access to the append-only audit trail.
#[async_trait]
pub trait ApplicationLogRepository: Send + Sync {
    /// All audit rows for one application, oldest first.
    async fn find_by_application(
        &self,
        id: ApplicationId,
    ) -> Result<Vec<ApplicationLog>, RepositoryError>;
}

/// Repository interface for User aggregates.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: &User) -> Result<(), RepositoryError>;

    /// Fetch by id, excluding soft-deleted rows.
    async fn find_active(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Fetch by email, excluding soft-deleted rows.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Active (non-deleted) users, newest first.
    async fn list_active(&self, offset: usize, limit: usize)
        -> Result<Vec<User>, RepositoryError>;

    async fn update(&self, user: &User) -> Result<(), RepositoryError>;
}

/// Repository interface for bearer tokens.
#[async_trait]
pub trait AuthTokenRepository: Send + Sync {
    async fn insert(&self, token: &AuthToken) -> Result<(), RepositoryError>;

    /// Resolve a bearer string to its token row, if any.
    async fn find_by_token(&self, token: &str) -> Result<Option<AuthToken>, RepositoryError>;

    async fn update(&self, token: &AuthToken) -> Result<(), RepositoryError>;
}

/// Repository errors.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Commit-time check failed: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
