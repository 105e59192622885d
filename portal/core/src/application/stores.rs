// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Store Factory - Application Layer
//!
//! Creates the concrete repository set for the configured storage backend.
//! The bundle is built once at process start and handed to the service
//! constructors; the domain layer stays free of infrastructure types.

use std::sync::Arc;

use anyhow::Result;

use crate::domain::config::StorageConfig;
use crate::domain::repository::{
    ApplicationLogRepository, ApplicationRepository, AuthTokenRepository, UserRepository,
};
use crate::infrastructure::db::Database;
use crate::infrastructure::repositories::postgres_application::PostgresApplicationRepository;
use crate::infrastructure::repositories::postgres_log::PostgresApplicationLogRepository;
use crate::infrastructure::repositories::postgres_token::PostgresAuthTokenRepository;
use crate::infrastructure::repositories::postgres_user::PostgresUserRepository;
use crate::infrastructure::repositories::{
    InMemoryApplicationRepository, InMemoryAuthTokenRepository, InMemoryUserRepository,
};

/// The full repository set for one portal process.
#[derive(Clone)]
pub struct PortalStores {
    pub applications: Arc<dyn ApplicationRepository>,
    pub logs: Arc<dyn ApplicationLogRepository>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn AuthTokenRepository>,
}

impl PortalStores {
    /// Ephemeral stores for development and tests.
    pub fn in_memory() -> Self {
        let applications = InMemoryApplicationRepository::new();
        let logs = applications.log_repository();
        Self {
            applications: Arc::new(applications),
            logs: Arc::new(logs),
            users: Arc::new(InMemoryUserRepository::new()),
            tokens: Arc::new(InMemoryAuthTokenRepository::new()),
        }
    }

    /// PostgreSQL-backed stores sharing one connection pool.
    pub fn postgres(database: &Database) -> Self {
        let pool = database.get_pool().clone();
        Self {
            applications: Arc::new(PostgresApplicationRepository::new(pool.clone())),
            logs: Arc::new(PostgresApplicationLogRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            tokens: Arc::new(PostgresAuthTokenRepository::new(pool)),
        }
    }

    /// Build the store set selected by configuration.
    pub async fn from_config(storage: &StorageConfig) -> Result<Self> {
        match storage {
            StorageConfig::InMemory => Ok(Self::in_memory()),
            StorageConfig::Postgres { connection_string } => {
                let database = Database::new(connection_string).await?;
                Ok(Self::postgres(&database))
            }
        }
    }
}
