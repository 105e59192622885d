// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the repository abstractions defined in
//! the domain layer, following the Repository pattern from DDD.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve domain aggregates
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! ## PostgreSQL Repositories
//!
//! Production-ready implementations backed by PostgreSQL:
//! - **PostgresApplicationRepository** - application rows + transition commits
//! - **PostgresApplicationLogRepository** - audit trail reads
//! - **PostgresUserRepository** - user accounts
//! - **PostgresAuthTokenRepository** - bearer tokens
//!
//! ## In-Memory Repositories
//!
//! Lightweight implementations for testing and development. The application
//! repository and its log reader share one locked state block so a transition
//! and its audit row commit inside a single critical section, mirroring the
//! PostgreSQL transaction.

pub mod postgres_application;
pub mod postgres_log;
pub mod postgres_token;
pub mod postgres_user;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::domain::application::{Application, ApplicationId, ApplicationStatus};
use crate::domain::log::ApplicationLog;
use crate::domain::repository::{
    ApplicationLogRepository, ApplicationQuery, ApplicationRepository, AuthTokenRepository,
    RepositoryError, UserRepository,
};
use crate::domain::token::AuthToken;
use crate::domain::user::{User, UserId};
use crate::domain::visibility::Visibility;

/// Applications and their audit rows live behind one lock so commits are
/// all-or-nothing.
#[derive(Default)]
struct ApplicationState {
    applications: HashMap<ApplicationId, Application>,
    logs: Vec<ApplicationLog>,
}

#[derive(Clone)]
pub struct InMemoryApplicationRepository {
    state: Arc<RwLock<ApplicationState>>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(ApplicationState::default())),
        }
    }

    /// Log reader over the same state block.
    pub fn log_repository(&self) -> InMemoryApplicationLogRepository {
        InMemoryApplicationLogRepository {
            state: self.state.clone(),
        }
    }
}

impl Default for InMemoryApplicationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn insert(&self, application: &Application) -> Result<(), RepositoryError> {
        let mut state = self.state.write().unwrap();
        state
            .applications
            .insert(application.id, application.clone());
        Ok(())
    }

    async fn find(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let state = self.state.read().unwrap();
        Ok(state.applications.get(&id).cloned())
    }

    async fn list(
        &self,
        visibility: &Visibility,
        query: &ApplicationQuery,
    ) -> Result<Vec<Application>, RepositoryError> {
        let state = self.state.read().unwrap();
        let mut rows: Vec<Application> = state
            .applications
            .values()
            .filter(|a| visibility.permits(a))
            .filter(|a| query.status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        // Sort by created_at desc
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn update_checked(
        &self,
        application: &Application,
        expected_status: ApplicationStatus,
        log: Option<&ApplicationLog>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().unwrap();
        let stored = state
            .applications
            .get(&application.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("application {}", application.id)))?;
        if stored.deleted {
            return Err(RepositoryError::Conflict(
                "application is soft-deleted".into(),
            ));
        }
        if stored.status != expected_status {
            return Err(RepositoryError::Conflict(format!(
                "status is {}, expected {}",
                stored.status, expected_status
            )));
        }
        state
            .applications
            .insert(application.id, application.clone());
        if let Some(log) = log {
            state.logs.push(log.clone());
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct InMemoryApplicationLogRepository {
    state: Arc<RwLock<ApplicationState>>,
}

#[async_trait]
impl ApplicationLogRepository for InMemoryApplicationLogRepository {
    async fn find_by_application(
        &self,
        id: ApplicationId,
    ) -> Result<Vec<ApplicationLog>, RepositoryError> {
        let state = self.state.read().unwrap();
        let mut logs: Vec<ApplicationLog> = state
            .logs
            .iter()
            .filter(|l| l.application_id == id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(logs)
    }
}

#[derive(Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().unwrap();
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_active(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().unwrap();
        Ok(users.get(&id).filter(|u| !u.deleted).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().unwrap();
        Ok(users
            .values()
            .find(|u| u.email == email && !u.deleted)
            .cloned())
    }

    async fn list_active(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<User>, RepositoryError> {
        let users = self.users.read().unwrap();
        let mut rows: Vec<User> = users.values().filter(|u| !u.deleted).cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().unwrap();
        if !users.contains_key(&user.id) {
            return Err(RepositoryError::NotFound(format!("user {}", user.id)));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }
}

#[derive(Clone)]
pub struct InMemoryAuthTokenRepository {
    tokens: Arc<RwLock<HashMap<String, AuthToken>>>,
}

impl InMemoryAuthTokenRepository {
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryAuthTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthTokenRepository for InMemoryAuthTokenRepository {
    async fn insert(&self, token: &AuthToken) -> Result<(), RepositoryError> {
        let mut tokens = self.tokens.write().unwrap();
        tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<AuthToken>, RepositoryError> {
        let tokens = self.tokens.read().unwrap();
        Ok(tokens.get(token).cloned())
    }

    async fn update(&self, token: &AuthToken) -> Result<(), RepositoryError> {
        let mut tokens = self.tokens.write().unwrap();
        if !tokens.contains_key(&token.token) {
            return Err(RepositoryError::NotFound("auth token".into()));
        }
        tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::{ApplicationDraft, ServiceType};
    use crate::domain::log::LogAction;
    use crate::domain::user::UserRole;

    fn owner() -> User {
        User::new(
            "owner@hospital.example.org".into(),
            "hash".into(),
            "Owner".into(),
            UserRole::Researcher,
            None,
            None,
            None,
        )
    }

    fn sample(owner: &User) -> Application {
        Application::new(
            owner,
            ApplicationDraft {
                project_name: "P".into(),
                applicant_phone: "010".into(),
                principal_investigator: "PI".into(),
                pi_department: "D".into(),
                irb_number: "IRB-1".into(),
                desired_completion_date: None,
                service_types: vec![ServiceType::StructuredExtraction],
                unstructured_data_type: None,
                target_patients: "ten chars at least".into(),
                request_details: "twenty characters at the very least".into(),
            },
        )
    }

    #[tokio::test]
    async fn update_checked_commits_row_and_log_together() {
        let repo = InMemoryApplicationRepository::new();
        let logs = repo.log_repository();
        let owner = owner();
        let mut app = sample(&owner);
        repo.insert(&app).await.unwrap();

        let expected = app.status;
        app.submit().unwrap();
        let log = ApplicationLog::new(app.id, owner.id, LogAction::Submitted);
        repo.update_checked(&app, expected, Some(&log)).await.unwrap();

        let stored = repo.find(app.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ApplicationStatus::Submitted);
        assert_eq!(logs.find_by_application(app.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_checked_refuses_stale_status_and_writes_nothing() {
        let repo = InMemoryApplicationRepository::new();
        let logs = repo.log_repository();
        let owner = owner();
        let mut app = sample(&owner);
        repo.insert(&app).await.unwrap();

        app.submit().unwrap();
        repo.update_checked(&app, ApplicationStatus::Draft, None)
            .await
            .unwrap();

        // Stale commit still believes the row is in Draft.
        let mut stale = app.clone();
        stale.status = ApplicationStatus::Approved;
        let log = ApplicationLog::new(app.id, owner.id, LogAction::Approved);
        let err = repo
            .update_checked(&stale, ApplicationStatus::Draft, Some(&log))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let stored = repo.find(app.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ApplicationStatus::Submitted);
        assert!(logs.find_by_application(app.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_checked_refuses_soft_deleted_rows() {
        let repo = InMemoryApplicationRepository::new();
        let owner = owner();
        let mut app = sample(&owner);
        repo.insert(&app).await.unwrap();

        let expected = app.status;
        app.soft_delete(owner.id, "gone".into()).unwrap();
        repo.update_checked(&app, expected, None).await.unwrap();

        let err = repo
            .update_checked(&app, expected, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_applies_visibility_and_pagination() {
        let repo = InMemoryApplicationRepository::new();
        let owner = owner();
        for _ in 0..3 {
            repo.insert(&sample(&owner)).await.unwrap();
        }
        let other = User::new(
            "other@hospital.example.org".into(),
            "hash".into(),
            "Other".into(),
            UserRole::Researcher,
            None,
            None,
            None,
        );
        repo.insert(&sample(&other)).await.unwrap();

        let vis = Visibility::owned_by(owner.id);
        let rows = repo
            .list(&vis, &ApplicationQuery::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);

        let page = repo
            .list(
                &vis,
                &ApplicationQuery {
                    status: None,
                    offset: 1,
                    limit: 1,
                },
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn deleted_users_drop_out_of_lookups() {
        let repo = InMemoryUserRepository::new();
        let mut user = owner();
        repo.insert(&user).await.unwrap();
        assert!(repo.find_active(user.id).await.unwrap().is_some());

        user.soft_delete();
        repo.update(&user).await.unwrap();
        assert!(repo.find_active(user.id).await.unwrap().is_none());
        assert!(repo
            .find_by_email("owner@hospital.example.org")
            .await
            .unwrap()
            .is_none());
        assert!(repo.list_active(0, 10).await.unwrap().is_empty());
    }
}
