// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Access-control gate.
//!
//! Resolves bearer tokens to callers and owns registration and login. Every
//! failure on the authentication path collapses into `Unauthenticated` so the
//! response does not reveal whether an account exists, is deactivated, or is
//! deleted.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::access::{Caller, CredentialHasher};
use crate::domain::config::AuthConfig;
use crate::domain::error::PortalError;
use crate::domain::repository::{AuthTokenRepository, UserRepository};
use crate::domain::token::AuthToken;
use crate::domain::user::{User, UserRole};

/// Registration payload. New accounts are always researchers; roles are
/// raised later through user administration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
}

/// Bearer token handed back from a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn AuthTokenRepository>,
    hasher: Arc<dyn CredentialHasher>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn AuthTokenRepository>,
        hasher: Arc<dyn CredentialHasher>,
        config: AuthConfig,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
            config,
        }
    }

    /// Create a researcher account.
    pub async fn register(&self, request: RegisterUser) -> Result<User, PortalError> {
        let email = request.email.trim().to_string();
        if !email.contains('@') {
            return Err(PortalError::Validation("invalid email address".into()));
        }
        if let Some(domain) = &self.config.allowed_email_domain {
            if !email.ends_with(&format!("@{domain}")) {
                return Err(PortalError::Validation(format!(
                    "only @{domain} addresses may register"
                )));
            }
        }
        if request.password.trim().is_empty() {
            return Err(PortalError::Validation("password must not be empty".into()));
        }
        if request.name.trim().is_empty() {
            return Err(PortalError::Validation("name must not be empty".into()));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(PortalError::Validation("email already registered".into()));
        }

        let user = User::new(
            email,
            self.hasher.hash(&request.password),
            request.name,
            UserRole::Researcher,
            request.department,
            request.position,
            request.phone,
        );
        self.users.insert(&user).await?;
        info!(user = %user.id, "account registered");
        Ok(user)
    }

    /// Verify credentials and issue a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, PortalError> {
        let mut user = self
            .users
            .find_by_email(email.trim())
            .await?
            .ok_or(PortalError::Unauthenticated)?;
        if !user.can_authenticate() || !self.hasher.verify(password, &user.hashed_credential) {
            return Err(PortalError::Unauthenticated);
        }

        user.record_login();
        self.users.update(&user).await?;

        let token = AuthToken::issue(user.id, Duration::hours(self.config.token_ttl_hours));
        self.tokens.insert(&token).await?;
        info!(user = %user.id, "login");
        Ok(IssuedToken {
            token: token.token,
            expires_at: token.expires_at,
        })
    }

    /// Resolve a bearer token to a caller: the token must be live and the
    /// backing account active and not soft-deleted.
    pub async fn authenticate(&self, bearer: &str) -> Result<Caller, PortalError> {
        let token = self
            .tokens
            .find_by_token(bearer)
            .await?
            .ok_or(PortalError::Unauthenticated)?;
        if !token.is_valid(Utc::now()) {
            return Err(PortalError::Unauthenticated);
        }
        let user = self
            .users
            .find_active(token.user_id)
            .await?
            .ok_or(PortalError::Unauthenticated)?;
        if !user.can_authenticate() {
            return Err(PortalError::Unauthenticated);
        }
        Ok(Caller::new(user))
    }

    /// Revoke a bearer token. Unknown tokens are ignored so logout is
    /// idempotent.
    pub async fn revoke(&self, bearer: &str) -> Result<(), PortalError> {
        if let Some(mut token) = self.tokens.find_by_token(bearer).await? {
            token.revoke();
            self.tokens.update(&token).await?;
            info!(user = %token.user_id, "token revoked");
        }
        Ok(())
    }
}
