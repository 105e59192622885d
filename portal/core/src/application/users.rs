// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! User directory administration. Everything here is admin-gated, and an
//! administrator can never deactivate or delete their own account.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::access::{require_admin, Caller, CredentialHasher};
use crate::domain::error::PortalError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{User, UserId, UserRole};

/// Partial edit of a user record. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

pub struct UserDirectoryService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserDirectoryService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { users, hasher }
    }

    /// Active users, newest first.
    pub async fn list(
        &self,
        caller: &Caller,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<User>, PortalError> {
        require_admin(caller)?;
        Ok(self.users.list_active(offset, limit).await?)
    }

    /// Update a user's profile, role, activation or credential.
    pub async fn update(
        &self,
        caller: &Caller,
        id: UserId,
        update: UserUpdate,
    ) -> Result<User, PortalError> {
        require_admin(caller)?;
        if update.is_active == Some(false) && id == caller.id() {
            return Err(PortalError::InvalidOperation(
                "administrators cannot deactivate their own account".into(),
            ));
        }
        let mut user = self
            .users
            .find_active(id)
            .await?
            .ok_or(PortalError::NotFound)?;

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(department) = update.department {
            user.department = Some(department);
        }
        if let Some(position) = update.position {
            user.position = Some(position);
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(active) = update.is_active {
            user.set_active(active);
        }
        if let Some(password) = update.password {
            if password.trim().is_empty() {
                return Err(PortalError::Validation("password must not be empty".into()));
            }
            user.hashed_credential = self.hasher.hash(&password);
        }
        user.updated_at = chrono::Utc::now();
        self.users.update(&user).await?;
        info!(user = %id, "user updated");
        Ok(user)
    }

    /// Activate or deactivate an account.
    pub async fn set_active(
        &self,
        caller: &Caller,
        id: UserId,
        active: bool,
    ) -> Result<User, PortalError> {
        require_admin(caller)?;
        if !active && id == caller.id() {
            return Err(PortalError::InvalidOperation(
                "administrators cannot deactivate their own account".into(),
            ));
        }
        let mut user = self
            .users
            .find_active(id)
            .await?
            .ok_or(PortalError::NotFound)?;
        user.set_active(active);
        self.users.update(&user).await?;
        info!(user = %id, active, "user activation changed");
        Ok(user)
    }

    /// Soft-delete an account; it drops out of authentication and lookups.
    pub async fn delete(&self, caller: &Caller, id: UserId) -> Result<(), PortalError> {
        require_admin(caller)?;
        if id == caller.id() {
            return Err(PortalError::InvalidOperation(
                "administrators cannot delete their own account".into(),
            ));
        }
        let mut user = self
            .users
            .find_active(id)
            .await?
            .ok_or(PortalError::NotFound)?;
        user.soft_delete();
        self.users.update(&user).await?;
        info!(user = %id, "user soft-deleted");
        Ok(())
    }
}
