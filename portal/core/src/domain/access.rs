// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use crate::domain::error::PortalError;
use crate::domain::user::{User, UserId, UserRole};

/// A caller whose identity the access gate has already resolved: the backing
/// user is active and not soft-deleted. Services take a `Caller`, never a raw
/// user id, so authentication cannot be skipped by accident.
#[derive(Debug, Clone)]
pub struct Caller {
    user: User,
}

impl Caller {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn id(&self) -> UserId {
        self.user.id
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}

/// The single role-tier check. Everything admin-gated goes through here;
/// role strings never appear in service code.
pub fn require_admin(caller: &Caller) -> Result<(), PortalError> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(PortalError::Forbidden)
    }
}

/// Credential hashing, pluggable so the portal core stays agnostic about the
/// concrete scheme.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> String;
    fn verify(&self, password: &str, hashed: &str) -> bool;
}
