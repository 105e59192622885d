// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Researcher,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Researcher => "RESEARCHER",
            UserRole::Admin => "ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RESEARCHER" => Some(UserRole::Researcher),
            "ADMIN" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// Portal account for a researcher or administrator.
///
/// Soft-deleted users are excluded from every authentication and lookup
/// path; deletion also deactivates the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub hashed_credential: String,
    pub name: String,
    pub role: UserRole,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: String,
        hashed_credential: String,
        name: String,
        role: UserRole,
        department: Option<String>,
        position: Option<String>,
        phone: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email,
            hashed_credential,
            name,
            role,
            department,
            position,
            phone,
            is_active: true,
            last_login_at: None,
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// True when the account may authenticate.
    pub fn can_authenticate(&self) -> bool {
        self.is_active && !self.deleted
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
        self.updated_at = Utc::now();
    }

    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Soft-delete the account. Deactivation rides along so the row drops
    /// out of authentication immediately.
    pub fn soft_delete(&mut self) {
        self.deleted = true;
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        User::new(
            "someone@hospital.example.org".into(),
            "hash".into(),
            "Someone".into(),
            role,
            None,
            None,
            None,
        )
    }

    #[test]
    fn new_user_is_active_and_not_deleted() {
        let u = user(UserRole::Researcher);
        assert!(u.can_authenticate());
        assert!(!u.is_admin());
    }

    #[test]
    fn deactivation_blocks_authentication() {
        let mut u = user(UserRole::Researcher);
        u.set_active(false);
        assert!(!u.can_authenticate());
        u.set_active(true);
        assert!(u.can_authenticate());
    }

    #[test]
    fn soft_delete_also_deactivates() {
        let mut u = user(UserRole::Admin);
        u.soft_delete();
        assert!(u.deleted);
        assert!(!u.is_active);
        assert!(!u.can_authenticate());
    }
}
