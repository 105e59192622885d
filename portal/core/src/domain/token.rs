// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub Uuid);

impl TokenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque bearer token backing the portal's session authentication.
///
/// Revocation is a soft delete: the row stays for audit, the token stops
/// resolving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub id: TokenId,
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    /// Issue a fresh token for the user, valid for `ttl`.
    pub fn issue(user_id: UserId, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: TokenId::new(),
            user_id,
            token: Uuid::new_v4().simple().to_string(),
            expires_at: now + ttl,
            revoked: false,
            created_at: now,
        }
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }

    pub fn revoke(&mut self) {
        self.revoked = true;
    }
}
