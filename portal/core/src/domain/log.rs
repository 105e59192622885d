// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::application::ApplicationId;
use crate::domain::user::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogId(pub Uuid);

impl LogId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LogId {
    fn default() -> Self {
        Self::new()
    }
}

/// Audit action kinds, one per state-changing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogAction {
    Updated,
    Submitted,
    Approved,
    Rejected,
    RevisionRequested,
    Processing,
    Completed,
    Deleted,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Updated => "UPDATED",
            LogAction::Submitted => "SUBMITTED",
            LogAction::Approved => "APPROVED",
            LogAction::Rejected => "REJECTED",
            LogAction::RevisionRequested => "REVISION_REQUESTED",
            LogAction::Processing => "PROCESSING",
            LogAction::Completed => "COMPLETED",
            LogAction::Deleted => "DELETED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UPDATED" => Some(LogAction::Updated),
            "SUBMITTED" => Some(LogAction::Submitted),
            "APPROVED" => Some(LogAction::Approved),
            "REJECTED" => Some(LogAction::Rejected),
            "REVISION_REQUESTED" => Some(LogAction::RevisionRequested),
            "PROCESSING" => Some(LogAction::Processing),
            "COMPLETED" => Some(LogAction::Completed),
            "DELETED" => Some(LogAction::Deleted),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable audit record for an application. Appended in the same
/// commit as the row mutation it describes; never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationLog {
    pub id: LogId,
    pub application_id: ApplicationId,
    pub user_id: UserId,
    pub action: LogAction,
    pub reason: Option<String>,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl ApplicationLog {
    pub fn new(application_id: ApplicationId, user_id: UserId, action: LogAction) -> Self {
        Self {
            id: LogId::new(),
            application_id,
            user_id,
            action,
            reason: None,
            details: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
