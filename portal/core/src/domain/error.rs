// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use thiserror::Error;

use crate::domain::application::{ApplicationStatus, TransitionAction};
use crate::domain::repository::RepositoryError;
use crate::domain::storage::FileStoreError;

/// Error taxonomy surfaced by every portal operation.
///
/// Ownership failures and soft-deleted rows deliberately collapse into
/// `NotFound`; `Forbidden` is reserved for role-tier checks so a caller can
/// never probe for the existence of another user's records.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("administrator privileges required")]
    Forbidden,

    #[error("record not found")]
    NotFound,

    #[error("cannot {action} from status {from}")]
    InvalidTransition {
        from: ApplicationStatus,
        action: TransitionAction,
    },

    #[error("operation not permitted: {0}")]
    InvalidOperation(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("concurrent update lost the race")]
    Conflict,

    #[error("storage failure: {0}")]
    Storage(RepositoryError),

    #[error("file storage failure: {0}")]
    FileStore(#[from] FileStoreError),
}

impl From<RepositoryError> for PortalError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(_) => PortalError::NotFound,
            RepositoryError::Conflict(_) => PortalError::Conflict,
            other => PortalError::Storage(other),
        }
    }
}
