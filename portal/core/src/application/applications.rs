// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Application lifecycle service.
//!
//! Owns every operation of the status state machine. Each status- or
//! deletion-changing call follows the same shape: resolve the row through
//! the visibility policy, run the aggregate's transition method, then commit
//! the mutated row together with its single audit row through
//! `ApplicationRepository::update_checked`. A commit that loses a race is
//! reported as `InvalidTransition` against the status that actually won —
//! it is never retried or re-applied.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::access::{require_admin, Caller};
use crate::domain::application::{
    Application, ApplicationDraft, ApplicationId, ApplicationStatus, ApplicationUpdate,
    ReviewDecision, TransitionAction,
};
use crate::domain::error::PortalError;
use crate::domain::log::ApplicationLog;
use crate::domain::notify::Mailer;
use crate::domain::repository::{
    ApplicationLogRepository, ApplicationQuery, ApplicationRepository, RepositoryError,
    UserRepository,
};
use crate::domain::visibility::Visibility;

/// An application joined with the display names the detail view needs.
#[derive(Debug, Clone)]
pub struct ApplicationDetail {
    pub application: Application,
    pub owner_name: String,
    pub owner_email: String,
    pub reviewer_name: Option<String>,
}

pub struct ApplicationService {
    applications: Arc<dyn ApplicationRepository>,
    logs: Arc<dyn ApplicationLogRepository>,
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn Mailer>,
}

impl ApplicationService {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        logs: Arc<dyn ApplicationLogRepository>,
        users: Arc<dyn UserRepository>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            applications,
            logs,
            users,
            mailer,
        }
    }

    /// Create a new application in `Draft` owned by the caller.
    pub async fn create(
        &self,
        caller: &Caller,
        draft: ApplicationDraft,
    ) -> Result<Application, PortalError> {
        draft.validate(Utc::now().date_naive())?;
        let application = Application::new(caller.user(), draft);
        self.applications.insert(&application).await?;
        info!(application = %application.id, owner = %caller.id(), "application created");
        Ok(application)
    }

    /// Edit application content. Owner-only, editable statuses only.
    pub async fn update(
        &self,
        caller: &Caller,
        id: ApplicationId,
        update: ApplicationUpdate,
    ) -> Result<Application, PortalError> {
        let mut application = self.fetch_owned(caller, id).await?;
        let expected = application.status;
        let action = application.apply_update(update)?;
        let log = ApplicationLog::new(id, caller.id(), action);
        self.applications
            .update_checked(&application, expected, Some(&log))
            .await?;
        Ok(application)
    }

    /// DRAFT | REVISION_REQUESTED -> SUBMITTED, by the owner.
    pub async fn submit(
        &self,
        caller: &Caller,
        id: ApplicationId,
    ) -> Result<Application, PortalError> {
        let mut application = self.fetch_owned(caller, id).await?;
        let expected = application.status;
        let action = application.submit()?;
        let log = ApplicationLog::new(id, caller.id(), action);
        self.commit_transition(&application, expected, TransitionAction::Submit, &log)
            .await?;
        info!(application = %id, "application submitted");
        Ok(application)
    }

    /// Record an admin review decision on a SUBMITTED | UNDER_REVIEW row.
    pub async fn review(
        &self,
        caller: &Caller,
        id: ApplicationId,
        decision: ReviewDecision,
        reason: Option<String>,
    ) -> Result<Application, PortalError> {
        require_admin(caller)?;
        let mut application = self.fetch_visible(caller, id, false).await?;
        let expected = application.status;
        let action = application.review(decision, caller.id(), reason.clone())?;

        let mut log = ApplicationLog::new(id, caller.id(), action);
        if let Some(reason) = &reason {
            log = log.with_reason(reason.clone());
        }
        self.commit_transition(
            &application,
            expected,
            TransitionAction::Review(decision.target_status()),
            &log,
        )
        .await?;
        info!(application = %id, status = %application.status, "application reviewed");

        if let Err(err) = self
            .mailer
            .send_review_outcome(&application, decision, reason.as_deref())
            .await
        {
            warn!(application = %id, error = %err, "review notification failed");
        }
        Ok(application)
    }

    /// Admin-only post-approval moves: APPROVED -> PROCESSING -> COMPLETED.
    pub async fn advance(
        &self,
        caller: &Caller,
        id: ApplicationId,
        target: ApplicationStatus,
    ) -> Result<Application, PortalError> {
        require_admin(caller)?;
        let mut application = self.fetch_visible(caller, id, false).await?;
        let expected = application.status;
        let action = application.advance(target)?;

        let log = ApplicationLog::new(id, caller.id(), action).with_details(serde_json::json!({
            "old_status": expected.as_str(),
            "new_status": application.status.as_str(),
            "changed_by_admin": true,
        }));
        self.commit_transition(&application, expected, TransitionAction::Advance(target), &log)
            .await?;
        info!(application = %id, status = %application.status, "application advanced");
        Ok(application)
    }

    /// Soft-delete an application. Admin-only; terminal rows are refused.
    pub async fn delete(
        &self,
        caller: &Caller,
        id: ApplicationId,
        reason: String,
    ) -> Result<(), PortalError> {
        require_admin(caller)?;
        if reason.trim().is_empty() {
            return Err(PortalError::Validation(
                "a deletion reason is required".into(),
            ));
        }
        let mut application = self.fetch_visible(caller, id, false).await?;
        let expected = application.status;
        let action = application.soft_delete(caller.id(), reason.clone())?;

        let log = ApplicationLog::new(id, caller.id(), action).with_reason(reason);
        self.commit_transition(&application, expected, TransitionAction::Delete, &log)
            .await?;
        info!(application = %id, "application soft-deleted");
        Ok(())
    }

    /// List applications the caller may see, newest first.
    pub async fn list(
        &self,
        caller: &Caller,
        include_deleted: bool,
        query: ApplicationQuery,
    ) -> Result<Vec<Application>, PortalError> {
        let visibility = Visibility::for_caller(caller, include_deleted);
        Ok(self.applications.list(&visibility, &query).await?)
    }

    /// Single fetch with owner and reviewer display names joined in.
    pub async fn get(
        &self,
        caller: &Caller,
        id: ApplicationId,
        include_deleted: bool,
    ) -> Result<ApplicationDetail, PortalError> {
        let application = self.fetch_visible(caller, id, include_deleted).await?;

        // Owner may since have been soft-deleted; the snapshot taken at
        // creation time still identifies the applicant.
        let owner = self.users.find_active(application.owner_id).await?;
        let (owner_name, owner_email) = match owner {
            Some(user) => (user.name, user.email),
            None => (
                application.applicant_name.clone(),
                application.applicant_email.clone(),
            ),
        };
        let reviewer_name = match application.reviewed_by {
            Some(reviewer_id) => self
                .users
                .find_active(reviewer_id)
                .await?
                .map(|user| user.name),
            None => None,
        };
        Ok(ApplicationDetail {
            application,
            owner_name,
            owner_email,
            reviewer_name,
        })
    }

    /// The application's audit trail, oldest first.
    pub async fn audit_trail(
        &self,
        caller: &Caller,
        id: ApplicationId,
    ) -> Result<Vec<ApplicationLog>, PortalError> {
        // Admins may inspect the trail of deleted applications.
        self.fetch_visible(caller, id, true).await?;
        Ok(self.logs.find_by_application(id).await?)
    }

    /// Fetch under the caller's visibility; anything else is `NotFound`.
    async fn fetch_visible(
        &self,
        caller: &Caller,
        id: ApplicationId,
        include_deleted: bool,
    ) -> Result<Application, PortalError> {
        let visibility = Visibility::for_caller(caller, include_deleted);
        let application = self
            .applications
            .find(id)
            .await?
            .ok_or(PortalError::NotFound)?;
        if !visibility.permits(&application) {
            return Err(PortalError::NotFound);
        }
        Ok(application)
    }

    /// Owner-scoped fetch for submit/edit paths: the row must belong to the
    /// caller and must not be soft-deleted, regardless of role.
    async fn fetch_owned(
        &self,
        caller: &Caller,
        id: ApplicationId,
    ) -> Result<Application, PortalError> {
        let visibility = Visibility::owned_by(caller.id());
        let application = self
            .applications
            .find(id)
            .await?
            .ok_or(PortalError::NotFound)?;
        if !visibility.permits(&application) {
            return Err(PortalError::NotFound);
        }
        Ok(application)
    }

    /// Commit a transition and its audit row. A losing race is reported as
    /// `InvalidTransition` against the status that actually won.
    async fn commit_transition(
        &self,
        application: &Application,
        expected: ApplicationStatus,
        action: TransitionAction,
        log: &ApplicationLog,
    ) -> Result<(), PortalError> {
        match self
            .applications
            .update_checked(application, expected, Some(log))
            .await
        {
            Ok(()) => Ok(()),
            Err(RepositoryError::Conflict(_)) => {
                let current = self
                    .applications
                    .find(application.id)
                    .await?
                    .map(|a| a.status)
                    .unwrap_or(expected);
                warn!(
                    application = %application.id,
                    expected = %expected,
                    current = %current,
                    "transition lost a concurrent commit"
                );
                Err(PortalError::InvalidTransition {
                    from: current,
                    action,
                })
            }
            Err(other) => Err(other.into()),
        }
    }
}
