// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::PortalError;
use crate::domain::log::LogAction;
use crate::domain::user::{User, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub Uuid);

impl ApplicationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for ApplicationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Requested data services, multi-select on the application form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    StructuredExtraction,
    UnstructuredExtraction,
    Pseudonymization,
    ExternalLinkage,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::StructuredExtraction => "STRUCTURED_EXTRACTION",
            ServiceType::UnstructuredExtraction => "UNSTRUCTURED_EXTRACTION",
            ServiceType::Pseudonymization => "PSEUDONYMIZATION",
            ServiceType::ExternalLinkage => "EXTERNAL_LINKAGE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    RevisionRequested,
    Processing,
    Completed,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "DRAFT",
            ApplicationStatus::Submitted => "SUBMITTED",
            ApplicationStatus::UnderReview => "UNDER_REVIEW",
            ApplicationStatus::Approved => "APPROVED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::RevisionRequested => "REVISION_REQUESTED",
            ApplicationStatus::Processing => "PROCESSING",
            ApplicationStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(ApplicationStatus::Draft),
            "SUBMITTED" => Some(ApplicationStatus::Submitted),
            "UNDER_REVIEW" => Some(ApplicationStatus::UnderReview),
            "APPROVED" => Some(ApplicationStatus::Approved),
            "REJECTED" => Some(ApplicationStatus::Rejected),
            "REVISION_REQUESTED" => Some(ApplicationStatus::RevisionRequested),
            "PROCESSING" => Some(ApplicationStatus::Processing),
            "COMPLETED" => Some(ApplicationStatus::Completed),
            _ => None,
        }
    }

    /// Terminal states admit no further transitions, including deletion.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::Completed
        )
    }

    /// Content edits, attachment changes and submission are only allowed here.
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Draft | ApplicationStatus::RevisionRequested
        )
    }

    /// Review decisions are only accepted from these states.
    pub fn is_reviewable(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Submitted | ApplicationStatus::UnderReview
        )
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The state-changing operations of the lifecycle, used to report which
/// request was refused when the current status does not permit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    Submit,
    Review(ApplicationStatus),
    Advance(ApplicationStatus),
    Delete,
}

impl std::fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionAction::Submit => f.write_str("submit"),
            TransitionAction::Review(target) => write!(f, "review to {}", target),
            TransitionAction::Advance(target) => write!(f, "advance to {}", target),
            TransitionAction::Delete => f.write_str("delete"),
        }
    }
}

/// Outcome an administrator records when reviewing a submitted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
    Approve,
    Reject,
    RequestRevision,
}

impl ReviewDecision {
    pub fn target_status(&self) -> ApplicationStatus {
        match self {
            ReviewDecision::Approve => ApplicationStatus::Approved,
            ReviewDecision::Reject => ApplicationStatus::Rejected,
            ReviewDecision::RequestRevision => ApplicationStatus::RevisionRequested,
        }
    }
}

/// Attachment slots on an application. Each holds at most one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentSlot {
    IrbNotice,
    ResearchPlan,
}

impl AttachmentSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentSlot::IrbNotice => "irb_notice",
            AttachmentSlot::ResearchPlan => "research_plan",
        }
    }
}

impl std::fmt::Display for AttachmentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored-path plus original-name pair for one uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub path: String,
    pub original_name: String,
}

/// Content of a new application as entered by the applicant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationDraft {
    pub project_name: String,
    pub applicant_phone: String,
    pub principal_investigator: String,
    pub pi_department: String,
    pub irb_number: String,
    pub desired_completion_date: Option<NaiveDate>,
    pub service_types: Vec<ServiceType>,
    pub unstructured_data_type: Option<String>,
    pub target_patients: String,
    pub request_details: String,
}

/// Completion dates closer than this many days out are rejected.
const MIN_COMPLETION_LEAD_DAYS: i64 = 7;
const MIN_TARGET_PATIENTS_LEN: usize = 10;
const MIN_REQUEST_DETAILS_LEN: usize = 20;

impl ApplicationDraft {
    pub fn validate(&self, today: NaiveDate) -> Result<(), PortalError> {
        for (value, field) in [
            (&self.project_name, "project_name"),
            (&self.applicant_phone, "applicant_phone"),
            (&self.principal_investigator, "principal_investigator"),
            (&self.pi_department, "pi_department"),
            (&self.irb_number, "irb_number"),
        ] {
            if value.trim().is_empty() {
                return Err(PortalError::Validation(format!("{field} must not be empty")));
            }
        }
        if self.service_types.is_empty() {
            return Err(PortalError::Validation(
                "at least one service type must be selected".into(),
            ));
        }
        if self
            .service_types
            .contains(&ServiceType::UnstructuredExtraction)
            && self
                .unstructured_data_type
                .as_deref()
                .map_or(true, |s| s.trim().is_empty())
        {
            return Err(PortalError::Validation(
                "unstructured_data_type is required when unstructured extraction is selected"
                    .into(),
            ));
        }
        if self.target_patients.chars().count() < MIN_TARGET_PATIENTS_LEN {
            return Err(PortalError::Validation(format!(
                "target_patients must be at least {MIN_TARGET_PATIENTS_LEN} characters"
            )));
        }
        if self.request_details.chars().count() < MIN_REQUEST_DETAILS_LEN {
            return Err(PortalError::Validation(format!(
                "request_details must be at least {MIN_REQUEST_DETAILS_LEN} characters"
            )));
        }
        if let Some(date) = self.desired_completion_date {
            if date < today + chrono::Duration::days(MIN_COMPLETION_LEAD_DAYS) {
                return Err(PortalError::Validation(format!(
                    "desired_completion_date must be at least {MIN_COMPLETION_LEAD_DAYS} days out"
                )));
            }
        }
        Ok(())
    }
}

/// Partial edit of application content. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationUpdate {
    pub project_name: Option<String>,
    pub applicant_phone: Option<String>,
    pub principal_investigator: Option<String>,
    pub pi_department: Option<String>,
    pub irb_number: Option<String>,
    pub desired_completion_date: Option<NaiveDate>,
    pub service_types: Option<Vec<ServiceType>>,
    pub unstructured_data_type: Option<String>,
    pub target_patients: Option<String>,
    pub request_details: Option<String>,
}

impl ApplicationUpdate {
    fn validate(&self) -> Result<(), PortalError> {
        if let Some(types) = &self.service_types {
            if types.is_empty() {
                return Err(PortalError::Validation(
                    "at least one service type must be selected".into(),
                ));
            }
        }
        if let Some(text) = &self.target_patients {
            if text.chars().count() < MIN_TARGET_PATIENTS_LEN {
                return Err(PortalError::Validation(format!(
                    "target_patients must be at least {MIN_TARGET_PATIENTS_LEN} characters"
                )));
            }
        }
        if let Some(text) = &self.request_details {
            if text.chars().count() < MIN_REQUEST_DETAILS_LEN {
                return Err(PortalError::Validation(format!(
                    "request_details must be at least {MIN_REQUEST_DETAILS_LEN} characters"
                )));
            }
        }
        Ok(())
    }
}

/// A data-access application and its full lifecycle state.
///
/// Status only ever changes through the methods below; each returns the
/// audit action the caller must commit together with the mutated row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub owner_id: UserId,

    // Applicant snapshot, captured from the owning user at creation time.
    pub applicant_name: String,
    pub applicant_department: String,
    pub applicant_email: String,

    pub project_name: String,
    pub applicant_phone: String,
    pub principal_investigator: String,
    pub pi_department: String,
    pub irb_number: String,
    pub desired_completion_date: Option<NaiveDate>,
    pub service_types: Vec<ServiceType>,
    pub unstructured_data_type: Option<String>,
    pub target_patients: String,
    pub request_details: String,

    pub irb_notice: Option<AttachmentRef>,
    pub research_plan: Option<AttachmentRef>,

    pub status: ApplicationStatus,
    pub rejection_reason: Option<String>,
    pub revision_request_reason: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<UserId>,
    pub completed_at: Option<DateTime<Utc>>,

    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<UserId>,
    pub deletion_reason: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Create a new application in `Draft` for the given owner. The caller
    /// must have validated the draft first.
    pub fn new(owner: &User, draft: ApplicationDraft) -> Self {
        let now = Utc::now();
        Self {
            id: ApplicationId::new(),
            owner_id: owner.id,
            applicant_name: owner.name.clone(),
            applicant_department: owner.department.clone().unwrap_or_default(),
            applicant_email: owner.email.clone(),
            project_name: draft.project_name,
            applicant_phone: draft.applicant_phone,
            principal_investigator: draft.principal_investigator,
            pi_department: draft.pi_department,
            irb_number: draft.irb_number,
            desired_completion_date: draft.desired_completion_date,
            service_types: draft.service_types,
            unstructured_data_type: draft.unstructured_data_type,
            target_patients: draft.target_patients,
            request_details: draft.request_details,
            irb_notice: None,
            research_plan: None,
            status: ApplicationStatus::Draft,
            rejection_reason: None,
            revision_request_reason: None,
            submitted_at: None,
            reviewed_at: None,
            reviewed_by: None,
            completed_at: None,
            deleted: false,
            deleted_at: None,
            deleted_by: None,
            deletion_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// DRAFT | REVISION_REQUESTED -> SUBMITTED.
    pub fn submit(&mut self) -> Result<LogAction, PortalError> {
        if !self.status.is_editable() {
            return Err(PortalError::InvalidTransition {
                from: self.status,
                action: TransitionAction::Submit,
            });
        }
        let now = Utc::now();
        self.status = ApplicationStatus::Submitted;
        self.submitted_at = Some(now);
        self.updated_at = now;
        Ok(LogAction::Submitted)
    }

    /// SUBMITTED | UNDER_REVIEW -> APPROVED | REJECTED | REVISION_REQUESTED.
    ///
    /// `reviewed_at` and `reviewed_by` are always set together here; nothing
    /// else writes them.
    pub fn review(
        &mut self,
        decision: ReviewDecision,
        reviewer: UserId,
        reason: Option<String>,
    ) -> Result<LogAction, PortalError> {
        if !self.status.is_reviewable() {
            return Err(PortalError::InvalidTransition {
                from: self.status,
                action: TransitionAction::Review(decision.target_status()),
            });
        }
        let now = Utc::now();
        self.status = decision.target_status();
        self.reviewed_at = Some(now);
        self.reviewed_by = Some(reviewer);
        self.updated_at = now;
        let action = match decision {
            ReviewDecision::Approve => LogAction::Approved,
            ReviewDecision::Reject => {
                self.rejection_reason = reason;
                LogAction::Rejected
            }
            ReviewDecision::RequestRevision => {
                self.revision_request_reason = reason;
                LogAction::RevisionRequested
            }
        };
        Ok(action)
    }

    /// APPROVED -> PROCESSING and PROCESSING -> COMPLETED; the only
    /// post-approval moves an administrator can make.
    pub fn advance(&mut self, target: ApplicationStatus) -> Result<LogAction, PortalError> {
        let action = match (self.status, target) {
            (ApplicationStatus::Approved, ApplicationStatus::Processing) => LogAction::Processing,
            (ApplicationStatus::Processing, ApplicationStatus::Completed) => LogAction::Completed,
            _ => {
                return Err(PortalError::InvalidTransition {
                    from: self.status,
                    action: TransitionAction::Advance(target),
                })
            }
        };
        let now = Utc::now();
        self.status = target;
        if target == ApplicationStatus::Completed {
            self.completed_at = Some(now);
        }
        self.updated_at = now;
        Ok(action)
    }

    /// Apply a content edit. Permitted only while the status is editable.
    pub fn apply_update(&mut self, update: ApplicationUpdate) -> Result<LogAction, PortalError> {
        if !self.status.is_editable() {
            return Err(PortalError::InvalidOperation(format!(
                "application content cannot be edited in status {}",
                self.status
            )));
        }
        update.validate()?;
        if let Some(v) = update.project_name {
            self.project_name = v;
        }
        if let Some(v) = update.applicant_phone {
            self.applicant_phone = v;
        }
        if let Some(v) = update.principal_investigator {
            self.principal_investigator = v;
        }
        if let Some(v) = update.pi_department {
            self.pi_department = v;
        }
        if let Some(v) = update.irb_number {
            self.irb_number = v;
        }
        if let Some(v) = update.desired_completion_date {
            self.desired_completion_date = Some(v);
        }
        if let Some(v) = update.service_types {
            self.service_types = v;
        }
        if let Some(v) = update.unstructured_data_type {
            self.unstructured_data_type = Some(v);
        }
        if let Some(v) = update.target_patients {
            self.target_patients = v;
        }
        if let Some(v) = update.request_details {
            self.request_details = v;
        }
        self.updated_at = Utc::now();
        Ok(LogAction::Updated)
    }

    /// Soft-delete. Allowed from any non-terminal state; the status itself is
    /// left unchanged and the row is never physically removed.
    pub fn soft_delete(&mut self, actor: UserId, reason: String) -> Result<LogAction, PortalError> {
        if self.status.is_terminal() {
            return Err(PortalError::InvalidTransition {
                from: self.status,
                action: TransitionAction::Delete,
            });
        }
        let now = Utc::now();
        self.deleted = true;
        self.deleted_at = Some(now);
        self.deleted_by = Some(actor);
        self.deletion_reason = Some(reason);
        self.updated_at = now;
        Ok(LogAction::Deleted)
    }

    pub fn attachment(&self, slot: AttachmentSlot) -> Option<&AttachmentRef> {
        match slot {
            AttachmentSlot::IrbNotice => self.irb_notice.as_ref(),
            AttachmentSlot::ResearchPlan => self.research_plan.as_ref(),
        }
    }

    /// Record an uploaded document, returning the reference it replaced.
    pub fn set_attachment(
        &mut self,
        slot: AttachmentSlot,
        attachment: AttachmentRef,
    ) -> Result<Option<AttachmentRef>, PortalError> {
        if !self.status.is_editable() {
            return Err(PortalError::InvalidOperation(format!(
                "attachments cannot be changed in status {}",
                self.status
            )));
        }
        let previous = match slot {
            AttachmentSlot::IrbNotice => self.irb_notice.replace(attachment),
            AttachmentSlot::ResearchPlan => self.research_plan.replace(attachment),
        };
        self.updated_at = Utc::now();
        Ok(previous)
    }

    /// Null the slot reference. The stored file is deliberately left alone.
    pub fn clear_attachment(
        &mut self,
        slot: AttachmentSlot,
    ) -> Result<Option<AttachmentRef>, PortalError> {
        if !self.status.is_editable() {
            return Err(PortalError::InvalidOperation(format!(
                "attachments cannot be changed in status {}",
                self.status
            )));
        }
        let previous = match slot {
            AttachmentSlot::IrbNotice => self.irb_notice.take(),
            AttachmentSlot::ResearchPlan => self.research_plan.take(),
        };
        self.updated_at = Utc::now();
        Ok(previous)
    }
}
