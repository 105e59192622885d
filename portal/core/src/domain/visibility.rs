// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};

use crate::domain::access::Caller;
use crate::domain::application::Application;
use crate::domain::user::UserId;

/// Effective read filter for application queries.
///
/// Built once per request from the resolved caller and applied at every read
/// boundary — listings and single fetches alike — so the soft-delete and
/// ownership rules live in exactly one place instead of being rewritten into
/// each query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    /// Restrict to one owner. `None` means all owners (admins only).
    pub owner: Option<UserId>,
    /// Whether soft-deleted rows are visible.
    pub include_deleted: bool,
}

impl Visibility {
    /// The filter a caller is entitled to. Non-admins can never widen their
    /// view: the `include_deleted` request is honored for admins only.
    pub fn for_caller(caller: &Caller, include_deleted: bool) -> Self {
        if caller.is_admin() {
            Self {
                owner: None,
                include_deleted,
            }
        } else {
            Self {
                owner: Some(caller.id()),
                include_deleted: false,
            }
        }
    }

    /// Owner-scoped filter for submit/edit paths: the row must belong to the
    /// given user and must not be soft-deleted, regardless of role.
    pub fn owned_by(owner: UserId) -> Self {
        Self {
            owner: Some(owner),
            include_deleted: false,
        }
    }

    /// Whether one application is visible under this filter.
    pub fn permits(&self, application: &Application) -> bool {
        if let Some(owner) = self.owner {
            if application.owner_id != owner {
                return false;
            }
        }
        if application.deleted && !self.include_deleted {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::{Application, ApplicationDraft, ServiceType};
    use crate::domain::user::{User, UserRole};

    fn user(role: UserRole) -> User {
        User::new(
            "u@hospital.example.org".into(),
            "hash".into(),
            "U".into(),
            role,
            None,
            None,
            None,
        )
    }

    fn app_for(owner: &User) -> Application {
        Application::new(
            owner,
            ApplicationDraft {
                project_name: "P".into(),
                applicant_phone: "010".into(),
                principal_investigator: "PI".into(),
                pi_department: "D".into(),
                irb_number: "IRB-1".into(),
                desired_completion_date: None,
                service_types: vec![ServiceType::Pseudonymization],
                unstructured_data_type: None,
                target_patients: "ten chars at least".into(),
                request_details: "twenty characters at the very least".into(),
            },
        )
    }

    #[test]
    fn researcher_sees_only_own_live_rows() {
        let owner = user(UserRole::Researcher);
        let other = user(UserRole::Researcher);
        let caller = Caller::new(owner.clone());

        // The include_deleted request is ignored for non-admins.
        let vis = Visibility::for_caller(&caller, true);
        assert_eq!(vis.owner, Some(owner.id));
        assert!(!vis.include_deleted);

        let mine = app_for(&owner);
        let theirs = app_for(&other);
        assert!(vis.permits(&mine));
        assert!(!vis.permits(&theirs));

        let mut deleted = app_for(&owner);
        deleted.submit().unwrap();
        deleted.soft_delete(other.id, "dup".into()).unwrap();
        assert!(!vis.permits(&deleted));
    }

    #[test]
    fn admin_default_hides_deleted_rows() {
        let admin = user(UserRole::Admin);
        let owner = user(UserRole::Researcher);
        let caller = Caller::new(admin);

        let vis = Visibility::for_caller(&caller, false);
        let live = app_for(&owner);
        assert!(vis.permits(&live));

        let mut deleted = app_for(&owner);
        deleted.submit().unwrap();
        deleted.soft_delete(owner.id, "dup".into()).unwrap();
        assert!(!vis.permits(&deleted));
    }

    #[test]
    fn admin_can_opt_into_deleted_rows() {
        let admin = user(UserRole::Admin);
        let owner = user(UserRole::Researcher);
        let caller = Caller::new(admin);

        let vis = Visibility::for_caller(&caller, true);
        let mut deleted = app_for(&owner);
        deleted.submit().unwrap();
        deleted.soft_delete(owner.id, "dup".into()).unwrap();
        assert!(vis.permits(&deleted));
    }
}
