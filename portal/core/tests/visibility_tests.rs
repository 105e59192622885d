// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for the visibility policy and attachment handling:
//! soft-deleted rows, ownership collapse to NotFound, and slot semantics.

mod common;

use atrium_core::domain::application::{ApplicationStatus, AttachmentSlot, ReviewDecision};
use atrium_core::domain::error::PortalError;
use atrium_core::domain::log::LogAction;
use atrium_core::domain::repository::ApplicationQuery;
use atrium_core::domain::storage::FileStore;
use common::{admin, draft, portal, researcher};

#[tokio::test]
async fn soft_deleted_rows_hide_from_everyone_but_opted_in_admins() {
    let portal = portal();
    let owner = researcher(&portal, "owner").await;
    let reviewer = admin(&portal, "reviewer").await;

    let app = portal.applications.create(&owner, draft()).await.unwrap();
    let stored = portal
        .attachments
        .upload(&owner, app.id, AttachmentSlot::IrbNotice, "notice.pdf", b"%PDF-")
        .await
        .unwrap();
    let path = stored.irb_notice.as_ref().unwrap().path.clone();

    portal.applications.submit(&owner, app.id).await.unwrap();
    portal
        .applications
        .delete(&reviewer, app.id, "withdrawn by phone".into())
        .await
        .unwrap();

    // Owner: gone from list and fetch, even when asking for deleted rows.
    assert!(portal
        .applications
        .list(&owner, true, ApplicationQuery::default())
        .await
        .unwrap()
        .is_empty());
    assert!(matches!(
        portal.applications.get(&owner, app.id, true).await.unwrap_err(),
        PortalError::NotFound
    ));

    // Admin default: also hidden.
    assert!(portal
        .applications
        .list(&reviewer, false, ApplicationQuery::default())
        .await
        .unwrap()
        .is_empty());

    // Admin with the explicit flag: visible, deletion metadata intact.
    let rows = portal
        .applications
        .list(&reviewer, true, ApplicationQuery::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].deleted);
    assert_eq!(rows[0].deleted_by, Some(reviewer.id()));
    assert_eq!(rows[0].status, ApplicationStatus::Submitted);

    let detail = portal
        .applications
        .get(&reviewer, app.id, true)
        .await
        .unwrap();
    assert_eq!(
        detail.application.deletion_reason.as_deref(),
        Some("withdrawn by phone")
    );

    // Soft deletion never touches stored attachments.
    assert!(portal.files.exists(&path).await);
    assert_eq!(portal.files.file_count(), 1);
}

#[tokio::test]
async fn non_owner_fetch_is_not_found_never_forbidden() {
    let portal = portal();
    let alice = researcher(&portal, "alice").await;
    let bob = researcher(&portal, "bob").await;

    let app = portal.applications.create(&alice, draft()).await.unwrap();

    let err = portal.applications.get(&bob, app.id, false).await.unwrap_err();
    assert!(matches!(err, PortalError::NotFound));

    assert!(portal
        .applications
        .list(&bob, false, ApplicationQuery::default())
        .await
        .unwrap()
        .is_empty());

    // Same collapse for the audit trail and for owner-scoped mutations.
    assert!(matches!(
        portal.applications.audit_trail(&bob, app.id).await.unwrap_err(),
        PortalError::NotFound
    ));
    assert!(matches!(
        portal.applications.submit(&bob, app.id).await.unwrap_err(),
        PortalError::NotFound
    ));
}

#[tokio::test]
async fn admin_listing_spans_all_owners_with_filters() {
    let portal = portal();
    let alice = researcher(&portal, "alice").await;
    let bob = researcher(&portal, "bob").await;
    let reviewer = admin(&portal, "reviewer").await;

    let a = portal.applications.create(&alice, draft()).await.unwrap();
    portal.applications.create(&bob, draft()).await.unwrap();
    portal.applications.submit(&alice, a.id).await.unwrap();

    let all = portal
        .applications
        .list(&reviewer, false, ApplicationQuery::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let submitted = portal
        .applications
        .list(
            &reviewer,
            false,
            ApplicationQuery {
                status: Some(ApplicationStatus::Submitted),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].id, a.id);

    let paged = portal
        .applications
        .list(
            &reviewer,
            false,
            ApplicationQuery {
                status: None,
                offset: 0,
                limit: 1,
            },
        )
        .await
        .unwrap();
    assert_eq!(paged.len(), 1);
}

#[tokio::test]
async fn detail_view_joins_owner_and_reviewer_names() {
    let portal = portal();
    let owner = researcher(&portal, "owner").await;
    let reviewer = admin(&portal, "reviewer").await;

    let app = portal.applications.create(&owner, draft()).await.unwrap();
    portal.applications.submit(&owner, app.id).await.unwrap();
    portal
        .applications
        .review(&reviewer, app.id, ReviewDecision::Approve, None)
        .await
        .unwrap();

    let detail = portal.applications.get(&owner, app.id, false).await.unwrap();
    assert_eq!(detail.owner_name, "owner");
    assert_eq!(detail.owner_email, format!("owner@{}", common::EMAIL_DOMAIN));
    assert_eq!(detail.reviewer_name.as_deref(), Some("reviewer"));
}

#[tokio::test]
async fn upload_replaces_prior_file_and_clear_keeps_it() {
    let portal = portal();
    let owner = researcher(&portal, "owner").await;

    let app = portal.applications.create(&owner, draft()).await.unwrap();

    let first = portal
        .attachments
        .upload(&owner, app.id, AttachmentSlot::ResearchPlan, "plan-v1.pdf", b"v1")
        .await
        .unwrap();
    let first_path = first.research_plan.as_ref().unwrap().path.clone();
    assert_eq!(portal.files.file_count(), 1);

    // Replacement stores the new file and removes the old one.
    let second = portal
        .attachments
        .upload(&owner, app.id, AttachmentSlot::ResearchPlan, "plan-v2.pdf", b"v2")
        .await
        .unwrap();
    let second_path = second.research_plan.as_ref().unwrap().path.clone();
    assert_ne!(first_path, second_path);
    assert!(!portal.files.exists(&first_path).await);
    assert!(portal.files.exists(&second_path).await);
    assert_eq!(
        second.research_plan.as_ref().unwrap().original_name,
        "plan-v2.pdf"
    );

    // Clearing nulls the reference but leaves the stored file alone.
    let cleared = portal
        .attachments
        .clear(&owner, app.id, AttachmentSlot::ResearchPlan)
        .await
        .unwrap();
    assert!(cleared.research_plan.is_none());
    assert!(portal.files.exists(&second_path).await);

    let trail = portal
        .applications
        .audit_trail(&owner, app.id)
        .await
        .unwrap();
    let last = trail.last().unwrap();
    assert_eq!(last.action, LogAction::Updated);
    assert_eq!(last.reason.as_deref(), Some("removed research_plan attachment"));
}

#[tokio::test]
async fn uploads_are_gated_by_status_size_and_ownership() {
    let portal = portal();
    let owner = researcher(&portal, "owner").await;
    let other = researcher(&portal, "other").await;

    let app = portal.applications.create(&owner, draft()).await.unwrap();

    // Not the owner: the application does not exist for them.
    assert!(matches!(
        portal
            .attachments
            .upload(&other, app.id, AttachmentSlot::IrbNotice, "n.pdf", b"x")
            .await
            .unwrap_err(),
        PortalError::NotFound
    ));

    // Oversized payloads are refused before anything is stored.
    let oversized = vec![0u8; (10 * 1024 * 1024 + 1) as usize];
    assert!(matches!(
        portal
            .attachments
            .upload(&owner, app.id, AttachmentSlot::IrbNotice, "n.pdf", &oversized)
            .await
            .unwrap_err(),
        PortalError::Validation(_)
    ));
    assert_eq!(portal.files.file_count(), 0);

    // After submission the slots are frozen.
    portal.applications.submit(&owner, app.id).await.unwrap();
    assert!(matches!(
        portal
            .attachments
            .upload(&owner, app.id, AttachmentSlot::IrbNotice, "n.pdf", b"x")
            .await
            .unwrap_err(),
        PortalError::InvalidOperation(_)
    ));
}
