// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for the access-control gate and user directory:
//! registration, login, token resolution, and the admin self-guards.

mod common;

use atrium_core::application::{RegisterUser, UserUpdate};
use atrium_core::domain::error::PortalError;
use atrium_core::domain::token::AuthToken;
use atrium_core::domain::user::UserRole;
use chrono::Duration;
use common::{admin, portal, researcher, EMAIL_DOMAIN};

fn registration(email: &str) -> RegisterUser {
    RegisterUser {
        email: email.into(),
        password: "correct horse".into(),
        name: "New Researcher".into(),
        department: Some("Oncology".into()),
        position: None,
        phone: None,
    }
}

#[tokio::test]
async fn register_login_authenticate_revoke_roundtrip() {
    let portal = portal();
    let email = format!("newbie@{EMAIL_DOMAIN}");

    let user = portal.auth.register(registration(&email)).await.unwrap();
    assert_eq!(user.role, UserRole::Researcher);

    let issued = portal.auth.login(&email, "correct horse").await.unwrap();
    let caller = portal.auth.authenticate(&issued.token).await.unwrap();
    assert_eq!(caller.id(), user.id);
    assert!(!caller.is_admin());

    portal.auth.revoke(&issued.token).await.unwrap();
    assert!(matches!(
        portal.auth.authenticate(&issued.token).await.unwrap_err(),
        PortalError::Unauthenticated
    ));
    // Revocation is idempotent.
    portal.auth.revoke(&issued.token).await.unwrap();
}

#[tokio::test]
async fn registration_enforces_domain_and_uniqueness() {
    let portal = portal();

    assert!(matches!(
        portal
            .auth
            .register(registration("outsider@elsewhere.example"))
            .await
            .unwrap_err(),
        PortalError::Validation(_)
    ));
    assert!(matches!(
        portal.auth.register(registration("not-an-email")).await.unwrap_err(),
        PortalError::Validation(_)
    ));

    let email = format!("taken@{EMAIL_DOMAIN}");
    portal.auth.register(registration(&email)).await.unwrap();
    assert!(matches!(
        portal.auth.register(registration(&email)).await.unwrap_err(),
        PortalError::Validation(_)
    ));
}

#[tokio::test]
async fn wrong_password_and_unknown_user_collapse_to_unauthenticated() {
    let portal = portal();
    let email = format!("known@{EMAIL_DOMAIN}");
    portal.auth.register(registration(&email)).await.unwrap();

    assert!(matches!(
        portal.auth.login(&email, "wrong").await.unwrap_err(),
        PortalError::Unauthenticated
    ));
    assert!(matches!(
        portal
            .auth
            .login(&format!("ghost@{EMAIL_DOMAIN}"), "correct horse")
            .await
            .unwrap_err(),
        PortalError::Unauthenticated
    ));
}

#[tokio::test]
async fn expired_tokens_do_not_authenticate() {
    let portal = portal();
    let caller = researcher(&portal, "sleepy").await;

    let stale = AuthToken::issue(caller.id(), Duration::hours(-1));
    portal.stores.tokens.insert(&stale).await.unwrap();

    assert!(matches!(
        portal.auth.authenticate(&stale.token).await.unwrap_err(),
        PortalError::Unauthenticated
    ));
}

#[tokio::test]
async fn deactivated_and_deleted_accounts_lose_access() {
    let portal = portal();
    let director = admin(&portal, "director").await;
    let email = format!("victim@{EMAIL_DOMAIN}");
    let victim = portal.auth.register(registration(&email)).await.unwrap();

    // A live session exists before the account is touched.
    let issued = portal.auth.login(&email, "correct horse").await.unwrap();

    portal
        .users
        .set_active(&director, victim.id, false)
        .await
        .unwrap();
    assert!(matches!(
        portal.auth.login(&email, "correct horse").await.unwrap_err(),
        PortalError::Unauthenticated
    ));
    // The previously issued token dies with the deactivation.
    assert!(matches!(
        portal.auth.authenticate(&issued.token).await.unwrap_err(),
        PortalError::Unauthenticated
    ));

    portal
        .users
        .set_active(&director, victim.id, true)
        .await
        .unwrap();
    portal.auth.login(&email, "correct horse").await.unwrap();

    portal.users.delete(&director, victim.id).await.unwrap();
    assert!(matches!(
        portal.auth.login(&email, "correct horse").await.unwrap_err(),
        PortalError::Unauthenticated
    ));
    // Soft-deleted users are gone from the directory.
    let listed = portal.users.list(&director, 0, 50).await.unwrap();
    assert!(listed.iter().all(|u| u.id != victim.id));
}

#[tokio::test]
async fn admins_cannot_target_their_own_account() {
    let portal = portal();
    let director = admin(&portal, "director").await;

    assert!(matches!(
        portal
            .users
            .set_active(&director, director.id(), false)
            .await
            .unwrap_err(),
        PortalError::InvalidOperation(_)
    ));
    assert!(matches!(
        portal.users.delete(&director, director.id()).await.unwrap_err(),
        PortalError::InvalidOperation(_)
    ));
    assert!(matches!(
        portal
            .users
            .update(
                &director,
                director.id(),
                UserUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err(),
        PortalError::InvalidOperation(_)
    ));

    // Re-activating or renaming yourself is fine.
    portal
        .users
        .update(
            &director,
            director.id(),
            UserUpdate {
                name: Some("Director General".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn directory_operations_are_admin_gated() {
    let portal = portal();
    let outsider = researcher(&portal, "outsider").await;
    let director = admin(&portal, "director").await;
    let target = researcher(&portal, "target").await;

    assert!(matches!(
        portal.users.list(&outsider, 0, 10).await.unwrap_err(),
        PortalError::Forbidden
    ));
    assert!(matches!(
        portal
            .users
            .set_active(&outsider, target.id(), false)
            .await
            .unwrap_err(),
        PortalError::Forbidden
    ));
    assert!(matches!(
        portal.users.delete(&outsider, target.id()).await.unwrap_err(),
        PortalError::Forbidden
    ));

    // Promotion and credential reset through the directory service.
    let promoted = portal
        .users
        .update(
            &director,
            target.id(),
            UserUpdate {
                role: Some(UserRole::Admin),
                password: Some("new secret".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(promoted.role, UserRole::Admin);

    let email = format!("target@{EMAIL_DOMAIN}");
    portal.auth.login(&email, "new secret").await.unwrap();
}

#[tokio::test]
async fn unknown_users_in_directory_are_not_found() {
    let portal = portal();
    let director = admin(&portal, "director").await;
    let ghost = atrium_core::domain::user::UserId::new();

    assert!(matches!(
        portal.users.delete(&director, ghost).await.unwrap_err(),
        PortalError::NotFound
    ));
    assert!(matches!(
        portal
            .users
            .set_active(&director, ghost, false)
            .await
            .unwrap_err(),
        PortalError::NotFound
    ));
}
