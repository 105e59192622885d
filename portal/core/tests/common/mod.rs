// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Shared wiring for integration tests: in-memory stores behind the real
//! services, plus helpers to mint researcher and admin callers.

#![allow(dead_code)]

use std::sync::Arc;

use atrium_core::application::{
    ApplicationService, AttachmentService, AuthService, PortalStores, UserDirectoryService,
};
use atrium_core::domain::access::{Caller, CredentialHasher};
use atrium_core::domain::application::{ApplicationDraft, ServiceType};
use atrium_core::domain::config::{AuthConfig, UploadConfig};
use atrium_core::domain::user::{User, UserRole};
use atrium_core::infrastructure::{InMemoryFileStore, LogMailer, Sha256CredentialHasher};

pub const EMAIL_DOMAIN: &str = "hospital.example.org";

pub struct TestPortal {
    pub stores: PortalStores,
    pub files: InMemoryFileStore,
    pub hasher: Arc<Sha256CredentialHasher>,
    pub applications: Arc<ApplicationService>,
    pub attachments: Arc<AttachmentService>,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDirectoryService>,
}

pub fn portal() -> TestPortal {
    let stores = PortalStores::in_memory();
    let files = InMemoryFileStore::new();
    let hasher = Arc::new(Sha256CredentialHasher::new());

    let applications = Arc::new(ApplicationService::new(
        stores.applications.clone(),
        stores.logs.clone(),
        stores.users.clone(),
        Arc::new(LogMailer::new()),
    ));
    let attachments = Arc::new(AttachmentService::new(
        stores.applications.clone(),
        Arc::new(files.clone()),
        UploadConfig::default(),
    ));
    let auth = Arc::new(AuthService::new(
        stores.users.clone(),
        stores.tokens.clone(),
        hasher.clone(),
        AuthConfig {
            allowed_email_domain: Some(EMAIL_DOMAIN.to_string()),
            token_ttl_hours: 12,
        },
    ));
    let users = Arc::new(UserDirectoryService::new(
        stores.users.clone(),
        hasher.clone(),
    ));

    TestPortal {
        stores,
        files,
        hasher,
        applications,
        attachments,
        auth,
        users,
    }
}

async fn seed_user(portal: &TestPortal, name: &str, role: UserRole) -> Caller {
    let user = User::new(
        format!("{}@{}", name, EMAIL_DOMAIN),
        portal.hasher.hash("secret"),
        name.to_string(),
        role,
        Some("Biostatistics".into()),
        None,
        Some("010-0000-0000".into()),
    );
    portal.stores.users.insert(&user).await.unwrap();
    Caller::new(user)
}

pub async fn researcher(portal: &TestPortal, name: &str) -> Caller {
    seed_user(portal, name, UserRole::Researcher).await
}

pub async fn admin(portal: &TestPortal, name: &str) -> Caller {
    seed_user(portal, name, UserRole::Admin).await
}

pub fn draft() -> ApplicationDraft {
    ApplicationDraft {
        project_name: "Sepsis early-warning model".into(),
        applicant_phone: "010-1234-5678".into(),
        principal_investigator: "Dr. Park".into(),
        pi_department: "Emergency Medicine".into(),
        irb_number: "IRB-2026-0142".into(),
        desired_completion_date: None,
        service_types: vec![ServiceType::StructuredExtraction],
        unstructured_data_type: None,
        target_patients: "Adult ED admissions with suspected infection".into(),
        request_details: "Vitals, labs and outcomes for ED admissions over three years".into(),
    }
}
