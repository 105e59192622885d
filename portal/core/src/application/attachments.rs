// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Attachment slot management.
//!
//! Each application carries two optional document slots (IRB notice and
//! research plan). Uploading replaces and removes any file previously in the
//! slot; clearing nulls the reference but leaves the stored file alone.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::access::Caller;
use crate::domain::application::{Application, ApplicationId, AttachmentRef, AttachmentSlot};
use crate::domain::config::UploadConfig;
use crate::domain::error::PortalError;
use crate::domain::log::{ApplicationLog, LogAction};
use crate::domain::repository::ApplicationRepository;
use crate::domain::storage::{normalize_original_name, stored_file_name, FileStore};
use crate::domain::visibility::Visibility;

pub struct AttachmentService {
    applications: Arc<dyn ApplicationRepository>,
    files: Arc<dyn FileStore>,
    config: UploadConfig,
}

impl AttachmentService {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        files: Arc<dyn FileStore>,
        config: UploadConfig,
    ) -> Self {
        Self {
            applications,
            files,
            config,
        }
    }

    /// Store an uploaded document into the slot, replacing any prior file.
    pub async fn upload(
        &self,
        caller: &Caller,
        id: ApplicationId,
        slot: AttachmentSlot,
        original_name: &str,
        contents: &[u8],
    ) -> Result<Application, PortalError> {
        let mut application = self.fetch_owned(caller, id).await?;
        if !application.status.is_editable() {
            return Err(PortalError::InvalidOperation(format!(
                "attachments cannot be changed in status {}",
                application.status
            )));
        }
        if contents.len() as u64 > self.config.max_file_bytes {
            return Err(PortalError::Validation(format!(
                "file exceeds the maximum size of {} bytes",
                self.config.max_file_bytes
            )));
        }

        let original_name = normalize_original_name(original_name);
        let file_name = stored_file_name(slot, &original_name);
        let path = self.files.store(id, &file_name, contents).await?;

        let expected = application.status;
        let previous = application.set_attachment(
            slot,
            AttachmentRef {
                path,
                original_name: original_name.clone(),
            },
        )?;
        self.applications
            .update_checked(&application, expected, None)
            .await?;

        // The replaced file is best-effort cleanup; the new reference is
        // already committed.
        if let Some(previous) = previous {
            if let Err(err) = self.files.remove(&previous.path).await {
                warn!(application = %id, path = %previous.path, error = %err,
                    "failed to remove replaced attachment");
            }
        }
        info!(application = %id, slot = %slot, name = %original_name, "attachment stored");
        Ok(application)
    }

    /// Null the slot reference. The stored file stays on disk.
    pub async fn clear(
        &self,
        caller: &Caller,
        id: ApplicationId,
        slot: AttachmentSlot,
    ) -> Result<Application, PortalError> {
        let mut application = self.fetch_owned(caller, id).await?;
        let expected = application.status;
        application.clear_attachment(slot)?;

        let log = ApplicationLog::new(id, caller.id(), LogAction::Updated)
            .with_reason(format!("removed {} attachment", slot));
        self.applications
            .update_checked(&application, expected, Some(&log))
            .await?;
        info!(application = %id, slot = %slot, "attachment cleared");
        Ok(application)
    }

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
}
