// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::application::{ApplicationId, AttachmentSlot};

/// Document storage collaborator. The portal core only ever deals in opaque
/// path strings returned by `store`.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store the contents under the application's directory and return the
    /// path to record on the application row.
    async fn store(
        &self,
        application_id: ApplicationId,
        file_name: &str,
        contents: &[u8],
    ) -> Result<String, FileStoreError>;

    /// Remove a previously stored file. Missing files are not an error.
    async fn remove(&self, path: &str) -> Result<(), FileStoreError>;

    /// Whether a stored file still exists.
    async fn exists(&self, path: &str) -> bool;
}

#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for FileStoreError {
    fn from(err: std::io::Error) -> Self {
        FileStoreError::Io(err.to_string())
    }
}

const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "hwp"];

/// Normalize an uploaded filename to the last path segment, defaulting to
/// "document" when the client sent nothing usable.
pub fn normalize_original_name(original: &str) -> String {
    let name = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() {
        "document".to_string()
    } else {
        name.to_string()
    }
}

/// Unique stored filename for a slot: `{slot}_{timestamp}_{uuid}.{ext}`.
/// Extensions outside the allowlist fall back to `pdf`.
pub fn stored_file_name(slot: AttachmentSlot, original_name: &str) -> String {
    let ext = original_name
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
        .unwrap_or_else(|| "pdf".to_string());
    format!(
        "{}_{}_{}.{}",
        slot.as_str(),
        Utc::now().format("%Y%m%d_%H%M%S"),
        Uuid::new_v4().simple(),
        ext
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_path_components() {
        assert_eq!(normalize_original_name("plan.pdf"), "plan.pdf");
        assert_eq!(normalize_original_name("dir/plan.pdf"), "plan.pdf");
        assert_eq!(normalize_original_name("C:\\docs\\plan.pdf"), "plan.pdf");
        assert_eq!(normalize_original_name("  "), "document");
        assert_eq!(normalize_original_name(""), "document");
    }

    #[test]
    fn stored_names_keep_allowed_extensions() {
        let name = stored_file_name(AttachmentSlot::ResearchPlan, "plan.DOCX");
        assert!(name.starts_with("research_plan_"));
        assert!(name.ends_with(".docx"));
    }

    #[test]
    fn stored_names_fall_back_to_pdf() {
        let name = stored_file_name(AttachmentSlot::IrbNotice, "notice.exe");
        assert!(name.ends_with(".pdf"));
        let name = stored_file_name(AttachmentSlot::IrbNotice, "no-extension");
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn stored_names_are_unique_per_call() {
        let a = stored_file_name(AttachmentSlot::IrbNotice, "n.pdf");
        let b = stored_file_name(AttachmentSlot::IrbNotice, "n.pdf");
        assert_ne!(a, b);
    }
}
