// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;

use crate::domain::application::{Application, ReviewDecision};

/// Outbound mail collaborator. Notification failures are reported but never
/// roll back the transition they follow.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Tell the applicant how their application was reviewed.
    async fn send_review_outcome(
        &self,
        application: &Application,
        decision: ReviewDecision,
        reason: Option<&str>,
    ) -> Result<(), MailerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}
