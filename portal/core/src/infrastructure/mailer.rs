// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Tracing-backed mailer.
//!
//! Records review-outcome notifications in the log stream instead of
//! sending them; deployments wire a real delivery backend behind the same
//! `Mailer` trait.

use async_trait::async_trait;
use tracing::info;

use crate::domain::application::{Application, ReviewDecision};
use crate::domain::notify::{Mailer, MailerError};

#[derive(Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_review_outcome(
        &self,
        application: &Application,
        decision: ReviewDecision,
        reason: Option<&str>,
    ) -> Result<(), MailerError> {
        info!(
            to = %application.applicant_email,
            application = %application.id,
            decision = ?decision,
            reason = reason.unwrap_or(""),
            "review outcome notification"
        );
        Ok(())
    }
}
