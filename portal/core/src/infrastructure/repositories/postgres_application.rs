// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Application Repository
//!
//! Production `ApplicationRepository` implementation backed by the
//! `applications` table via `sqlx`. Soft deletion is stored as the legacy
//! `dcyn` flag (`'N'` live, `'Y'` deleted).
//!
//! Transition commits run `UPDATE … WHERE id = $1 AND status = $expected AND
//! dcyn = 'N'` and the audit-row insert inside one transaction; zero affected
//! rows means a concurrent transition won and the whole commit is rolled
//! back with `RepositoryError::Conflict`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::domain::application::{
    Application, ApplicationId, ApplicationStatus, AttachmentRef, ServiceType,
};
use crate::domain::log::ApplicationLog;
use crate::domain::repository::{ApplicationQuery, ApplicationRepository, RepositoryError};
use crate::domain::user::UserId;
use crate::domain::visibility::Visibility;

pub struct PostgresApplicationRepository {
    pool: PgPool,
}

impl PostgresApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<Application, RepositoryError> {
        let status_str: String = row.try_get("status")?;
        let status = ApplicationStatus::parse(&status_str).ok_or_else(|| {
            RepositoryError::Serialization(format!("unknown application status '{status_str}'"))
        })?;

        let service_types_val: serde_json::Value = row.try_get("service_types")?;
        let service_types: Vec<ServiceType> = serde_json::from_value(service_types_val)?;

        let irb_notice = attachment_from_columns(
            row.try_get("irb_notice_path")?,
            row.try_get("irb_notice_name")?,
        );
        let research_plan = attachment_from_columns(
            row.try_get("research_plan_path")?,
            row.try_get("research_plan_name")?,
        );

        let dcyn: String = row.try_get("dcyn")?;

        Ok(Application {
            id: ApplicationId(row.try_get::<Uuid, _>("id")?),
            owner_id: UserId(row.try_get::<Uuid, _>("owner_id")?),
            applicant_name: row.try_get("applicant_name")?,
            applicant_department: row.try_get("applicant_department")?,
            applicant_email: row.try_get("applicant_email")?,
            project_name: row.try_get("project_name")?,
            applicant_phone: row.try_get("applicant_phone")?,
            principal_investigator: row.try_get("principal_investigator")?,
            pi_department: row.try_get("pi_department")?,
            irb_number: row.try_get("irb_number")?,
            desired_completion_date: row.try_get::<Option<NaiveDate>, _>("desired_completion_date")?,
            service_types,
            unstructured_data_type: row.try_get("unstructured_data_type")?,
            target_patients: row.try_get("target_patients")?,
            request_details: row.try_get("request_details")?,
            irb_notice,
            research_plan,
            status,
            rejection_reason: row.try_get("rejection_reason")?,
            revision_request_reason: row.try_get("revision_request_reason")?,
            submitted_at: row.try_get::<Option<DateTime<Utc>>, _>("submitted_at")?,
            reviewed_at: row.try_get::<Option<DateTime<Utc>>, _>("reviewed_at")?,
            reviewed_by: row
                .try_get::<Option<Uuid>, _>("reviewed_by")?
                .map(UserId),
            completed_at: row.try_get::<Option<DateTime<Utc>>, _>("completed_at")?,
            deleted: dcyn == "Y",
            deleted_at: row.try_get::<Option<DateTime<Utc>>, _>("deleted_at")?,
            deleted_by: row.try_get::<Option<Uuid>, _>("deleted_by")?.map(UserId),
            deletion_reason: row.try_get("deletion_reason")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn attachment_from_columns(
    path: Option<String>,
    original_name: Option<String>,
) -> Option<AttachmentRef> {
    match (path, original_name) {
        (Some(path), Some(original_name)) => Some(AttachmentRef {
            path,
            original_name,
        }),
        _ => None,
    }
}

async fn insert_log<'e, E>(executor: E, log: &ApplicationLog) -> Result<(), RepositoryError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO application_logs (id, application_id, user_id, action, reason, details, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(log.id.0)
    .bind(log.application_id.0)
    .bind(log.user_id.0)
    .bind(log.action.as_str())
    .bind(&log.reason)
    .bind(&log.details)
    .bind(log.created_at)
    .execute(executor)
    .await
    .map_err(|e| RepositoryError::Database(format!("Failed to append audit log: {}", e)))?;
    Ok(())
}

#[async_trait]
impl ApplicationRepository for PostgresApplicationRepository {
    async fn insert(&self, application: &Application) -> Result<(), RepositoryError> {
        let service_types = serde_json::to_value(&application.service_types)?;
        sqlx::query(
            r#"
            INSERT INTO applications (
                id, owner_id, applicant_name, applicant_department, applicant_email,
                project_name, applicant_phone, principal_investigator, pi_department,
                irb_number, desired_completion_date, service_types,
                unstructured_data_type, target_patients, request_details,
                irb_notice_path, irb_notice_name, research_plan_path, research_plan_name,
                status, rejection_reason, revision_request_reason,
                submitted_at, reviewed_at, reviewed_by, completed_at,
                dcyn, deleted_at, deleted_by, deletion_reason,
                created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28,
                $29, $30, $31, $32
            )
            "#,
        )
        .bind(application.id.0)
        .bind(application.owner_id.0)
        .bind(&application.applicant_name)
        .bind(&application.applicant_department)
        .bind(&application.applicant_email)
        .bind(&application.project_name)
        .bind(&application.applicant_phone)
        .bind(&application.principal_investigator)
        .bind(&application.pi_department)
        .bind(&application.irb_number)
        .bind(application.desired_completion_date)
        .bind(service_types)
        .bind(&application.unstructured_data_type)
        .bind(&application.target_patients)
        .bind(&application.request_details)
        .bind(application.irb_notice.as_ref().map(|a| a.path.clone()))
        .bind(application.irb_notice.as_ref().map(|a| a.original_name.clone()))
        .bind(application.research_plan.as_ref().map(|a| a.path.clone()))
        .bind(application.research_plan.as_ref().map(|a| a.original_name.clone()))
        .bind(application.status.as_str())
        .bind(&application.rejection_reason)
        .bind(&application.revision_request_reason)
        .bind(application.submitted_at)
        .bind(application.reviewed_at)
        .bind(application.reviewed_by.map(|u| u.0))
        .bind(application.completed_at)
        .bind(if application.deleted { "Y" } else { "N" })
        .bind(application.deleted_at)
        .bind(application.deleted_by.map(|u| u.0))
        .bind(&application.deletion_reason)
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to insert application: {}", e)))?;
        Ok(())
    }

    async fn find(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM applications WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list(
        &self,
        visibility: &Visibility,
        query: &ApplicationQuery,
    ) -> Result<Vec<Application>, RepositoryError> {
        let mut sql = String::from("SELECT * FROM applications WHERE 1 = 1");
        if visibility.owner.is_some() {
            sql.push_str(" AND owner_id = $1");
        }
        if !visibility.include_deleted {
            sql.push_str(" AND dcyn = 'N'");
        }
        if query.status.is_some() {
            sql.push_str(if visibility.owner.is_some() {
                " AND status = $2"
            } else {
                " AND status = $1"
            });
        }
        sql.push_str(" ORDER BY created_at DESC OFFSET ");
        sql.push_str(&(query.offset as i64).to_string());
        sql.push_str(" LIMIT ");
        sql.push_str(&(query.limit as i64).to_string());

        let mut q = sqlx::query(&sql);
        if let Some(owner) = visibility.owner {
            q = q.bind(owner.0);
        }
        if let Some(status) = query.status {
            q = q.bind(status.as_str());
        }
        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn update_checked(
        &self,
        application: &Application,
        expected_status: ApplicationStatus,
        log: Option<&ApplicationLog>,
    ) -> Result<(), RepositoryError> {
        let service_types = serde_json::to_value(&application.service_types)?;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE applications SET
                project_name = $1,
                applicant_phone = $2,
                principal_investigator = $3,
                pi_department = $4,
                irb_number = $5,
                desired_completion_date = $6,
                service_types = $7,
                unstructured_data_type = $8,
                target_patients = $9,
                request_details = $10,
                irb_notice_path = $11,
                irb_notice_name = $12,
                research_plan_path = $13,
                research_plan_name = $14,
                status = $15,
                rejection_reason = $16,
                revision_request_reason = $17,
                submitted_at = $18,
                reviewed_at = $19,
                reviewed_by = $20,
                completed_at = $21,
                dcyn = $22,
                deleted_at = $23,
                deleted_by = $24,
                deletion_reason = $25,
                updated_at = $26
            WHERE id = $27 AND status = $28 AND dcyn = 'N'
            "#,
        )
        .bind(&application.project_name)
        .bind(&application.applicant_phone)
        .bind(&application.principal_investigator)
        .bind(&application.pi_department)
        .bind(&application.irb_number)
        .bind(application.desired_completion_date)
        .bind(service_types)
        .bind(&application.unstructured_data_type)
        .bind(&application.target_patients)
        .bind(&application.request_details)
        .bind(application.irb_notice.as_ref().map(|a| a.path.clone()))
        .bind(application.irb_notice.as_ref().map(|a| a.original_name.clone()))
        .bind(application.research_plan.as_ref().map(|a| a.path.clone()))
        .bind(application.research_plan.as_ref().map(|a| a.original_name.clone()))
        .bind(application.status.as_str())
        .bind(&application.rejection_reason)
        .bind(&application.revision_request_reason)
        .bind(application.submitted_at)
        .bind(application.reviewed_at)
        .bind(application.reviewed_by.map(|u| u.0))
        .bind(application.completed_at)
        .bind(if application.deleted { "Y" } else { "N" })
        .bind(application.deleted_at)
        .bind(application.deleted_by.map(|u| u.0))
        .bind(&application.deletion_reason)
        .bind(application.updated_at)
        .bind(application.id.0)
        .bind(expected_status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to update application: {}", e)))?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| RepositoryError::Database(e.to_string()))?;
            return Err(RepositoryError::Conflict(format!(
                "application {} no longer in status {}",
                application.id, expected_status
            )));
        }

        if let Some(log) = log {
            insert_log(&mut *tx, log).await?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }
}
