use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::batch::{Batch, ExtractedCandidate};
use crate::models::trainee::TraineeAccount;
use crate::provisioning::employee_id::employee_id_pattern;
use crate::store::{BatchClaim, OnboardingStore, StoreError, UniqueField};

const EMAIL_CONSTRAINT: &str = "trainees_email_unique";
const EMPLOYEE_ID_CONSTRAINT: &str = "trainees_employee_id_unique";

/// Row shape of `batches`; the embedded trainee list is JSONB.
#[derive(Debug, FromRow)]
struct BatchRecord {
    id: Uuid,
    batch_number: i32,
    skill: String,
    phase: i32,
    is_overflow: bool,
    trainees: Json<Vec<ExtractedCandidate>>,
    created_at: DateTime<Utc>,
    accounts_created: bool,
    processing_started_at: Option<DateTime<Utc>>,
}

impl From<BatchRecord> for Batch {
    fn from(record: BatchRecord) -> Self {
        Batch {
            id: record.id,
            batch_number: record.batch_number,
            skill: record.skill,
            phase: record.phase,
            is_overflow: record.is_overflow,
            trainees: record.trainees.0,
            created_at: record.created_at,
            accounts_created: record.accounts_created,
            processing_started_at: record.processing_started_at,
        }
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OnboardingStore for PgStore {
    async fn insert_batch(&self, batch: &Batch) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO batches
                (id, batch_number, skill, phase, is_overflow, trainees,
                 created_at, accounts_created, processing_started_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(batch.id)
        .bind(batch.batch_number)
        .bind(&batch.skill)
        .bind(batch.phase)
        .bind(batch.is_overflow)
        .bind(Json(&batch.trainees))
        .bind(batch.created_at)
        .bind(batch.accounts_created)
        .bind(batch.processing_started_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_batch(&self, id: Uuid) -> Result<Option<Batch>, StoreError> {
        let record = sqlx::query_as::<_, BatchRecord>("SELECT * FROM batches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record.map(Batch::from))
    }

    async fn list_batches(&self) -> Result<Vec<Batch>, StoreError> {
        let records = sqlx::query_as::<_, BatchRecord>(
            "SELECT * FROM batches ORDER BY created_at ASC, batch_number DESC, skill ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records.into_iter().map(Batch::from).collect())
    }

    async fn list_batches_by_phase(&self, phase: i32) -> Result<Vec<Batch>, StoreError> {
        let records = sqlx::query_as::<_, BatchRecord>(
            "SELECT * FROM batches WHERE phase = $1 ORDER BY created_at ASC, batch_number DESC, skill ASC",
        )
        .bind(phase)
        .fetch_all(&self.pool)
        .await?;
        Ok(records.into_iter().map(Batch::from).collect())
    }

    async fn claim_batch(&self, id: Uuid) -> Result<BatchClaim, StoreError> {
        let claimed = sqlx::query_as::<_, BatchRecord>(
            r#"
            UPDATE batches
            SET processing_started_at = now()
            WHERE id = $1 AND accounts_created = FALSE AND processing_started_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(record) = claimed {
            return Ok(BatchClaim::Claimed(record.into()));
        }

        let state: Option<(bool,)> =
            sqlx::query_as("SELECT accounts_created FROM batches WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(match state {
            None => BatchClaim::NotFound,
            Some((true,)) => BatchClaim::AlreadyCreated,
            Some((false,)) => BatchClaim::InProgress,
        })
    }

    async fn mark_accounts_created(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE batches SET accounts_created = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_trainee_by_email(
        &self,
        email: &str,
    ) -> Result<Option<TraineeAccount>, StoreError> {
        Ok(
            sqlx::query_as::<_, TraineeAccount>("SELECT * FROM trainees WHERE email = $1")
                .bind(email.to_lowercase())
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_trainee_by_employee_id(
        &self,
        employee_id: &str,
    ) -> Result<Option<TraineeAccount>, StoreError> {
        Ok(
            sqlx::query_as::<_, TraineeAccount>("SELECT * FROM trainees WHERE employee_id = $1")
                .bind(employee_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_trainees(&self) -> Result<Vec<TraineeAccount>, StoreError> {
        Ok(
            sqlx::query_as::<_, TraineeAccount>("SELECT * FROM trainees ORDER BY employee_id ASC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn insert_trainee(&self, trainee: &TraineeAccount) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trainees
                (id, name, email, employee_id, password, password_is_temporary,
                 phase, progress, score, status, specialization, batch_id,
                 created_at, last_login)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(trainee.id)
        .bind(&trainee.name)
        .bind(trainee.email.to_lowercase())
        .bind(&trainee.employee_id)
        .bind(&trainee.password)
        .bind(trainee.password_is_temporary)
        .bind(trainee.phase)
        .bind(trainee.progress)
        .bind(trainee.score)
        .bind(&trainee.status)
        .bind(&trainee.specialization)
        .bind(trainee.batch_id)
        .bind(trainee.created_at)
        .bind(trainee.last_login)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        Ok(())
    }

    async fn max_employee_number(&self, prefix: &str) -> Result<Option<u32>, StoreError> {
        let max: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT MAX(CAST(SUBSTRING(employee_id FROM '[0-9]+$') AS BIGINT))
            FROM trainees
            WHERE employee_id ~ $1
            "#,
        )
        .bind(employee_id_pattern(prefix))
        .fetch_one(&self.pool)
        .await?;

        Ok(max.map(|n| u32::try_from(n).unwrap_or(u32::MAX)))
    }
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(EMAIL_CONSTRAINT) => return StoreError::Conflict(UniqueField::Email),
                Some(EMPLOYEE_ID_CONSTRAINT) => {
                    return StoreError::Conflict(UniqueField::EmployeeId)
                }
                _ => {}
            }
        }
    }
    StoreError::Database(err)
}
