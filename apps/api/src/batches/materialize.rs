//! Batch/Account Materializer.
//!
//! Persist step: allocator output becomes batch records. Account step: one
//! persisted batch becomes live trainee accounts, exactly once.
//!
//! Idempotency rests on the store: `claim_batch` is an atomic check-and-set,
//! and the unique constraints on email and employee ID are the final word on
//! duplicates. The email pre-check only saves a provisioning round-trip.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::allocation::Allocation;
use crate::models::batch::{Batch, OVERFLOW_SKILL};
use crate::models::trainee::{TraineeAccount, STATUS_ACTIVE};
use crate::notify::{NotificationOutcome, Notifier, Recipient, WelcomeMessage};
use crate::provisioning::CredentialProvisioner;
use crate::store::{BatchClaim, OnboardingStore, StoreError, UniqueField};

/// Batch number given to the overflow batch.
pub const OVERFLOW_BATCH_NUMBER: i32 = 0;

/// Writes one batch per non-empty skill bucket, then one overflow batch if
/// anything spilled. Each batch is written only after its trainee list is final.
pub async fn persist_allocation(
    store: &dyn OnboardingStore,
    allocation: Allocation,
    phase: i32,
    batch_number: i32,
) -> Result<Vec<Batch>, StoreError> {
    let now = Utc::now();
    let mut batches: Vec<Batch> = allocation
        .buckets
        .into_iter()
        .filter(|bucket| !bucket.trainees.is_empty())
        .map(|bucket| Batch::new(batch_number, bucket.skill, phase, false, bucket.trainees, now))
        .collect();

    if !allocation.overflow.is_empty() {
        batches.push(Batch::new(
            OVERFLOW_BATCH_NUMBER,
            OVERFLOW_SKILL,
            phase,
            true,
            allocation.overflow,
            now,
        ));
    }

    for batch in &batches {
        store.insert_batch(batch).await?;
        info!(
            "Persisted batch {} (skill={}, phase={}, trainees={})",
            batch.id,
            batch.skill,
            batch.phase,
            batch.trainees.len()
        );
    }

    Ok(batches)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    AlreadyExists,
    EmployeeIdConflict,
    StorageError,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraineeFailure {
    pub name: String,
    pub email: String,
    pub reason: FailureReason,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedTrainee {
    pub name: String,
    pub email: String,
    pub employee_id: String,
    pub notification: NotificationOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreationSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountCreationReport {
    pub created: Vec<CreatedTrainee>,
    pub failed: Vec<TraineeFailure>,
    pub summary: CreationSummary,
}

impl AccountCreationReport {
    fn from_outcomes(outcomes: Vec<Result<CreatedTrainee, TraineeFailure>>) -> Self {
        let total = outcomes.len();
        let (created, failed): (Vec<_>, Vec<_>) = outcomes.into_iter().partition(Result::is_ok);
        let created: Vec<CreatedTrainee> = created.into_iter().filter_map(Result::ok).collect();
        let failed: Vec<TraineeFailure> = failed.into_iter().filter_map(Result::err).collect();
        let summary = CreationSummary {
            total,
            succeeded: created.len(),
            failed: failed.len(),
        };
        Self {
            created,
            failed,
            summary,
        }
    }
}

#[derive(Debug)]
pub enum BatchAccountsOutcome {
    AlreadyCreated,
    Created(AccountCreationReport),
}

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("batch {0} not found")]
    BatchNotFound(Uuid),

    #[error("account creation for batch {0} is already in progress")]
    InProgress(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One account to create. `name` comes from the resume or the caller; when
/// absent the provisioner's generated name is used.
#[derive(Debug, Clone)]
pub struct NewTrainee {
    pub name: Option<String>,
    pub email: String,
    pub phase: i32,
    pub specialization: String,
    pub batch_id: Option<Uuid>,
}

pub struct AccountMaterializer {
    store: Arc<dyn OnboardingStore>,
    provisioner: Arc<CredentialProvisioner>,
    notifier: Arc<dyn Notifier>,
    company_name: String,
}

impl AccountMaterializer {
    pub fn new(
        store: Arc<dyn OnboardingStore>,
        provisioner: Arc<CredentialProvisioner>,
        notifier: Arc<dyn Notifier>,
        company_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            provisioner,
            notifier,
            company_name: company_name.into(),
        }
    }

    /// Creates accounts for every trainee embedded in the batch, in stored
    /// order. Per-trainee problems land in the report; the batch is marked
    /// processed afterwards regardless.
    pub async fn create_accounts_for_batch(
        &self,
        batch_id: Uuid,
    ) -> Result<BatchAccountsOutcome, MaterializeError> {
        let batch = match self.store.claim_batch(batch_id).await? {
            BatchClaim::Claimed(batch) => batch,
            BatchClaim::AlreadyCreated => {
                info!("Batch {batch_id} already processed; skipping");
                return Ok(BatchAccountsOutcome::AlreadyCreated);
            }
            BatchClaim::InProgress => return Err(MaterializeError::InProgress(batch_id)),
            BatchClaim::NotFound => return Err(MaterializeError::BatchNotFound(batch_id)),
        };

        let specialization = batch.specialization().to_string();
        let requests: Vec<NewTrainee> = batch
            .trainees
            .iter()
            .map(|trainee| NewTrainee {
                name: Some(trainee.name.clone()),
                email: trainee.email.clone(),
                phase: batch.phase,
                specialization: specialization.clone(),
                batch_id: Some(batch.id),
            })
            .collect();
        let report = self.create_accounts(requests).await;

        if let Err(e) = self.store.mark_accounts_created(batch.id).await {
            // Accounts below exist and were notified; the batch stays claimed.
            let employee_ids: Vec<&str> = report
                .created
                .iter()
                .map(|c| c.employee_id.as_str())
                .collect();
            error!(
                "Batch {} could not be marked processed after {} created, {} failed ({}): {e}",
                batch.id,
                report.summary.succeeded,
                report.summary.failed,
                employee_ids.join(", ")
            );
            return Err(e.into());
        }
        info!(
            "Batch {} processed: {} created, {} failed",
            batch.id, report.summary.succeeded, report.summary.failed
        );

        Ok(BatchAccountsOutcome::Created(report))
    }

    /// Sequential per-trainee creation; one failure never stops the rest.
    pub async fn create_accounts(
        &self,
        requests: Vec<NewTrainee>,
    ) -> AccountCreationReport {
        let mut outcomes = Vec::new();
        for request in requests {
            outcomes.push(self.create_account(request).await);
        }
        AccountCreationReport::from_outcomes(outcomes)
    }

    pub async fn create_account(
        &self,
        request: NewTrainee,
    ) -> Result<CreatedTrainee, TraineeFailure> {
        let email = request.email.trim().to_lowercase();
        let display_name = request
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let fail = |reason: FailureReason| TraineeFailure {
            name: display_name.clone().unwrap_or_default(),
            email: email.clone(),
            reason,
        };

        match self.store.find_trainee_by_email(&email).await {
            Ok(Some(_)) => {
                warn!("Trainee already exists: {email}");
                return Err(fail(FailureReason::AlreadyExists));
            }
            Ok(None) => {}
            Err(e) => {
                error!("Lookup failed for {email}: {e}");
                return Err(fail(FailureReason::StorageError));
            }
        }

        let employee_id = match self.provisioner.next_employee_id().await {
            Ok(id) => id,
            Err(e) => {
                error!("Employee ID allocation failed for {email}: {e}");
                return Err(fail(FailureReason::StorageError));
            }
        };
        let profile = self.provisioner.generate_profile(&email).await;
        let name = display_name.clone().unwrap_or(profile.name);

        let account = TraineeAccount {
            id: Uuid::new_v4(),
            name: name.clone(),
            email: email.clone(),
            employee_id: employee_id.clone(),
            password: profile.password,
            password_is_temporary: true,
            phase: request.phase,
            progress: 0,
            score: 0,
            status: STATUS_ACTIVE.to_string(),
            specialization: request.specialization,
            batch_id: request.batch_id,
            created_at: Utc::now(),
            last_login: None,
        };

        if let Err(e) = self.store.insert_trainee(&account).await {
            let reason = match e {
                StoreError::Conflict(UniqueField::Email) => FailureReason::AlreadyExists,
                StoreError::Conflict(UniqueField::EmployeeId) => FailureReason::EmployeeIdConflict,
                _ => FailureReason::StorageError,
            };
            warn!("Insert failed for {email} ({employee_id}): {e}");
            return Err(TraineeFailure {
                name,
                email,
                reason,
            });
        }

        let recipient = Recipient {
            name: name.clone(),
            email: email.clone(),
        };
        let message = WelcomeMessage {
            name: name.clone(),
            employee_id: employee_id.clone(),
            temporary_password: account.password,
            company: self.company_name.clone(),
        };
        let delivery = self.notifier.send(&recipient, &message).await;
        let notification = NotificationOutcome::from(delivery);
        if notification.delivered {
            info!("Account {employee_id} created for {email}; welcome message sent");
        } else {
            warn!(
                "Account {employee_id} created for {email}; welcome message failed: {}",
                notification.detail
            );
        }

        Ok(CreatedTrainee {
            name,
            email,
            employee_id,
            notification,
        })
    }
}
