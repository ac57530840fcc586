//! Storage capability for batches and trainee accounts.
//!
//! `AppState` carries an `Arc<dyn OnboardingStore>`: `PgStore` in production,
//! `InMemoryStore` for local runs without `DATABASE_URL` and for tests.
//! Uniqueness of trainee email and employee ID is enforced here, not by callers.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::batch::Batch;
use crate::models::trainee::TraineeAccount;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    EmployeeId,
}

impl std::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniqueField::Email => write!(f, "email"),
            UniqueField::EmployeeId => write!(f, "employee_id"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated on {0}")]
    Conflict(UniqueField),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Result of trying to take ownership of a batch for account creation.
#[derive(Debug)]
pub enum BatchClaim {
    Claimed(Batch),
    AlreadyCreated,
    InProgress,
    NotFound,
}

#[async_trait]
pub trait OnboardingStore: Send + Sync {
    async fn insert_batch(&self, batch: &Batch) -> Result<(), StoreError>;

    async fn get_batch(&self, id: Uuid) -> Result<Option<Batch>, StoreError>;

    async fn list_batches(&self) -> Result<Vec<Batch>, StoreError>;

    async fn list_batches_by_phase(&self, phase: i32) -> Result<Vec<Batch>, StoreError>;

    /// Atomic check-and-set: only one caller can move a batch from
    /// "not created, not processing" to "processing".
    async fn claim_batch(&self, id: Uuid) -> Result<BatchClaim, StoreError>;

    async fn mark_accounts_created(&self, id: Uuid) -> Result<(), StoreError>;

    async fn find_trainee_by_email(&self, email: &str)
        -> Result<Option<TraineeAccount>, StoreError>;

    async fn find_trainee_by_employee_id(
        &self,
        employee_id: &str,
    ) -> Result<Option<TraineeAccount>, StoreError>;

    async fn list_trainees(&self) -> Result<Vec<TraineeAccount>, StoreError>;

    /// Fails with `StoreError::Conflict` when the email or employee ID is taken.
    async fn insert_trainee(&self, trainee: &TraineeAccount) -> Result<(), StoreError>;

    /// Highest numeric suffix among employee IDs shaped `prefix-digits`.
    async fn max_employee_number(&self, prefix: &str) -> Result<Option<u32>, StoreError>;
}
