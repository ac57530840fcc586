use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::batch::Batch;
use crate::models::trainee::TraineeAccount;
use crate::provisioning::employee_id::parse_employee_number;
use crate::store::{BatchClaim, OnboardingStore, StoreError, UniqueField};

#[derive(Default)]
struct Tables {
    batches: Vec<Batch>,
    trainees: Vec<TraineeAccount>,
}

/// Process-local store. Enforces the same uniqueness rules as the Postgres
/// schema so callers see identical conflict behaviour.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl OnboardingStore for InMemoryStore {
    async fn insert_batch(&self, batch: &Batch) -> Result<(), StoreError> {
        self.lock()?.batches.push(batch.clone());
        Ok(())
    }

    async fn get_batch(&self, id: Uuid) -> Result<Option<Batch>, StoreError> {
        Ok(self.lock()?.batches.iter().find(|b| b.id == id).cloned())
    }

    async fn list_batches(&self) -> Result<Vec<Batch>, StoreError> {
        Ok(self.lock()?.batches.clone())
    }

    async fn list_batches_by_phase(&self, phase: i32) -> Result<Vec<Batch>, StoreError> {
        Ok(self
            .lock()?
            .batches
            .iter()
            .filter(|b| b.phase == phase)
            .cloned()
            .collect())
    }

    async fn claim_batch(&self, id: Uuid) -> Result<BatchClaim, StoreError> {
        let mut tables = self.lock()?;
        let Some(batch) = tables.batches.iter_mut().find(|b| b.id == id) else {
            return Ok(BatchClaim::NotFound);
        };
        if batch.accounts_created {
            return Ok(BatchClaim::AlreadyCreated);
        }
        if batch.processing_started_at.is_some() {
            return Ok(BatchClaim::InProgress);
        }
        batch.processing_started_at = Some(Utc::now());
        Ok(BatchClaim::Claimed(batch.clone()))
    }

    async fn mark_accounts_created(&self, id: Uuid) -> Result<(), StoreError> {
        if let Some(batch) = self.lock()?.batches.iter_mut().find(|b| b.id == id) {
            batch.accounts_created = true;
        }
        Ok(())
    }

    async fn find_trainee_by_email(
        &self,
        email: &str,
    ) -> Result<Option<TraineeAccount>, StoreError> {
        let email = email.to_lowercase();
        Ok(self
            .lock()?
            .trainees
            .iter()
            .find(|t| t.email == email)
            .cloned())
    }

    async fn find_trainee_by_employee_id(
        &self,
        employee_id: &str,
    ) -> Result<Option<TraineeAccount>, StoreError> {
        Ok(self
            .lock()?
            .trainees
            .iter()
            .find(|t| t.employee_id == employee_id)
            .cloned())
    }

    async fn list_trainees(&self) -> Result<Vec<TraineeAccount>, StoreError> {
        let mut trainees = self.lock()?.trainees.clone();
        trainees.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        Ok(trainees)
    }

    async fn insert_trainee(&self, trainee: &TraineeAccount) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        let email = trainee.email.to_lowercase();
        if tables.trainees.iter().any(|t| t.email == email) {
            return Err(StoreError::Conflict(UniqueField::Email));
        }
        if tables
            .trainees
            .iter()
            .any(|t| t.employee_id == trainee.employee_id)
        {
            return Err(StoreError::Conflict(UniqueField::EmployeeId));
        }
        let mut stored = trainee.clone();
        stored.email = email;
        tables.trainees.push(stored);
        Ok(())
    }

    async fn max_employee_number(&self, prefix: &str) -> Result<Option<u32>, StoreError> {
        Ok(self
            .lock()?
            .trainees
            .iter()
            .filter_map(|t| parse_employee_number(prefix, &t.employee_id))
            .max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::batch::PENDING_SPECIALIZATION;
    use crate::models::trainee::STATUS_ACTIVE;

    fn account(email: &str, employee_id: &str) -> TraineeAccount {
        TraineeAccount {
            id: Uuid::new_v4(),
            name: "Test Trainee".to_string(),
            email: email.to_string(),
            employee_id: employee_id.to_string(),
            password: "Ab12!@cdEF34".to_string(),
            password_is_temporary: true,
            phase: 1,
            progress: 0,
            score: 0,
            status: STATUS_ACTIVE.to_string(),
            specialization: PENDING_SPECIALIZATION.to_string(),
            batch_id: None,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email_case_insensitively() {
        let store = InMemoryStore::new();
        store.insert_trainee(&account("a@x.io", "MAV-0001")).await.unwrap();
        let err = store
            .insert_trainee(&account("A@X.io", "MAV-0002"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(UniqueField::Email)));
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_employee_id() {
        let store = InMemoryStore::new();
        store.insert_trainee(&account("a@x.io", "MAV-0001")).await.unwrap();
        let err = store
            .insert_trainee(&account("b@x.io", "MAV-0001"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(UniqueField::EmployeeId)));
    }

    #[tokio::test]
    async fn test_max_employee_number_ignores_other_prefixes() {
        let store = InMemoryStore::new();
        store.insert_trainee(&account("a@x.io", "MAV-0001")).await.unwrap();
        store.insert_trainee(&account("b@x.io", "MAV-0003")).await.unwrap();
        store.insert_trainee(&account("c@x.io", "OTH-0009")).await.unwrap();
        assert_eq!(store.max_employee_number("MAV").await.unwrap(), Some(3));
        assert_eq!(store.max_employee_number("NEW").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_claim_is_exclusive() {
        let store = InMemoryStore::new();
        let batch = Batch::new(1, "python", 1, false, vec![], Utc::now());
        store.insert_batch(&batch).await.unwrap();

        assert!(matches!(
            store.claim_batch(batch.id).await.unwrap(),
            BatchClaim::Claimed(_)
        ));
        assert!(matches!(
            store.claim_batch(batch.id).await.unwrap(),
            BatchClaim::InProgress
        ));

        store.mark_accounts_created(batch.id).await.unwrap();
        assert!(matches!(
            store.claim_batch(batch.id).await.unwrap(),
            BatchClaim::AlreadyCreated
        ));
        assert!(matches!(
            store.claim_batch(Uuid::new_v4()).await.unwrap(),
            BatchClaim::NotFound
        ));
    }
}
