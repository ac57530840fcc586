//! Credential provisioning for new trainee accounts.
//!
//! A `ProfileGenerator` proposes a display name and temporary password for an
//! email. The provisioner never trusts that output: a failed call, an empty
//! name, or a password outside the policy all fall back to a deterministic
//! profile, so provisioning itself cannot fail.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::store::{OnboardingStore, StoreError};

pub mod employee_id;
pub mod heuristic;
pub mod llm;
pub mod names;
pub mod password;
pub mod prompts;

pub use heuristic::HeuristicProfileGenerator;
pub use llm::LlmProfileGenerator;

use employee_id::{format_employee_id, next_employee_number};
use names::fallback_name;
use password::{satisfies_policy, FALLBACK_PASSWORD};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedProfile {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile backend call failed: {0}")]
    Upstream(String),

    #[error("profile backend returned malformed output: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait ProfileGenerator: Send + Sync {
    /// Short label for logs.
    fn backend(&self) -> &'static str;

    async fn generate(&self, email: &str) -> Result<GeneratedProfile, ProfileError>;
}

pub struct CredentialProvisioner {
    generator: Arc<dyn ProfileGenerator>,
    store: Arc<dyn OnboardingStore>,
    employee_id_prefix: String,
}

impl CredentialProvisioner {
    pub fn new(
        generator: Arc<dyn ProfileGenerator>,
        store: Arc<dyn OnboardingStore>,
        employee_id_prefix: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            store,
            employee_id_prefix: employee_id_prefix.into(),
        }
    }

    pub fn employee_id_prefix(&self) -> &str {
        &self.employee_id_prefix
    }

    /// Next ID after the highest existing `PREFIX-NNNN`. Two concurrent
    /// callers may see the same value; the store's unique constraint decides.
    pub async fn next_employee_id(&self) -> Result<String, StoreError> {
        let max = self
            .store
            .max_employee_number(&self.employee_id_prefix)
            .await?;
        Ok(format_employee_id(
            &self.employee_id_prefix,
            next_employee_number(max),
        ))
    }

    pub async fn generate_profile(&self, email: &str) -> GeneratedProfile {
        match self.generator.generate(email).await {
            Ok(profile) => validate_profile(profile, email),
            Err(e) => {
                warn!(
                    "{} profile generation failed for {email}: {e}; using fallback",
                    self.generator.backend()
                );
                fallback_profile(email)
            }
        }
    }
}

fn validate_profile(profile: GeneratedProfile, email: &str) -> GeneratedProfile {
    let name = match profile.name.trim() {
        "" => {
            warn!("generated profile for {email} has an empty name; using fallback name");
            fallback_name(email)
        }
        trimmed => trimmed.to_string(),
    };

    let password = if satisfies_policy(&profile.password) {
        profile.password
    } else {
        warn!("generated password for {email} violates policy; using fallback password");
        FALLBACK_PASSWORD.to_string()
    };

    GeneratedProfile { name, password }
}

pub fn fallback_profile(email: &str) -> GeneratedProfile {
    GeneratedProfile {
        name: fallback_name(email),
        password: FALLBACK_PASSWORD.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::stubs::FixedProfileGenerator;
    use super::*;
    use crate::models::trainee::{TraineeAccount, STATUS_ACTIVE};
    use crate::store::InMemoryStore;
    use chrono::Utc;
    use uuid::Uuid;

    fn provisioner(generator: FixedProfileGenerator) -> (CredentialProvisioner, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let provisioner = CredentialProvisioner::new(Arc::new(generator), store.clone(), "MAV");
        (provisioner, store)
    }

    fn account(email: &str, employee_id: &str) -> TraineeAccount {
        TraineeAccount {
            id: Uuid::new_v4(),
            name: "Existing".to_string(),
            email: email.to_string(),
            employee_id: employee_id.to_string(),
            password: FALLBACK_PASSWORD.to_string(),
            password_is_temporary: true,
            phase: 1,
            progress: 0,
            score: 0,
            status: STATUS_ACTIVE.to_string(),
            specialization: "python".to_string(),
            batch_id: None,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[tokio::test]
    async fn test_first_employee_id_is_one() {
        let (provisioner, _) = provisioner(FixedProfileGenerator(Err("unused".into())));
        assert_eq!(provisioner.next_employee_id().await.unwrap(), "MAV-0001");
    }

    #[tokio::test]
    async fn test_employee_id_follows_max_not_count() {
        let (provisioner, store) = provisioner(FixedProfileGenerator(Err("unused".into())));
        store.insert_trainee(&account("a@x.com", "MAV-0001")).await.unwrap();
        store.insert_trainee(&account("b@x.com", "MAV-0003")).await.unwrap();
        store.insert_trainee(&account("c@x.com", "OTHER-0099")).await.unwrap();

        assert_eq!(provisioner.next_employee_id().await.unwrap(), "MAV-0004");
    }

    #[tokio::test]
    async fn test_valid_profile_passes_through() {
        let profile = GeneratedProfile {
            name: "  Jane Smith ".to_string(),
            password: "Xy7!Kp2@mQ9z".to_string(),
        };
        let (provisioner, _) = provisioner(FixedProfileGenerator(Ok(profile)));

        let generated = provisioner.generate_profile("jane@x.com").await;
        assert_eq!(generated.name, "Jane Smith");
        assert_eq!(generated.password, "Xy7!Kp2@mQ9z");
    }

    #[tokio::test]
    async fn test_weak_password_replaced_by_fallback() {
        let profile = GeneratedProfile {
            name: "Jane Smith".to_string(),
            password: "password".to_string(),
        };
        let (provisioner, _) = provisioner(FixedProfileGenerator(Ok(profile)));

        let generated = provisioner.generate_profile("jane@x.com").await;
        assert_eq!(generated.name, "Jane Smith");
        assert_eq!(generated.password, FALLBACK_PASSWORD);
    }

    #[tokio::test]
    async fn test_generator_failure_uses_deterministic_fallback() {
        let (provisioner, _) = provisioner(FixedProfileGenerator(Err("timeout".into())));

        let first = provisioner.generate_profile("john_doe@x.com").await;
        let second = provisioner.generate_profile("john_doe@x.com").await;
        assert_eq!(first, second);
        assert_eq!(first.name, "John Doe");
        assert!(satisfies_policy(&first.password));
    }

    #[tokio::test]
    async fn test_empty_generated_name_replaced() {
        let profile = GeneratedProfile {
            name: "   ".to_string(),
            password: "Xy7!Kp2@mQ9z".to_string(),
        };
        let (provisioner, _) = provisioner(FixedProfileGenerator(Ok(profile)));

        let generated = provisioner.generate_profile("sam@x.com").await;
        assert_eq!(generated.name, "Sam");
        assert_eq!(generated.password, "Xy7!Kp2@mQ9z");
    }
}
