use async_trait::async_trait;

use crate::provisioning::names::{name_from_email, random_name};
use crate::provisioning::password::generate_password;
use crate::provisioning::{GeneratedProfile, ProfileError, ProfileGenerator};

/// Local generator: name from a dotted email or a random realistic name,
/// plus a random policy-compliant password. No network calls.
pub struct HeuristicProfileGenerator;

#[async_trait]
impl ProfileGenerator for HeuristicProfileGenerator {
    fn backend(&self) -> &'static str {
        "heuristic"
    }

    async fn generate(&self, email: &str) -> Result<GeneratedProfile, ProfileError> {
        let mut rng = rand::rng();
        let name = name_from_email(email).unwrap_or_else(|| random_name(&mut rng));
        let password = generate_password(&mut rng);
        Ok(GeneratedProfile { name, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provisioning::password::satisfies_policy;

    #[tokio::test]
    async fn test_heuristic_profile_uses_dotted_email() {
        let profile = HeuristicProfileGenerator
            .generate("ananya.iyer@example.com")
            .await
            .unwrap();
        assert_eq!(profile.name, "Ananya Iyer");
        assert!(satisfies_policy(&profile.password));
    }
}
