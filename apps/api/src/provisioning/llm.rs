use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;
use crate::provisioning::prompts::PROFILE_PROMPT_TEMPLATE;
use crate::provisioning::{GeneratedProfile, ProfileError, ProfileGenerator};

#[derive(Debug, Deserialize)]
struct LlmProfile {
    name: String,
    password: String,
}

/// LLM-backed generator. Its output is untrusted: the provisioner re-checks
/// the password policy and falls back on any error.
pub struct LlmProfileGenerator {
    llm: LlmClient,
}

impl LlmProfileGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ProfileGenerator for LlmProfileGenerator {
    fn backend(&self) -> &'static str {
        "llm"
    }

    async fn generate(&self, email: &str) -> Result<GeneratedProfile, ProfileError> {
        let prompt = PROFILE_PROMPT_TEMPLATE.replace("{email}", email);
        let profile: LlmProfile = self
            .llm
            .call_json(&prompt, JSON_ONLY_SYSTEM)
            .await
            .map_err(|e| ProfileError::Upstream(e.to_string()))?;

        let name = clean_name(&profile.name);
        if name.is_empty() {
            return Err(ProfileError::Malformed("empty name".to_string()));
        }
        debug!("LLM generated profile name for {email}");

        Ok(GeneratedProfile {
            name,
            password: profile.password.trim().to_string(),
        })
    }
}

/// Keeps letters, spaces, hyphens, and apostrophes; collapses whitespace.
fn clean_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace() || *c == '-' || *c == '\'')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name_strips_punctuation_and_extra_text() {
        assert_eq!(clean_name("  Jane   Smith. "), "Jane Smith");
        assert_eq!(clean_name("Mary-Kate O'Neil!"), "Mary-Kate O'Neil");
        assert_eq!(clean_name("**42**"), "");
    }
}
