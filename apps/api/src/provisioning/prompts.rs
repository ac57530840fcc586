// LLM prompt constants for profile generation.
// Reuses the JSON-only system prompt from llm_client::prompts.

/// Profile prompt template. Replace `{email}` before sending.
pub const PROFILE_PROMPT_TEMPLATE: &str = r#"You are an HR assistant creating a training account.

Based on the email address "{email}", produce:
1. A realistic, professional full name (first and last name) that could belong to this email.
2. A temporary password that is EXACTLY 12 characters long and contains at least
   2 uppercase letters, 2 lowercase letters, 2 digits, and 2 special characters from: !@#$%^&*
   No other characters are allowed.

Return a JSON object with this EXACT schema (no extra fields):
{
  "name": "Jane Smith",
  "password": "Xy7!Kp2@mQ9z"
}"#;
