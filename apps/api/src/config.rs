use anyhow::{bail, Context, Result};

use crate::ingest::upload::UnpackLimits;

const DEFAULT_RECOGNISED_SKILLS: &str = "typescript,kotlin,golang,ruby,php,c++,c#,cobol,fortran";

/// Which `ProfileGenerator` backend provisions names and passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileGeneratorKind {
    Heuristic,
    Llm,
}

/// Which `Notifier` backend delivers welcome messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierKind {
    Log,
    Http,
}

/// Settings for the templated transactional-email API.
#[derive(Debug, Clone)]
pub struct MailApiConfig {
    pub api_url: String,
    pub api_key: String,
    pub template_id: String,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed, or if a selected
/// backend is missing its credentials.
#[derive(Debug, Clone)]
pub struct Config {
    /// When unset the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub batch_size: usize,
    pub skill_priority: Vec<String>,
    /// Skills that make a resume usable without earning their own batch.
    /// Candidates whose only skill is one of these land in overflow.
    pub recognised_skills: Vec<String>,
    pub employee_id_prefix: String,
    pub default_phase: i32,
    pub max_upload_bytes: usize,
    /// Decompressed size cap for one resume inside a ZIP.
    pub max_resume_bytes: u64,
    /// Decompressed size cap for a whole ZIP.
    pub max_extracted_bytes: u64,
    pub profile_generator: ProfileGeneratorKind,
    pub anthropic_api_key: Option<String>,
    pub notifier: NotifierKind,
    pub mail_api: Option<MailApiConfig>,
    pub sender_email: String,
    pub sender_name: String,
    pub company_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let profile_generator = match env_or("PROFILE_GENERATOR", "heuristic").as_str() {
            "heuristic" => ProfileGeneratorKind::Heuristic,
            "llm" => ProfileGeneratorKind::Llm,
            other => bail!("PROFILE_GENERATOR must be 'heuristic' or 'llm', got '{other}'"),
        };
        let anthropic_api_key = optional_env("ANTHROPIC_API_KEY");
        if profile_generator == ProfileGeneratorKind::Llm && anthropic_api_key.is_none() {
            bail!("ANTHROPIC_API_KEY is required when PROFILE_GENERATOR=llm");
        }

        let notifier = match env_or("NOTIFIER", "log").as_str() {
            "log" => NotifierKind::Log,
            "http" => NotifierKind::Http,
            other => bail!("NOTIFIER must be 'log' or 'http', got '{other}'"),
        };
        let mail_api = match notifier {
            NotifierKind::Http => Some(MailApiConfig {
                api_url: require_env("MAIL_API_URL")?,
                api_key: require_env("MAIL_API_KEY")?,
                template_id: require_env("MAIL_TEMPLATE_ID")?,
            }),
            NotifierKind::Log => None,
        };

        let skill_priority = parse_skill_priority(&env_or("SKILL_PRIORITY", "python,java,.net"));
        if skill_priority.is_empty() {
            bail!("SKILL_PRIORITY must name at least one skill");
        }

        let employee_id_prefix = env_or("EMPLOYEE_ID_PREFIX", "MAV").trim().to_string();
        if employee_id_prefix.is_empty() {
            bail!("EMPLOYEE_ID_PREFIX cannot be empty");
        }

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            batch_size: env_or("BATCH_SIZE", "50")
                .parse::<usize>()
                .context("BATCH_SIZE must be a non-negative integer")?,
            skill_priority,
            recognised_skills: parse_skill_priority(&env_or(
                "RECOGNISED_SKILLS",
                DEFAULT_RECOGNISED_SKILLS,
            )),
            employee_id_prefix,
            default_phase: env_or("DEFAULT_PHASE", "1")
                .parse::<i32>()
                .context("DEFAULT_PHASE must be an integer")?,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", "52428800")
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            max_resume_bytes: env_or("MAX_RESUME_BYTES", "20971520")
                .parse::<u64>()
                .context("MAX_RESUME_BYTES must be a byte count")?,
            max_extracted_bytes: env_or("MAX_EXTRACTED_BYTES", "209715200")
                .parse::<u64>()
                .context("MAX_EXTRACTED_BYTES must be a byte count")?,
            profile_generator,
            anthropic_api_key,
            notifier,
            mail_api,
            sender_email: env_or("SENDER_EMAIL", "training@example.com"),
            sender_name: env_or("SENDER_NAME", "Pathfinder Training"),
            company_name: env_or("COMPANY_NAME", "Maverick Pathfinder"),
        })
    }
}

impl Config {
    /// Skills the field extractor looks for: priority skills first, then the
    /// recognised extras. First match in this order wins.
    pub fn skill_vocabulary(&self) -> Vec<String> {
        let mut vocabulary = self.skill_priority.clone();
        for skill in &self.recognised_skills {
            if !vocabulary.contains(skill) {
                vocabulary.push(skill.clone());
            }
        }
        vocabulary
    }

    pub fn unpack_limits(&self) -> UnpackLimits {
        UnpackLimits {
            max_entry_bytes: self.max_resume_bytes,
            max_total_bytes: self.max_extracted_bytes,
        }
    }
}

/// Splits a comma-separated skill list, lower-casing and dropping blanks and
/// repeats while keeping the first occurrence's position.
pub fn parse_skill_priority(raw: &str) -> Vec<String> {
    let mut skills: Vec<String> = Vec::new();
    for skill in raw.split(',').map(|s| s.trim().to_lowercase()) {
        if !skill.is_empty() && !skills.contains(&skill) {
            skills.push(skill);
        }
    }
    skills
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}


#[cfg(test)]
impl Config {
    /// In-memory store, heuristic profiles, log notifier.
    pub fn for_tests() -> Self {
        Config {
            database_url: None,
            port: 0,
            rust_log: "debug".to_string(),
            batch_size: 50,
            skill_priority: vec!["python".to_string(), "java".to_string()],
            recognised_skills: parse_skill_priority(DEFAULT_RECOGNISED_SKILLS),
            employee_id_prefix: "MAV".to_string(),
            default_phase: 1,
            max_upload_bytes: 1024 * 1024,
            max_resume_bytes: 256 * 1024,
            max_extracted_bytes: 1024 * 1024,
            profile_generator: ProfileGeneratorKind::Heuristic,
            anthropic_api_key: None,
            notifier: NotifierKind::Log,
            mail_api: None,
            sender_email: "training@example.com".to_string(),
            sender_name: "Pathfinder Training".to_string(),
            company_name: "Maverick Pathfinder".to_string(),
        }
    }
}
