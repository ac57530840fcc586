use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Skill label carried by the overflow ("next") batch.
pub const OVERFLOW_SKILL: &str = "mixed";

/// Specialization for trainees not yet assigned a skill track.
pub const PENDING_SPECIALIZATION: &str = "Pending";

/// A trainee record pulled out of one resume file.
/// Embedded by value in the batch it was allocated to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedCandidate {
    pub name: String,
    /// Always lower-cased; the dedup key across an upload.
    pub email: String,
    pub skills: BTreeSet<String>,
    pub source_file: String,
}

impl ExtractedCandidate {
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains(skill)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: Uuid,
    pub batch_number: i32,
    pub skill: String,
    pub phase: i32,
    pub is_overflow: bool,
    pub trainees: Vec<ExtractedCandidate>,
    pub created_at: DateTime<Utc>,
    /// Flips to true once account creation has run; never reverts.
    pub accounts_created: bool,
    /// Set when an account-creation run claims the batch.
    pub processing_started_at: Option<DateTime<Utc>>,
}

impl Batch {
    pub fn new(
        batch_number: i32,
        skill: impl Into<String>,
        phase: i32,
        is_overflow: bool,
        trainees: Vec<ExtractedCandidate>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            batch_number,
            skill: skill.into(),
            phase,
            is_overflow,
            trainees,
            created_at,
            accounts_created: false,
            processing_started_at: None,
        }
    }

    /// Specialization given to accounts created from this batch.
    pub fn specialization(&self) -> &str {
        if self.is_overflow {
            PENDING_SPECIALIZATION
        } else {
            &self.skill
        }
    }
}
