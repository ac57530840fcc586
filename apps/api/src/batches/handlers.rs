use std::collections::BTreeMap;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::batches::materialize::{AccountCreationReport, BatchAccountsOutcome};
use crate::batches::pipeline::{process_upload, UploadOptions, UploadResponse};
use crate::errors::AppError;
use crate::models::batch::{Batch, ExtractedCandidate};
use crate::state::AppState;

const DEFAULT_BATCH_NUMBER: i32 = 1;

/// Skill-group label for trainees without a recognised skill.
const UNKNOWN_SKILL: &str = "unknown";

/// POST /onboarding/upload-resumes
/// Multipart fields: `file` (required), `phase`, `batch_number`.
pub async fn handle_upload_resumes(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload = None;
    let mut options = UploadOptions {
        phase: state.config.default_phase,
        batch_number: DEFAULT_BATCH_NUMBER,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::Validation("file field has no filename".into()))?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
                upload = Some((file_name, data));
            }
            Some("phase") => options.phase = parse_int_field("phase", field.text().await)?,
            Some("batch_number") => {
                options.batch_number = parse_int_field("batch_number", field.text().await)?
            }
            _ => {}
        }
    }

    let (file_name, data) =
        upload.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;
    info!("Received upload {file_name} ({} bytes)", data.len());

    let response = process_upload(&state, file_name, data, options).await?;
    Ok(Json(response))
}

fn parse_int_field(
    name: &str,
    text: Result<String, axum::extract::multipart::MultipartError>,
) -> Result<i32, AppError> {
    let text = text.map_err(|e| AppError::Validation(format!("Could not read {name}: {e}")))?;
    text.trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("{name} must be an integer, got '{text}'")))
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountsRequest {
    #[serde(alias = "batchId")]
    pub batch_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CreateAccountsResponse {
    AlreadyCreated,
    Success(AccountCreationReport),
}

/// POST /onboarding/create-accounts-for-batch
pub async fn handle_create_accounts(
    State(state): State<AppState>,
    Json(req): Json<CreateAccountsRequest>,
) -> Result<Json<CreateAccountsResponse>, AppError> {
    let outcome = state
        .materializer
        .create_accounts_for_batch(req.batch_id)
        .await?;
    Ok(Json(match outcome {
        BatchAccountsOutcome::AlreadyCreated => CreateAccountsResponse::AlreadyCreated,
        BatchAccountsOutcome::Created(report) => CreateAccountsResponse::Success(report),
    }))
}

/// GET /batch/:id
pub async fn handle_get_batch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Batch>, AppError> {
    let batch = state
        .store
        .get_batch(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Batch {id} not found")))?;
    Ok(Json(batch))
}

/// GET /batches
pub async fn handle_list_batches(
    State(state): State<AppState>,
) -> Result<Json<Vec<Batch>>, AppError> {
    Ok(Json(state.store.list_batches().await?))
}

/// GET /batches/phase/:phase
pub async fn handle_list_batches_by_phase(
    State(state): State<AppState>,
    Path(phase): Path<i32>,
) -> Result<Json<Vec<Batch>>, AppError> {
    Ok(Json(state.store.list_batches_by_phase(phase).await?))
}

/// phase → batch_number → skill → batches
pub type GroupedBatches = BTreeMap<i32, BTreeMap<i32, BTreeMap<String, Vec<Batch>>>>;

pub fn group_batches(batches: Vec<Batch>) -> GroupedBatches {
    let mut grouped = GroupedBatches::new();
    for batch in batches {
        grouped
            .entry(batch.phase)
            .or_default()
            .entry(batch.batch_number)
            .or_default()
            .entry(batch.skill.clone())
            .or_default()
            .push(batch);
    }
    grouped
}

/// GET /batches/grouped
pub async fn handle_grouped_batches(
    State(state): State<AppState>,
) -> Result<Json<GroupedBatches>, AppError> {
    Ok(Json(group_batches(state.store.list_batches().await?)))
}

/// GET /batches/:id/skill-groups
pub async fn handle_skill_groups(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let batch = state
        .store
        .get_batch(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Batch {id} not found")))?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for trainee in &batch.trainees {
        if trainee.skills.is_empty() {
            *counts.entry(UNKNOWN_SKILL.to_string()).or_default() += 1;
        }
        for skill in &trainee.skills {
            *counts.entry(skill.clone()).or_default() += 1;
        }
    }

    let groups: Vec<Value> = counts
        .into_iter()
        .map(|(skill, count)| json!({ "skill": skill, "trainee_count": count }))
        .collect();
    Ok(Json(Value::Array(groups)))
}

/// GET /batches/:id/skill-groups/:skill/trainees
pub async fn handle_skill_group_trainees(
    State(state): State<AppState>,
    Path((id, skill)): Path<(Uuid, String)>,
) -> Result<Json<Vec<ExtractedCandidate>>, AppError> {
    let batch = state
        .store
        .get_batch(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Batch {id} not found")))?;
    Ok(Json(trainees_with_skill(batch, &skill)))
}

/// Case-insensitive; `unknown` selects trainees with no recognised skill,
/// matching the label the skill-group counts use.
fn trainees_with_skill(batch: Batch, skill: &str) -> Vec<ExtractedCandidate> {
    let skill = skill.trim().to_lowercase();
    batch
        .trainees
        .into_iter()
        .filter(|t| {
            if t.skills.is_empty() {
                skill == UNKNOWN_SKILL
            } else {
                t.skills.iter().any(|s| s.to_lowercase() == skill)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use chrono::Utc;

    fn batch(phase: i32, number: i32, skill: &str) -> Batch {
        Batch::new(number, skill, phase, false, Vec::new(), Utc::now())
    }

    #[test]
    fn test_group_batches_nests_phase_number_skill() {
        let grouped = group_batches(vec![
            batch(1, 1, "python"),
            batch(1, 1, "java"),
            batch(1, 0, "mixed"),
            batch(2, 1, "python"),
            batch(1, 1, "python"),
        ]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&1][&1]["python"].len(), 2);
        assert_eq!(grouped[&1][&1]["java"].len(), 1);
        assert_eq!(grouped[&1][&0]["mixed"].len(), 1);
        assert_eq!(grouped[&2][&1]["python"].len(), 1);
    }

    #[test]
    fn test_create_accounts_request_accepts_both_casings() {
        let id = Uuid::new_v4();
        let snake: CreateAccountsRequest =
            serde_json::from_value(json!({ "batch_id": id })).unwrap();
        let camel: CreateAccountsRequest =
            serde_json::from_value(json!({ "batchId": id })).unwrap();
        assert_eq!(snake.batch_id, id);
        assert_eq!(camel.batch_id, id);
    }

    #[test]
    fn test_already_created_response_shape() {
        let body = serde_json::to_value(CreateAccountsResponse::AlreadyCreated).unwrap();
        assert_eq!(body, json!({ "status": "already_created" }));
    }

    #[test]
    fn test_trainees_with_skill_filters_case_insensitively() {
        let trainee = |email: &str, skills: &[&str]| ExtractedCandidate {
            name: email.to_string(),
            email: email.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            source_file: format!("{email}.pdf"),
        };
        let overflow = Batch::new(
            0,
            "mixed",
            1,
            true,
            vec![
                trainee("a@x.com", &["cobol"]),
                trainee("b@x.com", &["fortran", "cobol"]),
                trainee("c@x.com", &[]),
            ],
            Utc::now(),
        );

        let cobol = trainees_with_skill(overflow.clone(), "COBOL");
        assert_eq!(
            cobol.iter().map(|t| t.email.as_str()).collect::<Vec<_>>(),
            vec!["a@x.com", "b@x.com"]
        );
        let unknown = trainees_with_skill(overflow.clone(), "unknown");
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].email, "c@x.com");
        assert!(trainees_with_skill(overflow, "python").is_empty());
    }
}
