//! Upload pipeline: unpack → extract text and fields → allocate → persist.

use std::collections::BTreeMap;

use anyhow::anyhow;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::allocation::allocate;
use crate::batches::materialize::persist_allocation;
use crate::errors::AppError;
use crate::ingest::extract_candidates;
use crate::ingest::upload::unpack_upload;
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
pub struct UploadOptions {
    pub phase: i32,
    pub batch_number: i32,
}

#[derive(Debug, Serialize)]
pub struct UploadSummary {
    /// `<skill>_batch` → trainees allocated to that skill, one key per configured skill.
    #[serde(flatten)]
    pub skill_batches: BTreeMap<String, usize>,
    pub next_batch_count: usize,
    pub total_trainees: usize,
    pub files_received: usize,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub batch_ids: Vec<Uuid>,
    pub summary: UploadSummary,
}

pub async fn process_upload(
    state: &AppState,
    file_name: String,
    data: Bytes,
    options: UploadOptions,
) -> Result<UploadResponse, AppError> {
    let extractor = state.extractor.clone();
    let vocabulary = state.config.skill_vocabulary();
    let limits = state.config.unpack_limits();

    // Unzipping and PDF parsing are CPU-bound.
    let (files_received, report) = tokio::task::spawn_blocking(move || {
        let files = unpack_upload(&file_name, &data, limits)?;
        let report = extract_candidates(&files, &vocabulary, &extractor);
        Ok::<_, AppError>((files.len(), report))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow!("resume extraction task failed: {e}")))??;

    if report.candidates.is_empty() {
        return Err(AppError::UnprocessableEntity(format!(
            "None of the {files_received} uploaded resume(s) yielded an email address and a recognised skill"
        )));
    }

    let allocation = allocate(
        report.candidates,
        &state.config.skill_priority,
        state.config.batch_size,
    );

    let skill_batches = state
        .config
        .skill_priority
        .iter()
        .map(|skill| (format!("{skill}_batch"), allocation.bucket(skill).len()))
        .collect();
    let summary = UploadSummary {
        skill_batches,
        next_batch_count: allocation.overflow.len(),
        total_trainees: allocation.total_allocated(),
        files_received,
    };

    let batches = persist_allocation(
        state.store.as_ref(),
        allocation,
        options.phase,
        options.batch_number,
    )
    .await?;

    info!(
        "Upload processed: {} file(s), {} trainee(s), {} batch(es), {} skipped",
        files_received,
        summary.total_trainees,
        batches.len(),
        report.skipped.len()
    );

    Ok(UploadResponse {
        batch_ids: batches.iter().map(|b| b.id).collect(),
        summary,
    })
}
