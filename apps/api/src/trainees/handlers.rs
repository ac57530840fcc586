use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::batches::handlers::CreateAccountsResponse;
use crate::batches::materialize::NewTrainee;
use crate::errors::AppError;
use crate::ingest::fields::extract_email;
use crate::models::batch::PENDING_SPECIALIZATION;
use crate::models::trainee::TraineeAccount;
use crate::state::AppState;

/// GET /trainees
pub async fn handle_list_trainees(
    State(state): State<AppState>,
) -> Result<Json<Vec<TraineeAccount>>, AppError> {
    Ok(Json(state.store.list_trainees().await?))
}

/// GET /trainees/:employee_id
pub async fn handle_get_trainee(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> Result<Json<TraineeAccount>, AppError> {
    let trainee = state
        .store
        .find_trainee_by_employee_id(&employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Trainee {employee_id} not found")))?;
    Ok(Json(trainee))
}

/// GET /trainees/email/:email
pub async fn handle_get_trainee_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<TraineeAccount>, AppError> {
    let email = email.trim().to_lowercase();
    let trainee = state
        .store
        .find_trainee_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Trainee with email {email} not found")))?;
    Ok(Json(trainee))
}

#[derive(Debug, Deserialize)]
pub struct BulkTraineeRequest {
    pub name: Option<String>,
    pub email: String,
}

/// POST /onboarding/bulk-create-trainees
/// Same per-trainee flow as batch account creation, outside any batch.
pub async fn handle_bulk_create_trainees(
    State(state): State<AppState>,
    Json(req): Json<Vec<BulkTraineeRequest>>,
) -> Result<Json<CreateAccountsResponse>, AppError> {
    if req.is_empty() {
        return Err(AppError::Validation("At least one trainee is required".into()));
    }
    let requests = req
        .into_iter()
        .map(|t| to_new_trainee(t, state.config.default_phase))
        .collect::<Result<Vec<_>, _>>()?;

    let report = state.materializer.create_accounts(requests).await;
    info!(
        "Bulk trainee creation: {} created, {} failed",
        report.summary.succeeded, report.summary.failed
    );
    Ok(Json(CreateAccountsResponse::Success(report)))
}

fn to_new_trainee(req: BulkTraineeRequest, phase: i32) -> Result<NewTrainee, AppError> {
    let email = req.email.trim().to_lowercase();
    if extract_email(&email).as_deref() != Some(email.as_str()) {
        return Err(AppError::Validation(format!(
            "'{}' is not a valid email address",
            req.email
        )));
    }
    Ok(NewTrainee {
        name: req.name,
        email,
        phase,
        specialization: PENDING_SPECIALIZATION.to_string(),
        batch_id: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_request_normalises_email() {
        let trainee = to_new_trainee(
            BulkTraineeRequest {
                name: Some("Jane Doe".into()),
                email: "  Jane.Doe@Example.com ".into(),
            },
            1,
        )
        .unwrap();
        assert_eq!(trainee.email, "jane.doe@example.com");
        assert_eq!(trainee.specialization, PENDING_SPECIALIZATION);
        assert_eq!(trainee.batch_id, None);
    }

    #[test]
    fn test_bulk_request_rejects_bad_email() {
        for email in ["not-an-email", "jane@example.com extra", ""] {
            let result = to_new_trainee(
                BulkTraineeRequest {
                    name: None,
                    email: email.into(),
                },
                1,
            );
            assert!(matches!(result, Err(AppError::Validation(_))), "{email}");
        }
    }
}
