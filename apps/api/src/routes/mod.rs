pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::batches::handlers as batches;
use crate::state::AppState;
use crate::trainees::handlers as trainees;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Onboarding
        .route(
            "/onboarding/upload-resumes",
            post(batches::handle_upload_resumes).layer(upload_limit),
        )
        .route(
            "/onboarding/create-accounts-for-batch",
            post(batches::handle_create_accounts),
        )
        .route(
            "/onboarding/bulk-create-trainees",
            post(trainees::handle_bulk_create_trainees),
        )
        // Batch inspection
        .route("/batch/:id", get(batches::handle_get_batch))
        .route("/batches", get(batches::handle_list_batches))
        .route("/batches/grouped", get(batches::handle_grouped_batches))
        .route(
            "/batches/phase/:phase",
            get(batches::handle_list_batches_by_phase),
        )
        .route("/batches/:id/skill-groups", get(batches::handle_skill_groups))
        .route(
            "/batches/:id/skill-groups/:skill/trainees",
            get(batches::handle_skill_group_trainees),
        )
        // Trainees
        .route("/trainees", get(trainees::handle_list_trainees))
        .route("/trainees/:employee_id", get(trainees::handle_get_trainee))
        .route(
            "/trainees/email/:email",
            get(trainees::handle_get_trainee_by_email),
        )
        .with_state(state)
}
