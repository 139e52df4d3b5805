//! Axum route handlers for the Resume API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::errors::AppError;
use crate::generation::{GenerationStats, GenerationStatus};
use crate::models::resume::ResumeRecord;
use crate::state::AppState;
use crate::store::Query;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResumeRequest {
    pub about_me: String,
}

#[derive(Debug, Serialize)]
pub struct CreateResumeResponse {
    pub resume: ResumeRecord,
    pub stats: GenerationStats,
}

/// POST /api/resumes
///
/// Generates a markdown resume from the caller's text, stores it, and returns it.
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Json(request): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<CreateResumeResponse>), AppError> {
    if request.about_me.trim().is_empty() {
        return Err(AppError::Validation("aboutMe cannot be empty".to_string()));
    }

    let outcome = state.generator.generate(&request.about_me).await?;
    let markdown = match (outcome.status, outcome.result) {
        (GenerationStatus::Finished, Some(markdown)) => markdown,
        _ => {
            return Err(AppError::UnprocessableEntity(
                "Could not generate a resume from the provided text".to_string(),
            ))
        }
    };

    let information = json!({ "generation": outcome.stats }).to_string();
    let resume = ResumeRecord::new(request.about_me, markdown, information);
    state
        .store
        .insert_record(&resume.to_record(), &state.container)
        .await?;
    info!(resume_id = resume.id, "resume stored");

    Ok((
        StatusCode::CREATED,
        Json(CreateResumeResponse {
            resume,
            stats: outcome.stats,
        }),
    ))
}

/// GET /api/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeRecord>>, AppError> {
    let stmt = format!("SELECT * FROM {}", state.container);
    Ok(Json(select_resumes(&state, stmt).await?))
}

/// GET /api/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ResumeRecord>, AppError> {
    let stmt = format!("SELECT * FROM {} WHERE id = {id}", state.container);
    select_resumes(&state, stmt)
        .await?
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// DELETE /api/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.store.delete_record(id, &state.container).await?;
    info!(resume_id = id, "resume deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn select_resumes(state: &AppState, stmt: String) -> Result<Vec<ResumeRecord>, AppError> {
    let response = state.store.run_query(&[Query::select(stmt)]).await?;

    // A row we cannot read is the store's fault, not the caller's.
    let decode = |e: crate::store::StoreError| AppError::Internal(e.into());

    let mut resumes = Vec::new();
    for set in response.result_sets().map_err(decode)? {
        for record in set.records().map_err(decode)? {
            resumes.push(ResumeRecord::from_record(&record).map_err(decode)?);
        }
    }
    Ok(resumes)
}
