//! Applicant profile handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::AppState;
use phdtrack_common::{
    db::{models::Applicant, NewApplicant},
    errors::{AppError, Result},
};

pub async fn list_applicants(State(state): State<AppState>) -> Result<Json<Vec<Applicant>>> {
    Ok(Json(state.repo().list_applicants().await?))
}

/// Create an applicant; scores are range-checked before anything is stored
pub async fn create_applicant(
    State(state): State<AppState>,
    Json(request): Json<NewApplicant>,
) -> Result<(StatusCode, Json<Applicant>)> {
    let applicant = state.repo().create_applicant(request).await?;
    Ok((StatusCode::CREATED, Json(applicant)))
}

pub async fn get_applicant(
    State(state): State<AppState>,
    Path(applicant_id): Path<i32>,
) -> Result<Json<Applicant>> {
    state
        .repo()
        .find_applicant(applicant_id)
        .await?
        .map(Json)
        .ok_or(AppError::ApplicantNotFound { id: applicant_id })
}

pub async fn delete_applicant(
    State(state): State<AppState>,
    Path(applicant_id): Path<i32>,
) -> Result<StatusCode> {
    if !state.repo().delete_applicant(applicant_id).await? {
        return Err(AppError::ApplicantNotFound { id: applicant_id });
    }

    tracing::info!(applicant_id, "Applicant deleted");
    Ok(StatusCode::NO_CONTENT)
}
