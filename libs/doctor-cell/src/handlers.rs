use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use patient_cell::parse_patient_id;
use shared_models::error::AppError;

use crate::models::{RecommendationEntry, RecommendationError};
use crate::services::recommendation::RecommendationService;
use crate::state::DoctorCellState;

impl From<RecommendationError> for AppError {
    fn from(err: RecommendationError) -> Self {
        match err {
            RecommendationError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

// ==============================================================================
// RECOMMENDATION HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_recommended_doctors(
    State(state): State<Arc<DoctorCellState>>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<RecommendationEntry>>, AppError> {
    let patient_id = parse_patient_id(&patient_id)?;

    let recommendation_service = RecommendationService::new(&state.config, state.embedder.clone());

    let recommendations = recommendation_service.get_recommended_doctors(patient_id).await?;

    Ok(Json(recommendations))
}
