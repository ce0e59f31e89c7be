use std::sync::Arc;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{parse_patient_id, PatientError};
use crate::services::PatientService;

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppError::NotFound("Patient not found".to_string()),
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
            PatientError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[axum::debug_handler]
pub async fn get_patient_conditions(
    State(config): State<Arc<AppConfig>>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let patient_id = parse_patient_id(&patient_id)?;
    let service = PatientService::new(&config);

    let profile = service.get_condition_profile(patient_id).await?;

    Ok(Json(json!({
        "patient_id": profile.patient_id,
        "records": profile.records,
        "normalized_conditions": profile.normalized_conditions,
        "total": profile.normalized_conditions.len()
    })))
}
