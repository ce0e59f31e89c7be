use std::sync::Arc;
use axum::{routing::get, Router};
use shared_config::AppConfig;

use crate::handlers::get_patient_conditions;

pub fn patient_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/{patient_id}/conditions", get(get_patient_conditions))
        .with_state(config)
}
