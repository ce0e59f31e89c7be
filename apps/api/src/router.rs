use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use doctor_cell::router::doctor_routes;
use doctor_cell::DoctorCellState;
use patient_cell::router::patient_routes;
use shared_config::AppConfig;

pub fn create_router(config: Arc<AppConfig>, doctor_state: Arc<DoctorCellState>) -> Router {
    Router::new()
        .route("/", get(|| async { "MedNet recommendation API is running!" }))
        .nest("/doctors", doctor_routes(doctor_state))
        .nest("/patients", patient_routes(config))
}
