use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use crate::handlers;
use crate::state::DoctorCellState;

pub fn doctor_routes(state: Arc<DoctorCellState>) -> Router {
    Router::new()
        .route("/recommendations/{patient_id}", get(handlers::get_recommended_doctors))
        .with_state(state)
}
