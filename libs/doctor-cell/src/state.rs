use std::sync::Arc;

use shared_config::AppConfig;

use crate::services::embedding::SharedEmbedder;

/// Router state: configuration plus the embedding model loaded once at startup.
#[derive(Clone)]
pub struct DoctorCellState {
    pub config: Arc<AppConfig>,
    pub embedder: SharedEmbedder,
}

impl DoctorCellState {
    pub fn new(config: Arc<AppConfig>, embedder: SharedEmbedder) -> Self {
        Self { config, embedder }
    }
}
