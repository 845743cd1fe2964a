//! Application state shared by every handler.

use crate::services::GenerationGateway;
use inkwell_db::CreationStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GenerationGateway>,
    /// Read side of the creations log (history, community feed, health)
    pub creations: Arc<dyn CreationStore>,
}

impl AppState {
    pub fn new(gateway: Arc<GenerationGateway>, creations: Arc<dyn CreationStore>) -> Self {
        Self { gateway, creations }
    }
}
