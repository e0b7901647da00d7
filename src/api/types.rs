//! Shared types for the analysis API layer.

use std::sync::Arc;

use crate::config::AnalysisConfig;
use crate::pipeline::vision::VisionModel;

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<AnalysisConfig>,
    pub vision: Arc<dyn VisionModel>,
}

impl ApiContext {
    pub fn new(config: AnalysisConfig, vision: Arc<dyn VisionModel>) -> Self {
        Self {
            config: Arc::new(config),
            vision,
        }
    }
}
