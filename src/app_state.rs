use std::sync::Arc;

use crate::services::ai::{ImageClassifier, SummaryGenerator};
use crate::services::delivery::DeliveryChannel;
use crate::services::pipeline::SubmissionPipeline;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SubmissionPipeline>,
}

impl AppState {
    pub fn new(
        classifier: Arc<dyn ImageClassifier>,
        summarizer: Arc<dyn SummaryGenerator>,
        delivery: Arc<dyn DeliveryChannel>,
    ) -> Self {
        Self {
            pipeline: Arc::new(SubmissionPipeline::new(classifier, summarizer, delivery)),
        }
    }
}
