use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::app_state::AppState;
use crate::models::submission::{AnalysisOutcome, SubmissionOutcome};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub photo_data_uri: String,
}

/// POST /api/v1/requests — submit a maintenance request.
///
/// The body is taken as a raw field map so missing fields and wrong types
/// surface as the pipeline's validation outcome instead of an extractor
/// rejection.
pub async fn submit_maintenance_request(
    State(state): State<AppState>,
    Json(fields): Json<Value>,
) -> Json<SubmissionOutcome> {
    Json(state.pipeline.submit_maintenance_request(fields).await)
}

/// POST /api/v1/workers — register a maintenance worker.
pub async fn register_worker(
    State(state): State<AppState>,
    Json(fields): Json<Value>,
) -> Json<SubmissionOutcome> {
    Json(state.pipeline.register_worker(fields).await)
}

/// POST /api/v1/analyze — classify a problem photo before submission.
pub async fn analyze_problem_image(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Json<AnalysisOutcome> {
    Json(
        state
            .pipeline
            .analyze_problem_image(&request.photo_data_uri)
            .await,
    )
}
