use std::sync::Arc;
use std::time::Instant;

use garde::Validate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::payload::DeliveryPayload;
use crate::models::submission::{
    AnalysisOutcome, MaintenanceRequest, SubmissionKind, SubmissionOutcome, WorkerRegistration,
};
use crate::services::ai::{ImageClassifier, SummaryContext, SummaryGenerator};
use crate::services::delivery::DeliveryChannel;

/// Substituted for the analysis text when the client submitted without
/// running image analysis (or the analysis produced nothing).
pub const NO_ANALYSIS_SENTINEL: &str = "لم يتم إجراء تحليل.";

// User-facing messages. Internal failure detail never reaches the caller;
// it goes to the log only.
const MSG_INVALID_INPUT: &str = "البيانات المدخلة غير صالحة.";
const MSG_REQUEST_SENT: &str = "تم إرسال طلبك بنجاح!";
const MSG_REQUEST_FAILED: &str = "حدث خطأ أثناء إرسال الطلب.";
const MSG_WORKER_REGISTERED: &str = "تم تسجيلك بنجاح!";
const MSG_REGISTRATION_FAILED: &str = "حدث خطأ أثناء التسجيل.";
const MSG_ANALYSIS_FAILED: &str = "فشل تحليل الصورة.";

/// Orchestrates validation, summary generation, payload assembly and
/// delivery for each submission kind. Stateless; every invocation is
/// independent and the external calls within one submission are strictly
/// sequential.
pub struct SubmissionPipeline {
    classifier: Arc<dyn ImageClassifier>,
    summarizer: Arc<dyn SummaryGenerator>,
    delivery: Arc<dyn DeliveryChannel>,
}

impl SubmissionPipeline {
    pub fn new(
        classifier: Arc<dyn ImageClassifier>,
        summarizer: Arc<dyn SummaryGenerator>,
        delivery: Arc<dyn DeliveryChannel>,
    ) -> Self {
        Self {
            classifier,
            summarizer,
            delivery,
        }
    }

    /// Validate, summarize and relay one maintenance request.
    pub async fn submit_maintenance_request(&self, fields: Value) -> SubmissionOutcome {
        let submission_id = Uuid::new_v4();
        let kind = SubmissionKind::MaintenanceRequest;
        let started = Instant::now();
        metrics::counter!("submissions_total", "kind" => kind.to_string()).increment(1);

        let request: MaintenanceRequest = match parse_and_validate(fields) {
            Ok(request) => request,
            Err(detail) => {
                warn!(%submission_id, %detail, "maintenance request rejected by validation");
                metrics::counter!("submissions_failed_total", "kind" => kind.to_string(), "stage" => "validation")
                    .increment(1);
                return SubmissionOutcome::rejected(MSG_INVALID_INPUT);
            }
        };

        // The summary model always receives an analysis text; absent or
        // empty results are replaced by the sentinel.
        let analysis_results = request
            .ai_analysis_results
            .as_deref()
            .filter(|text| !text.is_empty())
            .unwrap_or(NO_ANALYSIS_SENTINEL)
            .to_string();

        let ctx = SummaryContext {
            problem_description: request.problem_description.clone(),
            problem_photo_data_uri: request.problem_photo_data_uri.clone(),
            ai_analysis_results: analysis_results,
            client_phone_number: request.phone_number.clone(),
            client_geolocation: request.geolocation.clone(),
        };

        let summary = match self.summarizer.summarize(&ctx).await {
            Ok(summary) => summary,
            Err(error) => {
                warn!(%submission_id, %error, "summary generation failed");
                metrics::counter!("submissions_failed_total", "kind" => kind.to_string(), "stage" => "summary")
                    .increment(1);
                return SubmissionOutcome::rejected(MSG_REQUEST_FAILED);
            }
        };

        let payload = DeliveryPayload::maintenance(request, summary);
        if let Err(error) = self.delivery.deliver(&payload).await {
            warn!(%submission_id, %error, "maintenance request delivery failed");
            metrics::counter!("submissions_failed_total", "kind" => kind.to_string(), "stage" => "delivery")
                .increment(1);
            return SubmissionOutcome::rejected(MSG_REQUEST_FAILED);
        }

        metrics::histogram!("submission_processing_seconds")
            .record(started.elapsed().as_secs_f64());
        info!(
            %submission_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "maintenance request delivered"
        );
        SubmissionOutcome::delivered(MSG_REQUEST_SENT)
    }

    /// Validate and relay one worker registration.
    pub async fn register_worker(&self, fields: Value) -> SubmissionOutcome {
        let submission_id = Uuid::new_v4();
        let kind = SubmissionKind::WorkerRegistration;
        let started = Instant::now();
        metrics::counter!("submissions_total", "kind" => kind.to_string()).increment(1);

        let registration: WorkerRegistration = match parse_and_validate(fields) {
            Ok(registration) => registration,
            Err(detail) => {
                warn!(%submission_id, %detail, "worker registration rejected by validation");
                metrics::counter!("submissions_failed_total", "kind" => kind.to_string(), "stage" => "validation")
                    .increment(1);
                return SubmissionOutcome::rejected(MSG_INVALID_INPUT);
            }
        };

        let payload = DeliveryPayload::worker(registration);
        if let Err(error) = self.delivery.deliver(&payload).await {
            warn!(%submission_id, %error, "worker registration delivery failed");
            metrics::counter!("submissions_failed_total", "kind" => kind.to_string(), "stage" => "delivery")
                .increment(1);
            return SubmissionOutcome::rejected(MSG_REGISTRATION_FAILED);
        }

        metrics::histogram!("submission_processing_seconds")
            .record(started.elapsed().as_secs_f64());
        info!(
            %submission_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "worker registration delivered"
        );
        SubmissionOutcome::delivered(MSG_WORKER_REGISTERED)
    }

    /// Classify a problem photo ahead of submission. Failure here never
    /// blocks a later submission; the client may submit without analysis.
    pub async fn analyze_problem_image(&self, photo_data_uri: &str) -> AnalysisOutcome {
        metrics::counter!("image_analysis_total").increment(1);

        match self.classifier.classify(photo_data_uri).await {
            Ok(problems) => {
                info!(problem_count = problems.len(), "image analysis complete");
                AnalysisOutcome::detected(problems)
            }
            Err(error) => {
                warn!(%error, "image analysis failed");
                AnalysisOutcome::failed(MSG_ANALYSIS_FAILED)
            }
        }
    }
}

/// Deserialize a raw field map and run its schema constraints. Missing
/// fields and wrong types are validation failures, not coercions. The
/// returned detail enumerates every violating field; callers log it and
/// surface only a generic message.
fn parse_and_validate<T>(fields: Value) -> Result<T, String>
where
    T: DeserializeOwned + Validate,
    T::Context: Default,
{
    let parsed: T = serde_json::from_value(fields).map_err(|e| e.to_string())?;
    parsed.validate().map_err(|report| report.to_string())?;
    Ok(parsed)
}
