use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::Display;

/// The two supported submission kinds. Serialized as the `type`
/// discriminator the webhook receiver switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "camelCase")]
pub enum SubmissionKind {
    #[serde(rename = "maintenanceRequest")]
    MaintenanceRequest,
    #[serde(rename = "workerRegistration")]
    WorkerRegistration,
}

/// A maintenance request as submitted by a client.
///
/// Lengths are counted in characters so Arabic input validates by what the
/// client actually typed. `geolocation` stays a single "lat,lon" string and
/// the photo arrives as a `data:<mime>;base64,<data>` URI.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    #[garde(length(chars, min = 10))]
    pub problem_description: String,

    #[garde(length(chars, min = 9))]
    pub phone_number: String,

    #[garde(length(chars, min = 1))]
    pub geolocation: String,

    #[garde(length(chars, min = 1))]
    pub problem_photo_data_uri: String,

    /// Comma-joined problem labels from a prior analysis run, if any.
    #[garde(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis_results: Option<String>,
}

/// A worker registration as submitted through the registration form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRegistration {
    #[garde(length(chars, min = 2))]
    pub name: String,

    #[garde(length(chars, min = 9))]
    pub phone: String,

    #[garde(length(chars, min = 2))]
    pub specialization: String,

    #[garde(length(chars, min = 2))]
    pub city: String,

    #[garde(length(chars, min = 10))]
    pub experience: String,
}

/// Uniform result of a submission operation. This object, not an HTTP
/// status, is the contract with the form caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionOutcome {
    pub fn delivered(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            error: None,
        }
    }

    pub fn rejected(error: &str) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.to_string()),
        }
    }
}

/// Result of the standalone image-analysis operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problems: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisOutcome {
    pub fn detected(problems: Vec<String>) -> Self {
        Self {
            success: true,
            problems: Some(problems),
            error: None,
        }
    }

    pub fn failed(error: &str) -> Self {
        Self {
            success: false,
            problems: None,
            error: Some(error.to_string()),
        }
    }
}
