use chrono::{Locale, Utc};
use serde::Serialize;

use crate::models::submission::{MaintenanceRequest, SubmissionKind, WorkerRegistration};

/// Payload shipped to the delivery channel. Ephemeral: assembled at the
/// submission instant, serialized once, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DeliveryPayload {
    Maintenance(MaintenancePayload),
    Worker(WorkerPayload),
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenancePayload {
    #[serde(flatten)]
    pub request: MaintenanceRequest,
    pub summary: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: SubmissionKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerPayload {
    #[serde(flatten)]
    pub registration: WorkerRegistration,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: SubmissionKind,
}

impl DeliveryPayload {
    pub fn maintenance(request: MaintenanceRequest, summary: String) -> Self {
        DeliveryPayload::Maintenance(MaintenancePayload {
            request,
            summary,
            timestamp: submission_timestamp(),
            kind: SubmissionKind::MaintenanceRequest,
        })
    }

    pub fn worker(registration: WorkerRegistration) -> Self {
        DeliveryPayload::Worker(WorkerPayload {
            registration,
            timestamp: submission_timestamp(),
            kind: SubmissionKind::WorkerRegistration,
        })
    }

    pub fn kind(&self) -> SubmissionKind {
        match self {
            DeliveryPayload::Maintenance(p) => p.kind,
            DeliveryPayload::Worker(p) => p.kind,
        }
    }
}

/// UTC wall-clock time at the submission instant, formatted for the
/// Arabic-locale spreadsheet rows.
fn submission_timestamp() -> String {
    Utc::now()
        .format_localized("%d/%m/%Y, %I:%M:%S %p", Locale::ar_EG)
        .to_string()
}
