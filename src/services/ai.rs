use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Context handed to the summary generator for one maintenance request.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryContext {
    pub problem_description: String,
    pub problem_photo_data_uri: String,
    pub ai_analysis_results: String,
    pub client_phone_number: String,
    pub client_geolocation: String,
}

/// Detects visually apparent problems in a photo.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Returns an ordered list of short problem labels, typically 0-10 items.
    async fn classify(&self, photo_data_uri: &str) -> Result<Vec<String>, AiError>;
}

/// Produces a one-paragraph summary of a maintenance request for
/// administrators.
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    async fn summarize(&self, ctx: &SummaryContext) -> Result<String, AiError>;
}

/// Client for the Google Generative Language API, used for both image
/// classification and request summaries.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    fn inline_data(mime_type: String, data: String) -> Self {
        Part::InlineData {
            inline_data: InlineData { mime_type, data },
        }
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    text: String,
}

/// A photo decoded out of a `data:<mime>;base64,<data>` URI.
struct DataUriImage {
    mime_type: String,
    base64_data: String,
    bytes: Vec<u8>,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, AiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AiError::Http)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// Send one completion request and extract the text of the first
    /// candidate.
    async fn generate(&self, parts: Vec<Part>) -> Result<String, AiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request_body = GenerateContentRequest {
            contents: vec![Content { parts }],
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await
            .map_err(AiError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AiError::Api {
                status: status.as_u16(),
            });
        }

        let completion: GenerateContentResponse = response.json().await.map_err(AiError::Http)?;

        completion
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or(AiError::EmptyCompletion)
    }
}

const CLASSIFY_PROMPT: &str = concat!(
    "You are a home-maintenance expert. Look at this photo of a reported ",
    "problem and list every visible issue (for example: water leak, broken ",
    "pipe, cracked wall, mold, faulty wiring). ",
    "Respond with ONLY a JSON array of short labels in Arabic."
);

#[async_trait]
impl ImageClassifier for GeminiClient {
    async fn classify(&self, photo_data_uri: &str) -> Result<Vec<String>, AiError> {
        let image = parse_data_uri(photo_data_uri)?;

        // Cheap sanity check before spending an AI call.
        image::guess_format(&image.bytes).map_err(|e| AiError::InvalidImage(e.to_string()))?;

        let parts = vec![
            Part::text(CLASSIFY_PROMPT),
            Part::inline_data(image.mime_type, image.base64_data),
        ];

        let completion = self.generate(parts).await?;
        let labels: Vec<String> = serde_json::from_str(strip_code_fences(&completion))?;
        Ok(labels)
    }
}

#[async_trait]
impl SummaryGenerator for GeminiClient {
    async fn summarize(&self, ctx: &SummaryContext) -> Result<String, AiError> {
        let image = parse_data_uri(&ctx.problem_photo_data_uri)?;

        let instructions = format!(
            "You are an expert maintenance request summarizer.\n\
             You will receive the client's problem description, a photo of the \
             problem, AI analysis results of the photo, the client's phone \
             number, and the client's geolocation. Generate a concise summary \
             of the client request, including the AI analysis results.\n\n\
             Problem Description: {}\n\
             AI Analysis Results: {}\n\
             Client Phone Number: {}\n\
             Client Geolocation: {}\n\n\
             Summary:",
            ctx.problem_description,
            ctx.ai_analysis_results,
            ctx.client_phone_number,
            ctx.client_geolocation,
        );

        let parts = vec![
            Part::text(instructions),
            Part::inline_data(image.mime_type, image.base64_data),
        ];

        let completion = self.generate(parts).await?;
        Ok(completion.trim().to_string())
    }
}

/// Split a `data:<mime>;base64,<data>` URI into its MIME type and decoded
/// bytes.
fn parse_data_uri(uri: &str) -> Result<DataUriImage, AiError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| AiError::InvalidImage("missing data: prefix".to_string()))?;

    let (mime_type, base64_data) = rest
        .split_once(";base64,")
        .ok_or_else(|| AiError::InvalidImage("missing base64 marker".to_string()))?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(base64_data)
        .map_err(|e| AiError::InvalidImage(e.to_string()))?;

    Ok(DataUriImage {
        mime_type: mime_type.to_string(),
        base64_data: base64_data.to_string(),
        bytes,
    })
}

/// Models often wrap JSON answers in markdown fences; strip them.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI service responded with status {status}")]
    Api { status: u16 },

    #[error("completion is not in the expected format: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("AI service returned an empty completion")]
    EmptyCompletion,

    #[error("invalid photo data URI: {0}")]
    InvalidImage(String),
}
