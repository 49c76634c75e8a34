use serde::Deserialize;

/// Spreadsheet webhook that receives all submissions.
const DEFAULT_WEBHOOK_URL: &str = "https://script.google.com/macros/s/AKfycbxOTeXdmO7YRTLl5jjAPqBmHa7ef4YglG2TSb4eORXRzLw0gefkN5bNWV5k1ww5dPFSPA/exec";

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Endpoint that receives serialized submissions.
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,

    /// Generative Language API base URL.
    #[serde(default = "default_ai_base_url")]
    pub ai_base_url: String,

    /// Generative Language API key.
    pub ai_api_key: String,

    /// Model used for image classification and request summaries.
    #[serde(default = "default_ai_model")]
    pub ai_model: String,

    /// Timeout applied to outbound AI and webhook calls, in seconds.
    #[serde(default = "default_ai_timeout_seconds")]
    pub ai_timeout_seconds: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_webhook_url() -> String {
    DEFAULT_WEBHOOK_URL.to_string()
}

fn default_ai_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_ai_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_ai_timeout_seconds() -> u64 {
    30
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
