use std::time::Duration;

pub const DEFAULT_EXTRACTION_MODEL: &str = "google/gemini-2.5-flash-lite";
pub const DEFAULT_ADJUDICATION_MODEL: &str = "google/gemini-2.5-flash";

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Process configuration, read from the environment once at startup.
///
/// The API credential is handed to the inference client at construction;
/// nothing reads the environment after startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_key: String,
    pub extraction_model: String,
    pub adjudication_model: String,
    pub request_timeout: Duration,
    pub port: u16,
}

impl ServiceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENROUTER_API_KEY environment variable is required"))?;

        let extraction_model = std::env::var("EXTRACTION_MODEL")
            .unwrap_or_else(|_| DEFAULT_EXTRACTION_MODEL.to_string());
        let adjudication_model = std::env::var("ADJUDICATION_MODEL")
            .unwrap_or_else(|_| DEFAULT_ADJUDICATION_MODEL.to_string());

        let request_timeout = std::env::var("INFERENCE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .unwrap_or(3000);

        Ok(Self {
            api_key,
            extraction_model,
            adjudication_model,
            request_timeout,
            port,
        })
    }
}
