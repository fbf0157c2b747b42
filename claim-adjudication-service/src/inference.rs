use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::InferenceError;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// One inference call: a prompt, optionally accompanied by a single PNG page.
#[derive(Debug, Clone, Copy)]
pub struct InferenceRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub image_png: Option<&'a [u8]>,
    pub max_tokens: u32,
}

/// Seam to the external vision/language inference service.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn complete(&self, request: InferenceRequest<'_>) -> Result<String, InferenceError>;
}

/// OpenRouter chat-completions client. The credential is injected at
/// construction; every call is a single blocking round trip bounded by the
/// configured timeout.
pub struct OpenRouterClient {
    http: Client,
    api_key: String,
}

impl OpenRouterClient {
    pub fn new(api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, api_key })
    }
}

#[async_trait]
impl InferenceClient for OpenRouterClient {
    async fn complete(&self, request: InferenceRequest<'_>) -> Result<String, InferenceError> {
        let mut content = vec![json!({
            "type": "text",
            "text": request.prompt
        })];

        if let Some(png) = request.image_png {
            content.push(json!({
                "type": "image_url",
                "image_url": {
                    "url": format!("data:image/png;base64,{}", STANDARD.encode(png))
                }
            }));
        }

        let payload = json!({
            "model": request.model,
            "messages": [
                {
                    "role": "user",
                    "content": content
                }
            ],
            "max_tokens": request.max_tokens
        });

        let response = self
            .http
            .post(OPENROUTER_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(InferenceError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(InferenceError::Api(response.status()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(InferenceError::from_reqwest)?;

        let reply = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                InferenceError::MalformedResponse("missing message content".to_string())
            })?;

        Ok(reply.to_string())
    }
}
