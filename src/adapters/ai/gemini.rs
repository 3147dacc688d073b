//! Gemini Generator - Implementation of TextGenerator for Google's Gemini API.
//!
//! Speaks the `generateContent` REST endpoint. When the composed prompt asks
//! for structured output, the request sets `responseMimeType` to
//! `application/json` so the model is steered toward a bare JSON object —
//! the contract layer still tolerates violations.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_base_url("https://generativelanguage.googleapis.com")
//!     .with_timeout(Duration::from_secs(120));
//!
//! let generator = GeminiGenerator::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::prompt::ResponseShape;
use crate::ports::{GenerateError, GenerateRequest, TextGenerator};

/// Gemini REST API version segment.
const GEMINI_API_VERSION: &str = "v1beta";

/// Default retry-after when the rate limit response carries no delay.
const DEFAULT_RETRY_AFTER_SECS: u32 = 60;

/// Configuration for the Gemini generator.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini API implementation of the text-generation port.
pub struct GeminiGenerator {
    config: GeminiConfig,
    client: Client,
}

impl GeminiGenerator {
    /// Creates a new Gemini generator with the given configuration.
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the generateContent endpoint URL for a model.
    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.config.base_url, GEMINI_API_VERSION, model
        )
    }

    /// Converts our request to Gemini's format.
    fn to_gemini_request(request: &GenerateRequest) -> GeminiRequest {
        let generation_config = match request.shape {
            ResponseShape::StructuredJson => Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
            ResponseShape::FreeText => None,
        };

        GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config,
        }
    }

    /// Sends a request and maps transport failures.
    async fn send_request(&self, request: &GenerateRequest) -> Result<Response, GenerateError> {
        let gemini_request = Self::to_gemini_request(request);

        self.client
            .post(self.generate_url(request.model.as_str()))
            .header("x-goog-api-key", self.config.api_key())
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerateError::unavailable(format!(
                        "request timed out after {}s",
                        self.config.timeout.as_secs()
                    ))
                } else if e.is_connect() {
                    GenerateError::unavailable(format!("connection failed: {}", e))
                } else {
                    GenerateError::unavailable(e.to_string())
                }
            })
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, GenerateError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            429 => {
                let retry_after = Self::parse_retry_after(&error_body);
                Err(GenerateError::rate_limited(retry_after))
            }
            401 | 403 => Err(GenerateError::unavailable(format!(
                "authentication rejected ({}): {}",
                status, error_body
            ))),
            500..=599 => Err(GenerateError::unavailable(format!(
                "server error {}: {}",
                status, error_body
            ))),
            _ => Err(GenerateError::unavailable(format!(
                "unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses a retry delay from a rate limit error body.
    ///
    /// Gemini reports the delay as a `retryDelay` detail like `"21s"`.
    fn parse_retry_after(error_body: &str) -> u32 {
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) {
            if let Some(details) = parsed
                .get("error")
                .and_then(|e| e.get("details"))
                .and_then(|d| d.as_array())
            {
                for detail in details {
                    if let Some(delay) = detail.get("retryDelay").and_then(|d| d.as_str()) {
                        if let Ok(secs) = delay.trim_end_matches('s').parse::<u32>() {
                            return secs;
                        }
                    }
                }
            }
        }
        DEFAULT_RETRY_AFTER_SECS
    }

    /// Parses a successful response into the generated text.
    async fn parse_response(&self, response: Response) -> Result<String, GenerateError> {
        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::unavailable(format!("failed to parse response: {}", e)))?;

        let text = gemini_response
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerateError::unavailable("response carried no candidates"));
        }

        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GenerateError> {
        let response = self.send_request(&request).await?;
        let response = self.handle_response_status(response).await?;
        self.parse_response(response).await
    }
}

// ----- Gemini API Types -----

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}
