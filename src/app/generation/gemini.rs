//! Gemini `generateContent` client
//!
//! Built once at startup and shared behind `Arc<dyn GenerationClient>`.
//! The underlying `reqwest::Client` keeps its connection pool for the life of
//! the process.

#![warn(clippy::all, rust_2018_idioms)]

use super::client::{GenerationClient, GenerationError};
use super::prompts::SYSTEM_INSTRUCTION;
use crate::app::config::GenerationSettings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

const API_KEY_HEADER: &str = "x-goog-api-key";
/// Longest error body kept in a [`GenerationError::Status`]
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

/// `{endpoint}/v1beta/models/{model}:generateContent`
fn generate_content_url(endpoint: &str, model: &str) -> Result<Url, GenerationError> {
    let mut base = endpoint.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }

    Url::parse(&base)
        .and_then(|base| base.join(&format!("v1beta/models/{}:generateContent", model)))
        .map_err(|e| GenerationError::Endpoint(format!("{}: {}", endpoint, e)))
}

pub struct GeminiClient {
    http: reqwest::Client,
    url: Url,
    model: String,
    api_key: Option<String>,
    max_output_tokens: u32,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(settings: &GenerationSettings) -> Result<Self, GenerationError> {
        let url = generate_content_url(&settings.endpoint, &settings.model)?;
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        if settings.api_key.is_none() {
            warn!("No Gemini API key configured; generation requests will fail");
        }

        info!("Gemini client ready for model {} at {}", settings.model, url);

        Ok(Self {
            http,
            url,
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            max_output_tokens: settings.max_output_tokens,
            temperature: settings.temperature,
        })
    }

    fn request_body<'a>(&self, prompt: &'a str) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey)?;

        debug!("Sending generateContent request ({} prompt bytes)", prompt.len());

        let response = self
            .http
            .post(self.url.clone())
            .header(API_KEY_HEADER, api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        parsed.text().ok_or(GenerationError::EmptyResponse)
    }

    fn describe(&self) -> String {
        format!("Gemini {}", self.model)
    }
}
