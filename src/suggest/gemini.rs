//! `generateContent` backend for the Gemini REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::backend::{CompletionBackend, CompletionRequest};
use super::SuggestError;
use crate::config::SuggestConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";
const JSON_MIME: &str = "application/json";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    timeout_ms: u64,
}

impl GeminiBackend {
    pub fn new(config: &SuggestConfig, api_key: Option<SecretString>) -> Result<Self, SuggestError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| SuggestError::Network(format!("client setup failed: {err}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            api_key,
            timeout_ms: config.timeout_ms,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, SuggestError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(SuggestError::MissingCredential)?;

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: request.schema.as_ref().map(|schema| GenerationConfig {
                response_mime_type: JSON_MIME,
                response_schema: schema,
            }),
        };

        let res = self
            .client
            .post(self.endpoint(&request.model))
            .header(API_KEY_HEADER, api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    SuggestError::Timeout(self.timeout_ms)
                } else {
                    SuggestError::Network(err.to_string())
                }
            })?;

        match res.status() {
            StatusCode::OK => {
                let payload: GenerateResponse = res
                    .json()
                    .await
                    .map_err(|err| SuggestError::Decode(format!("envelope: {err}")))?;
                let text: String = payload
                    .candidates
                    .into_iter()
                    .next()
                    .and_then(|candidate| candidate.content)
                    .map(|content| {
                        content
                            .parts
                            .into_iter()
                            .filter_map(|part| part.text)
                            .collect()
                    })
                    .unwrap_or_default();
                if text.trim().is_empty() {
                    return Err(SuggestError::EmptyResponse);
                }
                Ok(text)
            }
            StatusCode::TOO_MANY_REQUESTS => Err(SuggestError::RateLimited),
            status => {
                let body = res.text().await.unwrap_or_default();
                Err(SuggestError::Http {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_model_without_double_slash() {
        let config = SuggestConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..SuggestConfig::default()
        };
        let backend = GeminiBackend::new(&config, None).expect("backend");
        assert_eq!(
            backend.endpoint("gemini-2.5-flash"),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert!(!backend.has_credential());
    }

    #[test]
    fn request_body_carries_schema_only_when_asked() {
        let schema = serde_json::json!({ "type": "OBJECT" });
        let with_schema = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: "hi" }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: JSON_MIME,
                response_schema: &schema,
            }),
        };
        let value = serde_json::to_value(&with_schema).expect("json");
        assert_eq!(value["generationConfig"]["responseMimeType"], JSON_MIME);
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");

        let plain = GenerateRequest {
            contents: Vec::new(),
            generation_config: None,
        };
        let value = serde_json::to_value(&plain).expect("json");
        assert!(value.get("generationConfig").is_none());
    }
}
