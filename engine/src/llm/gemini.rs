use super::{GenerateRequest, Generation, LLMError, LLMProvider, MessageRole};
use crate::config::GeminiConfig;
use crate::secrets::{scrub, SecretString};
use async_trait::async_trait;
use sdk::GroundingSource;
use serde_json::{json, Value};
use std::time::Duration;

/// Google Gemini `generateContent` provider
pub struct GeminiProvider {
    config: GeminiConfig,
    api_key: SecretString,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig, api_key: SecretString) -> super::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LLMError::Unknown(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    fn build_payload(request: &GenerateRequest) -> Value {
        let mut contents = Vec::new();
        let mut system_parts = Vec::new();

        if let Some(instruction) = &request.system_instruction {
            system_parts.push(json!({ "text": instruction }));
        }

        for msg in &request.messages {
            if msg.role == MessageRole::System {
                system_parts.push(json!({ "text": msg.content }));
                continue;
            }

            contents.push(json!({
                "role": if msg.role == MessageRole::Assistant { "model" } else { "user" },
                "parts": [{"text": msg.content}]
            }));
        }

        let mut payload = serde_json::Map::new();
        payload.insert("contents".to_string(), json!(contents));

        if !system_parts.is_empty() {
            payload.insert(
                "systemInstruction".to_string(),
                json!({ "parts": system_parts }),
            );
        }

        if request.enable_search {
            payload.insert("tools".to_string(), json!([{ "google_search": {} }]));
        }

        Value::Object(payload)
    }

    fn classify_status(status: reqwest::StatusCode, body: String) -> LLMError {
        let body = scrub(&body);
        match status.as_u16() {
            400 | 404 => LLMError::InvalidRequest(body),
            401 | 403 => LLMError::AuthenticationFailed(body),
            429 => LLMError::RateLimitExceeded,
            _ => LLMError::ProviderUnavailable(format!("Gemini API error ({}): {}", status, body)),
        }
    }

    fn transport_error(err: reqwest::Error) -> LLMError {
        if err.is_timeout() {
            return LLMError::Timeout;
        }
        LLMError::NetworkError(scrub(&err.without_url().to_string()))
    }
}

/// Concatenate the text parts of the first candidate.
pub(crate) fn extract_text(data: &Value) -> super::Result<String> {
    let candidate = data
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| LLMError::ParseError("No candidates in response".to_string()))?;

    let parts = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            let reason = candidate
                .get("finishReason")
                .and_then(|r| r.as_str())
                .unwrap_or("unknown");
            LLMError::ParseError(format!("No content in candidate (finish reason: {})", reason))
        })?;

    let mut full_text = String::new();
    for part in parts {
        if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
            full_text.push_str(text);
        }
    }

    Ok(full_text)
}

/// Pull `{uri, title}` pairs out of the first candidate's grounding metadata.
///
/// Chunks without a web reference, or with an empty URI, are dropped. A
/// missing title falls back to the URI.
pub(crate) fn extract_grounding_sources(data: &Value) -> Vec<GroundingSource> {
    let chunks = data
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("groundingMetadata"))
        .and_then(|m| m.get("groundingChunks"))
        .and_then(|g| g.as_array());

    let Some(chunks) = chunks else {
        return Vec::new();
    };

    chunks
        .iter()
        .filter_map(|chunk| {
            let web = chunk.get("web")?;
            let uri = web.get("uri").and_then(|u| u.as_str())?.trim();
            if uri.is_empty() {
                return None;
            }
            let title = web
                .get("title")
                .and_then(|t| t.as_str())
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(uri);
            Some(GroundingSource::new(uri, title))
        })
        .collect()
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, request: &GenerateRequest) -> super::Result<Generation> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        let payload = Self::build_payload(request);

        tracing::debug!(
            model = %self.config.model,
            contents = request.messages.len(),
            search = request.enable_search,
            "Sending Gemini request"
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.unsecure())])
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, text));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(scrub(&e.without_url().to_string())))?;

        let text = extract_text(&data)?;
        let sources = if request.enable_search {
            extract_grounding_sources(&data)
        } else {
            Vec::new()
        };

        Ok(Generation { text, sources })
    }
}
