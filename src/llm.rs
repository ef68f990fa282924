//! Language model implementations and abstractions.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::ModelConfig;
use crate::error::{ChatError, ModelErrorKind, Result};

const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model identifiers tried in order by [`recommended_model`].
const PREFERRED_MODELS: [&str; 4] = [
    "gemini-2.0-flash",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-pro",
];

/// Minimal abstraction around a text completion provider.
///
/// One call per turn, no retry: the caller decides what to surface when a
/// call fails.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

// reqwest errors can echo the request URL, which carries the API key as a
// query parameter.
fn transport_error(err: reqwest::Error) -> ChatError {
    ChatError::Model {
        kind: ModelErrorKind::Unknown,
        message: format!("gemini request error: {}", err.without_url()),
    }
}

fn coalesce_error(status: reqwest::StatusCode, body: &str, provider: &str) -> ChatError {
    let kind = if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        ModelErrorKind::Quota
    } else {
        ModelErrorKind::classify(body)
    };
    ChatError::Model {
        kind,
        message: format!("{provider} request failed with {status}: {body}"),
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    model: String,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn from_config(cfg: &ModelConfig) -> Result<Self> {
        let api_key = cfg.api_key.clone().ok_or_else(|| {
            ChatError::Config("missing Gemini API key in model config".into())
        })?;
        let endpoint = cfg
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_GEMINI_ENDPOINT.to_string());
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(cfg.request_timeout_secs))
                .build()
                .map_err(|err| ChatError::Config(format!("http client error: {err}")))?,
            model: cfg.model.clone(),
            api_key,
            endpoint,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Lists the model identifiers the service reports as available.
    ///
    /// Used as a startup preflight; the configured model is never switched at
    /// runtime.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let resp = self
            .http
            .get(format!("{}/models?key={}", self.endpoint, self.api_key))
            .send()
            .await
            .map_err(transport_error)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(coalesce_error(status, &body, "gemini"));
        }

        let parsed: GeminiModelsResponse = resp.json().await.map_err(|err| ChatError::Model {
            kind: ModelErrorKind::Unknown,
            message: format!("gemini response parse error: {err}"),
        })?;

        Ok(parsed
            .models
            .into_iter()
            .map(|m| m.name.trim_start_matches("models/").to_string())
            .collect())
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let payload = json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
        });
        let resp = self
            .http
            .post(format!(
                "{}/models/{}:generateContent?key={}",
                self.endpoint, self.model, self.api_key
            ))
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(coalesce_error(status, &body, "gemini"));
        }

        let parsed: GeminiResponse = resp.json().await.map_err(|err| ChatError::Model {
            kind: ModelErrorKind::Unknown,
            message: format!("gemini response parse error: {err}"),
        })?;

        let content = parsed
            .candidates
            .first()
            .and_then(|cand| cand.content.parts.first())
            .map(|part| part.text.clone())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ChatError::Model {
                kind: ModelErrorKind::Unknown,
                message: "gemini returned an empty completion".into(),
            });
        }
        Ok(content)
    }
}

/// Picks the best model from an availability listing: the first preferred
/// identifier that is available, otherwise the first available one.
pub fn recommended_model(available: &[String]) -> Option<&str> {
    PREFERRED_MODELS
        .iter()
        .find(|preferred| available.iter().any(|a| a == *preferred))
        .copied()
        .or_else(|| available.first().map(String::as_str))
}

/// A deterministic model used for tests and demos: pops scripted outcomes in
/// order.
pub struct StubModel {
    script: Mutex<VecDeque<Result<String>>>,
}

impl StubModel {
    pub fn new(responses: Vec<String>) -> Arc<Self> {
        Self::with_outcomes(responses.into_iter().map(Ok).collect())
    }

    pub fn with_outcomes(script: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
        })
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        let mut locked = self.script.lock().expect("stub model poisoned");
        locked.pop_front().unwrap_or_else(|| {
            Err(ChatError::Model {
                kind: ModelErrorKind::Unknown,
                message: "StubModel ran out of scripted responses".into(),
            })
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    // Absent on candidates blocked by the service's safety filters.
    #[serde(default)]
    content: GeminiCandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiModelsResponse {
    #[serde(default)]
    models: Vec<GeminiModelEntry>,
}

#[derive(Debug, Deserialize)]
struct GeminiModelEntry {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_pops_outcomes_in_order() {
        let model = StubModel::with_outcomes(vec![
            Ok("first".into()),
            Err(ChatError::Model {
                kind: ModelErrorKind::Auth,
                message: "scripted".into(),
            }),
        ]);

        assert_eq!(model.complete("p").await.unwrap(), "first");
        assert!(matches!(
            model.complete("p").await,
            Err(ChatError::Model {
                kind: ModelErrorKind::Auth,
                ..
            })
        ));
        // Exhausted scripts fail rather than loop.
        assert!(model.complete("p").await.is_err());
    }

    #[test]
    fn recommends_preferred_models_first() {
        let available = vec![
            "gemini-exp".to_string(),
            "gemini-1.5-flash".to_string(),
            "gemini-pro".to_string(),
        ];
        assert_eq!(recommended_model(&available), Some("gemini-1.5-flash"));

        let unknown_only = vec!["palm-2".to_string()];
        assert_eq!(recommended_model(&unknown_only), Some("palm-2"));

        assert_eq!(recommended_model(&[]), None);
    }
}
