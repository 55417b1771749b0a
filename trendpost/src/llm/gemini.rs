use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use common::GeneratorConfig;

use super::{GenerationRequest, GenerationResponse, LlmProvider, UsageMetadata};

/// Provider backed by the Google Gemini REST API
/// (generativelanguage.googleapis.com, v1beta surface).
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    model: Option<String>,
    preferred_models: Vec<String>,
    fallback_model: String,
    timeout: Duration,
    default_max_output_tokens: Option<u32>,
    default_temperature: Option<f32>,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Build a provider from the generator config section and the resolved
    /// API key.
    pub fn from_config(config: &GeneratorConfig, api_key: impl Into<String>) -> Self {
        Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: config.model.clone(),
            preferred_models: config.preferred_models.clone(),
            fallback_model: config.fallback_model.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            default_max_output_tokens: config.max_output_tokens,
            default_temperature: config.temperature,
            client: reqwest::Client::new(),
        }
    }

    /// List the models the API currently offers.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/models", self.base_url);

        let response = tokio::time::timeout(
            self.timeout,
            self.client
                .get(&url)
                .query(&[("key", self.api_key.as_str())])
                .send(),
        )
        .await
        .context("model listing timed out")?
        .context("model listing request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("model listing error {}: {}", status, body);
        }

        let listing: ListModelsResponse = response
            .json()
            .await
            .context("failed to parse model listing")?;

        Ok(listing.models)
    }

    /// Decide which model to generate with. An explicitly configured model
    /// wins; otherwise the live listing is consulted and the first model
    /// matching the highest-priority name pattern is taken. A failed listing
    /// or an empty match falls back to the configured default.
    pub async fn resolve_model(&self) -> String {
        if let Some(model) = &self.model {
            return model.clone();
        }

        match self.list_models().await {
            Ok(models) => match select_model(&models, &self.preferred_models) {
                Some(name) => name,
                None => {
                    warn!(
                        "no listed model matched {:?}; falling back to {}",
                        self.preferred_models, self.fallback_model
                    );
                    self.fallback_model.clone()
                }
            },
            Err(e) => {
                warn!("model listing failed: {:#}; falling back to {}", e, self.fallback_model);
                self.fallback_model.clone()
            }
        }
    }
}

/// Pick the first listed model (in priority-pattern order) that supports
/// content generation. Returns `None` when nothing matches.
pub fn select_model(models: &[ModelInfo], preferred: &[String]) -> Option<String> {
    let usable: Vec<&ModelInfo> = models
        .iter()
        .filter(|m| {
            m.supported_generation_methods
                .iter()
                .any(|method| method == "generateContent")
        })
        .collect();

    for pattern in preferred {
        if let Some(model) = usable.iter().find(|m| m.name.contains(pattern.as_str())) {
            return Some(model.name.clone());
        }
    }

    None
}

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let model = self.resolve_model().await;
        // Listed names carry a "models/" prefix; the URL path adds its own.
        let model_path = model.strip_prefix("models/").unwrap_or(model.as_str());

        let max_output_tokens = request.max_output_tokens.or(self.default_max_output_tokens);
        let temperature = request.temperature.or(self.default_temperature);
        let generation_config = if max_output_tokens.is_some() || temperature.is_some() {
            Some(GenerationConfig {
                max_output_tokens,
                temperature,
            })
        } else {
            None
        };

        let req_body = GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![Part {
                    text: request.prompt,
                }],
            }],
            generation_config,
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, model_path);

        // Make HTTP request with timeout
        let response = tokio::time::timeout(
            self.timeout,
            self.client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&req_body)
                .send(),
        )
        .await
        .context("generation request timed out")?
        .context("generation HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("generation API error {}: {}", status, body);
        }

        let resp_body: GenerateContentResponse = response
            .json()
            .await
            .context("failed to parse generation response")?;

        let candidate = resp_body
            .candidates
            .first()
            .context("generation response has no candidates")?;

        let content = candidate
            .content
            .as_ref()
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect::<String>())
            .unwrap_or_default();

        if content.is_empty() {
            anyhow::bail!(
                "generation returned no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            );
        }

        let usage = resp_body.usage_metadata.unwrap_or_default();

        Ok(GenerationResponse {
            content,
            usage: UsageMetadata {
                prompt_tokens: usage.prompt_token_count,
                completion_tokens: usage.candidates_token_count,
                total_tokens: usage.total_token_count,
            },
            model,
        })
    }
}

// Gemini REST request/response structures
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Usage {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
    #[serde(default)]
    total_token_count: usize,
}

/// One entry from the model listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(name: &str, methods: &[&str]) -> ModelInfo {
        ModelInfo {
            name: name.to_string(),
            supported_generation_methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn preferred() -> Vec<String> {
        vec![
            "gemini-1.5-pro".to_string(),
            "gemini-1.5-flash".to_string(),
            "gemini-pro".to_string(),
        ]
    }

    #[test]
    fn test_selection_follows_priority_order() {
        let models = vec![
            model("models/gemini-1.5-flash", &["generateContent"]),
            model("models/gemini-1.5-pro", &["generateContent"]),
            model("models/gemini-pro", &["generateContent"]),
        ];

        let picked = select_model(&models, &preferred());
        assert_eq!(picked.as_deref(), Some("models/gemini-1.5-pro"));
    }

    #[test]
    fn test_selection_skips_models_without_generation_support() {
        let models = vec![
            model("models/gemini-1.5-pro", &["embedContent"]),
            model("models/gemini-1.5-flash", &["generateContent"]),
        ];

        let picked = select_model(&models, &preferred());
        assert_eq!(picked.as_deref(), Some("models/gemini-1.5-flash"));
    }

    #[test]
    fn test_selection_returns_none_for_an_empty_listing() {
        assert!(select_model(&[], &preferred()).is_none());
    }

    #[test]
    fn test_selection_returns_none_when_nothing_matches() {
        let models = vec![model("models/chat-bison-001", &["generateContent"])];
        assert!(select_model(&models, &preferred()).is_none());
    }
}
