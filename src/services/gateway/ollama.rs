// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::{AnalysisGateway, explanation_prompt, parse_report, suggestions_prompt};
use crate::config::Config;
use crate::domain::{AnalysisRequest, ExplanationReport, SuggestionReport};
use crate::error::{Error, Result};

pub struct OllamaGateway {
    client: Client,
    host: String,
    model: String,
    temperature: f32,
    num_predict: u32,
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    system: String,
    stream: bool,
    format: String,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaGateway {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            // Sanitize: remove trailing slashes to avoid //api/generate
            host: config.ollama_host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            num_predict: config.num_predict,
        }
    }

    /// List models known to the Ollama server.
    pub async fn health_check(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.host);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_connect() {
                Error::OllamaNotRunning {
                    host: self.host.clone(),
                }
            } else {
                Error::gateway("health", e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(Error::OllamaNotRunning {
                host: self.host.clone(),
            });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| Error::gateway("health", e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn generate(&self, call: &str, prompt: String, cancel: CancellationToken) -> Result<String> {
        let url = format!("{}/api/generate", self.host);

        let body = GenerateRequest {
            model: self.model.clone(),
            prompt,
            system: super::SYSTEM_PROMPT.to_string(),
            stream: false,
            format: "json".to_string(),
            options: GenerateOptions {
                temperature: self.temperature,
                num_predict: self.num_predict,
            },
        };

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            resp = self.client.post(&url).json(&body).send() => {
                resp.map_err(|e| {
                    if e.is_connect() {
                        Error::OllamaNotRunning { host: self.host.clone() }
                    } else if e.is_timeout() {
                        Error::gateway(call, "request timed out")
                    } else {
                        Error::gateway(call, e.to_string())
                    }
                })?
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::gateway(call, format!("HTTP {status}: {body}")));
        }

        let parsed = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            parsed = response.json::<GenerateResponse>() => {
                parsed.map_err(|e| Error::gateway(call, e.to_string()))?
            }
        };

        Ok(parsed.response)
    }
}

#[async_trait]
impl AnalysisGateway for OllamaGateway {
    async fn verify(&self) -> Result<()> {
        let available = self.health_check().await?;

        // Accept both exact names and ":latest"-tagged variants
        let found = available
            .iter()
            .any(|m| m == &self.model || m.trim_end_matches(":latest") == self.model);

        if !found {
            return Err(Error::ModelNotFound {
                model: self.model.clone(),
                available,
            });
        }

        Ok(())
    }

    async fn request_suggestions(
        &self,
        request: &AnalysisRequest,
        cancel: CancellationToken,
    ) -> Result<SuggestionReport> {
        let raw = self
            .generate("suggestions", suggestions_prompt(request), cancel)
            .await?;
        parse_report("suggestions", &raw)
    }

    async fn request_explanation(
        &self,
        request: &AnalysisRequest,
        cancel: CancellationToken,
    ) -> Result<ExplanationReport> {
        let raw = self
            .generate("explanation", explanation_prompt(request), cancel)
            .await?;
        parse_report("explanation", &raw)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
