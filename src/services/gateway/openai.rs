// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::{AnalysisGateway, SYSTEM_PROMPT, explanation_prompt, parse_report, suggestions_prompt};
use crate::config::Config;
use crate::domain::{AnalysisRequest, ExplanationReport, SuggestionReport};
use crate::error::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiGateway {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
    stream: bool,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl OpenAiGateway {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config
                .openai_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone().unwrap_or_default(),
            temperature: config.temperature,
            max_tokens: config.num_predict,
        }
    }

    async fn complete(&self, call: &str, prompt: String, cancel: CancellationToken) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".into(),
                    content: SYSTEM_PROMPT.into(),
                },
                Message {
                    role: "user".into(),
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object".into(),
            },
            stream: false,
        };

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            resp = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
                .send() => {
                resp.map_err(|e| {
                    if e.is_timeout() {
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
            parsed = response.json::<ChatResponse>() => {
                parsed.map_err(|e| Error::gateway(call, e.to_string()))?
            }
        };

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::gateway(call, "empty completion"))
    }
}

#[async_trait]
impl AnalysisGateway for OpenAiGateway {
    async fn verify(&self) -> Result<()> {
        let url = format!("{}/models", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| Error::gateway("verify", e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::gateway("verify", "invalid API key"));
        }

        Ok(())
    }

    async fn request_suggestions(
        &self,
        request: &AnalysisRequest,
        cancel: CancellationToken,
    ) -> Result<SuggestionReport> {
        let raw = self
            .complete("suggestions", suggestions_prompt(request), cancel)
            .await?;
        parse_report("suggestions", &raw)
    }

    async fn request_explanation(
        &self,
        request: &AnalysisRequest,
        cancel: CancellationToken,
    ) -> Result<ExplanationReport> {
        let raw = self
            .complete("explanation", explanation_prompt(request), cancel)
            .await?;
        parse_report("explanation", &raw)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
