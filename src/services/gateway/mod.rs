// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

pub mod ollama;
pub mod openai;

use crate::config::{Config, Provider};
use crate::domain::{AnalysisRequest, ExplanationReport, SuggestionReport};
use crate::error::{Error, Result};

/// The two analysis capabilities the external generative service exposes.
///
/// Each method is a single request/response exchange with a declared
/// output schema; there is no retry here and no shared behavior between
/// the two calls beyond "async call with typed I/O".
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    /// Preflight: check the service is reachable and the configured model
    /// is usable. Runs before any analysis is orchestrated.
    async fn verify(&self) -> Result<()>;

    async fn request_suggestions(
        &self,
        request: &AnalysisRequest,
        cancel: CancellationToken,
    ) -> Result<SuggestionReport>;

    async fn request_explanation(
        &self,
        request: &AnalysisRequest,
        cancel: CancellationToken,
    ) -> Result<ExplanationReport>;

    fn name(&self) -> &str;
}

pub fn create_gateway(config: &Config) -> Result<Box<dyn AnalysisGateway>> {
    match config.provider {
        Provider::Ollama => Ok(Box::new(ollama::OllamaGateway::new(config))),
        Provider::OpenAI => Ok(Box::new(openai::OpenAiGateway::new(config))),
    }
}

pub(crate) const SYSTEM_PROMPT: &str = "You are a code analysis expert. \
Respond with a single JSON object and nothing else: no prose, no markdown \
fences, no trailing commentary.";

pub(crate) fn suggestions_prompt(request: &AnalysisRequest) -> String {
    format!(
        "You are an expert code reviewer. Review the given code snippet and \
provide concrete suggestions for improving its style and quality.\n\n\
Respond with exactly one JSON object of the shape:\n\
{{\"suggestions\": [\"...\"]}}\n\n\
Language: {}\nCode:\n{}",
        request.language(),
        request.code()
    )
}

pub(crate) fn explanation_prompt(request: &AnalysisRequest) -> String {
    format!(
        "You are a code analysis expert. Analyze the given code snippet and \
provide explanations for complex code blocks, potential bug occurrences, \
and vulnerability details.\n\n\
Respond with exactly one JSON object of the shape:\n\
{{\"explanation\": \"...\", \"bugs\": [\"...\"], \"vulnerabilities\": [\"...\"]}}\n\n\
Language: {}\nCode:\n{}",
        request.language(),
        request.code()
    )
}

/// Locate the JSON object inside raw model output. Models wrap answers in
/// code fences or preamble often enough that this cannot be skipped.
pub(crate) fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end >= start).then(|| &raw[start..=end])
}

/// Parse raw model output against the declared schema for `call`.
/// Anything that does not deserialize cleanly is a gateway error; output
/// is never coerced into a half-valid report.
pub(crate) fn parse_report<T: DeserializeOwned>(call: &str, raw: &str) -> Result<T> {
    let json = extract_json_object(raw)
        .ok_or_else(|| Error::gateway(call, "no JSON object in model output"))?;
    serde_json::from_str(json)
        .map_err(|e| Error::gateway(call, format!("output violates schema: {e}")))
}
