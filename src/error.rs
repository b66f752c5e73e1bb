// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

// miette's Diagnostic derive generates code that triggers this false positive
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("{0}")]
    #[diagnostic(
        code(codesonar::input::invalid),
        help("Fix the reported field and resubmit")
    )]
    InvalidInput(String),

    #[error("{0}")]
    #[diagnostic(
        code(codesonar::analysis::failed),
        help("The AI service may be briefly unavailable; retry in a few seconds")
    )]
    AnalysisFailed(String),

    #[error("Cannot connect to Ollama at {host}")]
    #[diagnostic(
        code(codesonar::ollama::not_running),
        help("Start Ollama with: ollama serve")
    )]
    OllamaNotRunning { host: String },

    #[error("Model '{model}' not found. Available: {}", available.join(", "))]
    #[diagnostic(
        code(codesonar::ollama::model_not_found),
        help("Pull the model with: ollama pull {model}")
    )]
    ModelNotFound {
        model: String,
        available: Vec<String>,
    },

    #[error("'{call}' analysis call failed: {message}")]
    #[diagnostic(code(codesonar::gateway::error))]
    Gateway { call: String, message: String },

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Configuration error: {0}")]
    #[diagnostic(code(codesonar::config::error))]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn gateway(call: &str, message: impl Into<String>) -> Self {
        Error::Gateway {
            call: call.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
