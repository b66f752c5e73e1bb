// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use super::Language;

/// Raw key-value submission exactly as it arrived (CLI flags, stdin,
/// form fields). Nothing is trusted yet; either field may be absent.
#[derive(Debug, Clone, Default)]
pub struct RawSubmission {
    pub code: Option<String>,
    pub language: Option<String>,
}

impl RawSubmission {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            language: Some(language.into()),
        }
    }
}

/// A validated submission. Immutable: fields are private and the only
/// constructor lives in the validator, so holding one proves the input
/// contract was enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    code: String,
    language: Language,
}

impl AnalysisRequest {
    pub(crate) fn new(code: String, language: Language) -> Self {
        Self { code, language }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn language(&self) -> Language {
        self.language
    }
}
