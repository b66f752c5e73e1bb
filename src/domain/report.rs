// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use serde::{Deserialize, Serialize};

/// Output schema of the suggestions call. Deserialized strictly; a model
/// response missing the field is a gateway error, not an empty report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionReport {
    pub suggestions: Vec<String>,
}

/// Output schema of the explanation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationReport {
    pub explanation: String,
    pub bugs: Vec<String>,
    pub vulnerabilities: Vec<String>,
}

/// Terminal result of one analysis. Exactly one variant per submission;
/// `Success` is only built once both gateway calls have succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Success {
        suggestions: Vec<String>,
        bugs: Vec<String>,
        vulnerabilities: Vec<String>,
        explanation: String,
    },
    InputRejected {
        input_error: String,
    },
    ProcessingFailed {
        error: String,
    },
}
