// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::{AnalysisOutcome, RawSubmission};
use crate::error::{Error, Result};
use crate::services::gateway::AnalysisGateway;
use crate::services::validator;

/// What the caller sees when a gateway call fails. The real cause goes to
/// the operator log only; external service internals stay internal.
pub const ANALYSIS_FAILED: &str = "An error occurred during AI analysis. Please try again.";

pub struct Orchestrator {
    gateway: Box<dyn AnalysisGateway>,
}

impl Orchestrator {
    pub fn new(gateway: Box<dyn AnalysisGateway>) -> Self {
        Self { gateway }
    }

    /// Validate, fan out both analysis calls, join on both, reduce.
    ///
    /// Returns `Err` only for cancellation; every other failure is folded
    /// into one of the [`AnalysisOutcome`] variants. Rejection happens
    /// before any gateway call is issued.
    pub async fn analyze(
        &self,
        raw: &RawSubmission,
        cancel: CancellationToken,
    ) -> Result<AnalysisOutcome> {
        let request = match validator::validate(raw) {
            Ok(request) => request,
            Err(Error::InvalidInput(message)) => {
                return Ok(AnalysisOutcome::InputRejected {
                    input_error: message,
                });
            }
            Err(e) => return Err(e),
        };

        debug!(
            language = %request.language(),
            code_chars = request.code().chars().count(),
            "input validated, dispatching analysis calls"
        );

        // Both calls run against the same request; the join waits for both
        // unconditionally since Success needs both halves.
        let (suggestions, explanation) = tokio::join!(
            self.gateway.request_suggestions(&request, cancel.clone()),
            self.gateway.request_explanation(&request, cancel.clone()),
        );

        match (suggestions, explanation) {
            (Ok(suggestions), Ok(explanation)) => Ok(AnalysisOutcome::Success {
                suggestions: suggestions.suggestions,
                bugs: explanation.bugs,
                vulnerabilities: explanation.vulnerabilities,
                explanation: explanation.explanation,
            }),
            (suggestions, explanation) => {
                let errors: Vec<Error> = [suggestions.err(), explanation.err()]
                    .into_iter()
                    .flatten()
                    .collect();

                if errors.iter().any(|e| matches!(e, Error::Cancelled)) {
                    return Err(Error::Cancelled);
                }

                for error in &errors {
                    warn!(gateway = self.gateway.name(), %error, "analysis call failed");
                }

                // One generic message even when both calls failed
                Ok(AnalysisOutcome::ProcessingFailed {
                    error: ANALYSIS_FAILED.into(),
                })
            }
        }
    }
}
