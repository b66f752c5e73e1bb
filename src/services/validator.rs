// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use crate::domain::{AnalysisRequest, Language, RawSubmission};
use crate::error::{Error, Result};

/// Minimum code length, counted on the trimmed submission.
pub const MIN_CODE_CHARS: usize = 10;

pub const CODE_TOO_SHORT: &str = "Code must be at least 10 characters long.";
pub const LANGUAGE_UNSUPPORTED: &str = "Language must be one of: javascript, python, java.";

/// Validate a raw submission into an immutable [`AnalysisRequest`].
///
/// Pure and synchronous: no I/O, no side effects, same result for the
/// same input every time. Field checks run in declaration order, so when
/// both fields are invalid the `code` error is the one reported.
pub fn validate(raw: &RawSubmission) -> Result<AnalysisRequest> {
    let code = raw.code.as_deref().unwrap_or("");
    if code.trim().chars().count() < MIN_CODE_CHARS {
        return Err(Error::InvalidInput(CODE_TOO_SHORT.into()));
    }

    let language = raw
        .language
        .as_deref()
        .unwrap_or("")
        .parse::<Language>()
        .map_err(|()| Error::InvalidInput(LANGUAGE_UNSUPPORTED.into()))?;

    // The stored code is the submitted text verbatim; trimming was only
    // for the length check.
    Ok(AnalysisRequest::new(code.to_string(), language))
}
