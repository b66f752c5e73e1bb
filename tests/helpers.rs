// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use codesonar::domain::RawSubmission;

#[allow(dead_code)]
pub const VALID_CODE: &str = "print('hello world')";

/// Raw submission with both fields present.
#[allow(dead_code)]
pub fn submission(code: &str, language: &str) -> RawSubmission {
    RawSubmission::new(code, language)
}

/// Raw submission with one or both fields missing.
#[allow(dead_code)]
pub fn partial_submission(code: Option<&str>, language: Option<&str>) -> RawSubmission {
    RawSubmission {
        code: code.map(str::to_string),
        language: language.map(str::to_string),
    }
}
