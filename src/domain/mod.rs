// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

mod language;
mod report;
mod request;

pub use language::*;
pub use report::*;
pub use request::*;
