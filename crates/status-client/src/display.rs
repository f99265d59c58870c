// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Display helpers shared by status presentation code.
//!
//! These map the document onto user-facing wording. The severe-staleness
//! threshold here (default 60 minutes) is a display concern, separate from
//! the 30-minute threshold that drives telemetry.

use crate::document::{PlatformStatus, StatusDocument};

/// Display severity for a platform status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
    Critical,
    Unknown,
}

/// User-facing label and severity for a platform status.
#[must_use]
pub fn status_label(status: PlatformStatus) -> (&'static str, Severity) {
    match status {
        PlatformStatus::Operational => ("All systems operational", Severity::Normal),
        PlatformStatus::Degraded => ("Minor degradation", Severity::Warning),
        PlatformStatus::Outage => ("Service disruption", Severity::Critical),
        PlatformStatus::Unknown => ("Status unavailable", Severity::Unknown),
    }
}

/// Warning line for a stale document, or `None` when the document is fresh.
///
/// A document with no usable timestamp gets no warning line (the "N/A"
/// updated-at display already covers it). Past `severe_threshold_minutes`
/// the wording escalates.
#[must_use]
pub fn staleness_warning(
    document: &StatusDocument,
    stale_threshold_minutes: i64,
    severe_threshold_minutes: i64,
) -> Option<&'static str> {
    let age = document.age_minutes()?;
    if !document.is_stale(stale_threshold_minutes) {
        return None;
    }
    if age > severe_threshold_minutes {
        Some("Data significantly outdated - may not reflect current status")
    } else {
        Some("Data may be outdated")
    }
}

/// Human-readable age: "12m ago", "2h ago", or "N/A" when unavailable.
#[must_use]
pub fn format_age(age_minutes: Option<i64>) -> String {
    match age_minutes {
        Some(minutes) if minutes < 60 => format!("{minutes}m ago"),
        Some(minutes) => format!("{}h ago", minutes / 60),
        None => "N/A".to_string(),
    }
}
