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

//! Terminal rendering of the platform status card.
//!
//! Produces the same information hierarchy as the status page card: health
//! indicator and label, last-updated line with age, staleness warning, then
//! the optional uptime, backup, and infrastructure blocks when present.

use chrono::Local;
use status_client::display::{format_age, staleness_warning, status_label, Severity};
use status_client::StatusDocument;

use crate::config::AppConfig;

fn indicator(severity: Severity) -> &'static str {
    match severity {
        Severity::Normal => "●",
        Severity::Warning => "▲",
        Severity::Critical => "✖",
        Severity::Unknown => "?",
    }
}

/// Render the status card as a block of text.
pub fn render(document: &StatusDocument, config: &AppConfig) -> String {
    let mut lines = Vec::new();

    let (label, severity) = status_label(document.platform_status);
    lines.push("Platform Status".to_string());
    lines.push(format!("{} {label}", indicator(severity)));

    match document.updated_at_time() {
        Some(updated) => {
            let local = updated.with_timezone(&Local);
            lines.push(format!(
                "Updated: {} ({})",
                local.format("%Y-%m-%d %H:%M:%S"),
                format_age(document.age_minutes())
            ));
        }
        None => lines.push("Updated: N/A".to_string()),
    }

    if let Some(warning) = staleness_warning(
        document,
        config.stale_threshold_minutes,
        config.severe_stale_threshold_minutes,
    ) {
        lines.push(format!("⚠ {warning}"));
    }

    if let Some(uptime) = &document.uptime {
        lines.push(format!(
            "Uptime 24h: {} · 7d: {}",
            format_percent(uptime.last_24h),
            format_percent(uptime.last_7d)
        ));
    }

    if let Some(backups) = &document.backups {
        if let Some(policy) = &backups.policy {
            lines.push(policy.clone());
        }
        if let Some(last) = &backups.last_successful_backup {
            lines.push(format!("Last backup: {last}"));
        }
    }

    if let Some(infrastructure) = &document.infrastructure {
        if let Some(model) = &infrastructure.model {
            lines.push(model.clone());
        }
        if !infrastructure.regions.is_empty() {
            lines.push(format!("Regions: {}", infrastructure.regions.join(", ")));
        }
    }

    lines.join("\n")
}

fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v}%"),
        None => "N/A".to_string(),
    }
}
