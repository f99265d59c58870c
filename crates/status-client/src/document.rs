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

//! Status document model.
//!
//! Mirrors the JSON schema published by the status generator. All fields are
//! defaulted so a partial payload deserializes into a structurally complete
//! document: fields the payload carries win, everything else keeps the
//! default value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse health judgment for the platform as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformStatus {
    /// All systems functioning normally.
    Operational,
    /// Minor performance issues detected.
    Degraded,
    /// Service disruption in progress.
    Outage,
    /// Status information unavailable (also the fallback for
    /// unrecognized values on the wire).
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for PlatformStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Operational => "operational",
            Self::Degraded => "degraded",
            Self::Outage => "outage",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Outcome of the most recent backup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupStatus {
    Success,
    Warning,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Rolling uptime percentages reported by the producer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UptimeStats {
    /// Uptime over the last 24 hours, 0-100.
    #[serde(default)]
    pub last_24h: Option<f64>,
    /// Uptime over the last 7 days, 0-100.
    #[serde(default)]
    pub last_7d: Option<f64>,
}

/// Backup health summary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BackupReport {
    /// Free-text description of the backup policy.
    #[serde(default)]
    pub policy: Option<String>,
    /// Timestamp of the last successful backup (ISO-8601).
    #[serde(default)]
    pub last_successful_backup: Option<String>,
    #[serde(default)]
    pub last_backup_status: BackupStatus,
}

/// Infrastructure description block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InfrastructureInfo {
    /// Free-text description of the hosting model.
    #[serde(default)]
    pub model: Option<String>,
    /// Regions the platform runs in, in display order.
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// The platform status document as consumed by display code.
///
/// `Default` produces the fallback document: `platform_status = unknown`,
/// empty `updated_at`, no optional groups. Deserializing a payload merges it
/// over these defaults field by field, so required fields are always
/// populated and callers only need to handle absence of the optional groups.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusDocument {
    /// When the producer generated this document (ISO-8601), or empty when
    /// the producer did not report a timestamp.
    #[serde(default)]
    pub updated_at: String,

    #[serde(default)]
    pub platform_status: PlatformStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<UptimeStats>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backups: Option<BackupReport>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure: Option<InfrastructureInfo>,
}

impl StatusDocument {
    /// Parse `updated_at` as an RFC-3339 timestamp.
    ///
    /// Returns `None` when the field is empty or does not parse; an
    /// unparseable timestamp is treated the same as a missing one.
    #[must_use]
    pub fn updated_at_time(&self) -> Option<DateTime<Utc>> {
        if self.updated_at.is_empty() {
            return None;
        }
        DateTime::parse_from_rfc3339(&self.updated_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Age of the document in whole minutes at `now`.
    ///
    /// `None` when `updated_at` is absent or unparseable. A timestamp in the
    /// future clamps to zero rather than going negative.
    #[must_use]
    pub fn age_minutes_at(&self, now: DateTime<Utc>) -> Option<i64> {
        let updated = self.updated_at_time()?;
        Some((now - updated).num_minutes().max(0))
    }

    /// Age of the document in whole minutes at the current time.
    #[must_use]
    pub fn age_minutes(&self) -> Option<i64> {
        self.age_minutes_at(Utc::now())
    }

    /// Whether the document is stale at `now` for the given threshold.
    ///
    /// A document with no usable `updated_at` is always stale. Otherwise the
    /// elapsed time must strictly exceed the threshold, compared at
    /// millisecond granularity: a document exactly `threshold_minutes` old
    /// is not yet stale, while any overshoot, even sub-second, is.
    #[must_use]
    pub fn is_stale_at(&self, now: DateTime<Utc>, threshold_minutes: i64) -> bool {
        match self.updated_at_time() {
            Some(updated) => (now - updated).num_milliseconds() > threshold_minutes * 60_000,
            None => true,
        }
    }

    /// Whether the document is stale right now for the given threshold.
    #[must_use]
    pub fn is_stale(&self, threshold_minutes: i64) -> bool {
        self.is_stale_at(Utc::now(), threshold_minutes)
    }
}
