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

//! Fire-and-forget telemetry for status fetches.
//!
//! The client reports a small set of named events through a [`TelemetrySink`]
//! capability. Sinks must never fail the caller: emission errors are logged
//! and swallowed so telemetry can never affect the fetch result.

use chrono::Utc;
use log::{info, warn};
use serde_json::json;

/// Events emitted by the status client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryEvent {
    /// A fetch completed with fresh data.
    FetchSuccess { duration_ms: u64, age_minutes: i64 },
    /// A fetch failed: transport error, parse error, or non-success HTTP
    /// status. `status_code` is set only for the HTTP-status case.
    FetchError {
        duration_ms: u64,
        status_code: Option<u16>,
        error: Option<String>,
    },
    /// A fetch succeeded but the document is older than the stale threshold.
    StaleData { duration_ms: u64, age_minutes: i64 },
    /// The resolved document carries `platform_status = unknown`.
    UnknownStatus { duration_ms: u64 },
}

impl TelemetryEvent {
    /// Stable event name, shared with the analytics collector.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchSuccess { .. } => "status_fetch_success",
            Self::FetchError { .. } => "status_fetch_error",
            Self::StaleData { .. } => "status_stale_data",
            Self::UnknownStatus { .. } => "status_unknown",
        }
    }

    /// Attribute payload as sent to the collector.
    #[must_use]
    pub fn attributes(&self) -> serde_json::Value {
        match self {
            Self::FetchSuccess {
                duration_ms,
                age_minutes,
            }
            | Self::StaleData {
                duration_ms,
                age_minutes,
            } => json!({
                "duration": duration_ms,
                "age_minutes": age_minutes,
            }),
            Self::FetchError {
                duration_ms,
                status_code,
                error,
            } => json!({
                "duration": duration_ms,
                "status_code": status_code,
                "error": error,
            }),
            Self::UnknownStatus { duration_ms } => json!({
                "duration": duration_ms,
            }),
        }
    }
}

/// Capability for reporting telemetry events.
///
/// Implementations must be cheap and infallible from the caller's point of
/// view. Swap in [`NoopSink`] to silence telemetry in tests.
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, event: TelemetryEvent);
}

/// Sink that writes events to the local log. Default outside production.
#[derive(Debug, Default)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn emit(&self, event: TelemetryEvent) {
        info!("[analytics] {} {}", event.name(), event.attributes());
    }
}

/// Sink that discards all events.
#[derive(Debug, Default)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn emit(&self, _event: TelemetryEvent) {}
}

/// Sink that forwards events to an analytics collector over HTTP.
///
/// Each event becomes a JSON POST of `{event, data, timestamp}`. Delivery
/// runs in a background task; failures are logged and dropped. Requires a
/// running tokio runtime, which the async fetch path already guarantees.
#[derive(Debug)]
pub struct HttpSink {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpSink {
    /// Create a sink posting to `endpoint`.
    #[must_use]
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            http: reqwest::Client::new(),
        }
    }
}

impl TelemetrySink for HttpSink {
    fn emit(&self, event: TelemetryEvent) {
        let body = json!({
            "event": event.name(),
            "data": event.attributes(),
            "timestamp": Utc::now().to_rfc3339(),
        });
        let request = self.http.post(&self.endpoint).json(&body);
        let name = event.name();

        tokio::spawn(async move {
            if let Err(e) = request.send().await {
                warn!("[analytics] failed to send {}: {}", name, e);
            }
        });
    }
}
