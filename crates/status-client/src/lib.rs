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

//! Client library for the Elytracloud platform status feed.
//!
//! The status generator publishes a JSON document describing overall platform
//! health, uptime, and backup state roughly every ten minutes. This library
//! fetches that document, normalizes it, and annotates it with a freshness
//! judgment, degrading gracefully to a structurally complete fallback
//! document on any failure:
//!
//! - **Document layer**: [`StatusDocument`] and its nested groups, with
//!   field-wise defaults so partial payloads stay well-formed
//! - **Client layer**: [`StatusClient`] with a per-endpoint TTL cache and an
//!   infallible `fetch()` (every failure path yields the default document)
//! - **Telemetry layer**: named fetch events routed through a swappable
//!   [`TelemetrySink`]
//! - **Display layer**: label/severity mapping and staleness wording for
//!   presentation code
//!
//! # Quick Start
//!
//! ```no_run
//! use status_client::{ClientConfig, StatusClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = StatusClient::new(ClientConfig {
//!         endpoint_url: Some("https://status.elytracloud.com/status.json".to_string()),
//!         ..Default::default()
//!     });
//!
//!     let status = client.fetch().await;
//!     println!("{}", status.platform_status);
//!     if client.is_stale(&status) {
//!         println!("warning: status data may be outdated");
//!     }
//! }
//! ```

pub mod cache;
pub mod display;
pub mod document;
pub mod telemetry;

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use thiserror::Error;

use cache::ResponseCache;
pub use document::{
    BackupReport, BackupStatus, InfrastructureInfo, PlatformStatus, StatusDocument, UptimeStats,
};
pub use telemetry::{HttpSink, LogSink, NoopSink, TelemetryEvent, TelemetrySink};

/// Default cache lifetime, matched to the producer's update cadence.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Default staleness threshold in minutes (drives telemetry and `is_stale`).
pub const DEFAULT_STALE_THRESHOLD_MINUTES: i64 = 30;

/// Default severe-staleness threshold in minutes (display escalation only).
pub const DEFAULT_SEVERE_STALE_THRESHOLD_MINUTES: i64 = 60;

/// Default timeout for the outbound status request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Internal failure taxonomy for a single fetch attempt.
///
/// Never escapes [`StatusClient::fetch`]; it only selects the log level and
/// telemetry attributes before the call resolves to the default document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status: {0}")]
    HttpStatus(u16),

    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Configuration for the status client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Status endpoint URL. When absent, `fetch()` returns the default
    /// document without touching the network.
    pub endpoint_url: Option<String>,
    /// Lifetime of a cached response.
    pub cache_ttl: Duration,
    /// Age beyond which a document counts as stale.
    pub stale_threshold_minutes: i64,
    /// Age beyond which display wording escalates.
    pub severe_stale_threshold_minutes: i64,
    /// Timeout for the outbound HTTP request.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            stale_threshold_minutes: DEFAULT_STALE_THRESHOLD_MINUTES,
            severe_stale_threshold_minutes: DEFAULT_SEVERE_STALE_THRESHOLD_MINUTES,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Fetches and normalizes the platform status document.
///
/// `fetch()` is infallible by contract: configuration, transport, HTTP, and
/// payload failures all resolve to [`StatusDocument::default`] so callers
/// never need an error path. Successful documents are cached per endpoint
/// URL for the configured TTL; failures are never cached.
pub struct StatusClient {
    config: ClientConfig,
    http: reqwest::Client,
    cache: ResponseCache,
    telemetry: Arc<dyn TelemetrySink>,
}

impl std::fmt::Debug for StatusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusClient")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl StatusClient {
    /// Create a client that reports telemetry to the local log.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_telemetry(config, Arc::new(LogSink))
    }

    /// Create a client with a custom telemetry sink.
    #[must_use]
    pub fn with_telemetry(config: ClientConfig, telemetry: Arc<dyn TelemetrySink>) -> Self {
        let http = match reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                warn!("[status] failed to build HTTP client with timeout: {e}");
                reqwest::Client::new()
            }
        };
        let cache = ResponseCache::new(config.cache_ttl);

        Self {
            config,
            http,
            cache,
            telemetry,
        }
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch the current status document.
    ///
    /// Returns a cached document when one is still inside the TTL window.
    /// On any failure this logs, emits a `status_fetch_error` event, and
    /// returns the default document; it never returns an error.
    pub async fn fetch(&self) -> StatusDocument {
        let Some(url) = self.config.endpoint_url.clone() else {
            warn!("[status] endpoint URL not configured");
            return StatusDocument::default();
        };

        if let Some(cached) = self.cache.get(&url) {
            return cached;
        }

        let start = Instant::now();
        match self.fetch_uncached(&url).await {
            Ok(document) => {
                let duration_ms = elapsed_ms(start);
                self.report_outcome(&document, duration_ms);
                self.cache.store(&url, document.clone());
                document
            }
            Err(e) => {
                let duration_ms = elapsed_ms(start);
                self.report_failure(&e, duration_ms);
                StatusDocument::default()
            }
        }
    }

    /// Whether `document` is stale under this client's configured threshold.
    #[must_use]
    pub fn is_stale(&self, document: &StatusDocument) -> bool {
        document.is_stale(self.config.stale_threshold_minutes)
    }

    async fn fetch_uncached(&self, url: &str) -> Result<StatusDocument, FetchError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let document: StatusDocument = serde_json::from_str(&body)?;
        Ok(document)
    }

    fn report_outcome(&self, document: &StatusDocument, duration_ms: u64) {
        // No usable timestamp means no freshness judgment to report; the
        // unknown-status event below still fires.
        if let Some(age_minutes) = document.age_minutes() {
            if document.is_stale(self.config.stale_threshold_minutes) {
                warn!("[status] data is stale ({age_minutes} minutes old)");
                self.telemetry.emit(TelemetryEvent::StaleData {
                    duration_ms,
                    age_minutes,
                });
            } else {
                info!("[status] fetched successfully ({duration_ms}ms, {age_minutes} min old)");
                self.telemetry.emit(TelemetryEvent::FetchSuccess {
                    duration_ms,
                    age_minutes,
                });
            }
        }

        if document.platform_status == PlatformStatus::Unknown {
            self.telemetry
                .emit(TelemetryEvent::UnknownStatus { duration_ms });
        }
    }

    fn report_failure(&self, error: &FetchError, duration_ms: u64) {
        match error {
            FetchError::HttpStatus(code) => {
                warn!("[status] fetch failed: HTTP {code} ({duration_ms}ms)");
                self.telemetry.emit(TelemetryEvent::FetchError {
                    duration_ms,
                    status_code: Some(*code),
                    error: None,
                });
            }
            FetchError::Transport(_) | FetchError::Payload(_) => {
                error!("[status] fetch error after {duration_ms}ms: {error}");
                self.telemetry.emit(TelemetryEvent::FetchError {
                    duration_ms,
                    status_code: None,
                    error: Some(error.to_string()),
                });
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::{Duration as ChronoDuration, Utc};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Sink that records every event for later assertions.
    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<TelemetryEvent>>,
    }

    impl RecordingSink {
        fn events(&self) -> Vec<TelemetryEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl TelemetrySink for RecordingSink {
        fn emit(&self, event: TelemetryEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// Serve a canned HTTP response on a loopback listener, counting hits.
    async fn spawn_server(response: String) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let task_hits = Arc::clone(&hits);

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                task_hits.fetch_add(1, Ordering::SeqCst);
                // Drain the request headers before responding
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            request.extend_from_slice(&buf[..n]);
                            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }
                    }
                }
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (format!("http://{addr}/status.json"), hits)
    }

    fn client_for(url: Option<String>, sink: Arc<RecordingSink>) -> StatusClient {
        StatusClient::with_telemetry(
            ClientConfig {
                endpoint_url: url,
                ..Default::default()
            },
            sink,
        )
    }

    #[tokio::test]
    async fn test_unconfigured_endpoint_returns_default() {
        let sink = Arc::new(RecordingSink::default());
        let client = client_for(None, Arc::clone(&sink));

        let doc = client.fetch().await;
        assert_eq!(doc, StatusDocument::default());
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_successful_fetch() {
        let updated_at = (Utc::now() - ChronoDuration::minutes(5)).to_rfc3339();
        let body = format!(
            r#"{{"updated_at": "{updated_at}", "platform_status": "operational"}}"#
        );
        let (url, _) = spawn_server(http_response("200 OK", &body)).await;

        let sink = Arc::new(RecordingSink::default());
        let client = client_for(Some(url), Arc::clone(&sink));

        let doc = client.fetch().await;
        assert_eq!(doc.platform_status, PlatformStatus::Operational);
        assert!(!client.is_stale(&doc));
        assert_eq!(
            display::status_label(doc.platform_status).0,
            "All systems operational"
        );

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            TelemetryEvent::FetchSuccess { age_minutes: 5, .. }
        ));
    }

    #[tokio::test]
    async fn test_http_error_returns_default() {
        let (url, _) = spawn_server(http_response("503 Service Unavailable", "")).await;

        let sink = Arc::new(RecordingSink::default());
        let client = client_for(Some(url), Arc::clone(&sink));

        let doc = client.fetch().await;
        assert_eq!(doc.platform_status, PlatformStatus::Unknown);
        assert!(doc.updated_at.is_empty());

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            TelemetryEvent::FetchError {
                status_code: Some(503),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_malformed_payload_returns_default() {
        let (url, _) = spawn_server(http_response("200 OK", "{not json")).await;

        let sink = Arc::new(RecordingSink::default());
        let client = client_for(Some(url), Arc::clone(&sink));

        let doc = client.fetch().await;
        assert_eq!(doc, StatusDocument::default());

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            TelemetryEvent::FetchError {
                status_code: None,
                error: Some(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_transport_error_returns_default() {
        // Nothing listening on this port
        let sink = Arc::new(RecordingSink::default());
        let client = client_for(
            Some("http://127.0.0.1:9/status.json".to_string()),
            Arc::clone(&sink),
        );

        let doc = client.fetch().await;
        assert_eq!(doc, StatusDocument::default());
        assert!(matches!(
            sink.events().as_slice(),
            [TelemetryEvent::FetchError {
                status_code: None,
                error: Some(_),
                ..
            }]
        ));
    }

    #[tokio::test]
    async fn test_stale_payload_emits_stale_event() {
        let updated_at = (Utc::now() - ChronoDuration::minutes(90)).to_rfc3339();
        let body = format!(
            r#"{{"updated_at": "{updated_at}", "platform_status": "degraded"}}"#
        );
        let (url, _) = spawn_server(http_response("200 OK", &body)).await;

        let sink = Arc::new(RecordingSink::default());
        let client = client_for(Some(url), Arc::clone(&sink));

        let doc = client.fetch().await;
        assert_eq!(doc.platform_status, PlatformStatus::Degraded);
        assert!(client.is_stale(&doc));
        assert_eq!(
            display::staleness_warning(&doc, 30, 60),
            Some("Data significantly outdated - may not reflect current status")
        );

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            TelemetryEvent::StaleData { age_minutes, .. } if age_minutes >= 89
        ));
    }

    #[tokio::test]
    async fn test_unknown_status_emits_extra_event() {
        let updated_at = Utc::now().to_rfc3339();
        let body =
            format!(r#"{{"updated_at": "{updated_at}", "platform_status": "unknown"}}"#);
        let (url, _) = spawn_server(http_response("200 OK", &body)).await;

        let sink = Arc::new(RecordingSink::default());
        let client = client_for(Some(url), Arc::clone(&sink));

        let doc = client.fetch().await;
        assert_eq!(doc.platform_status, PlatformStatus::Unknown);

        let names: Vec<&str> = sink.events().iter().map(TelemetryEvent::name).collect();
        assert_eq!(names, vec!["status_fetch_success", "status_unknown"]);
    }

    #[tokio::test]
    async fn test_repeated_fetches_hit_cache() {
        let updated_at = Utc::now().to_rfc3339();
        let body = format!(
            r#"{{"updated_at": "{updated_at}", "platform_status": "operational"}}"#
        );
        let (url, hits) = spawn_server(http_response("200 OK", &body)).await;

        let sink = Arc::new(RecordingSink::default());
        let client = client_for(Some(url), Arc::clone(&sink));

        let first = client.fetch().await;
        let second = client.fetch().await;

        assert_eq!(first, second);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        // Only the first call produced telemetry
        assert_eq!(sink.events().len(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let (url, hits) = spawn_server(http_response("500 Internal Server Error", "")).await;

        let sink = Arc::new(RecordingSink::default());
        let client = client_for(Some(url), Arc::clone(&sink));

        let _ = client.fetch().await;
        let _ = client.fetch().await;

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_optional_groups_stay_absent() {
        let updated_at = Utc::now().to_rfc3339();
        let body = format!(
            r#"{{"updated_at": "{updated_at}", "platform_status": "operational"}}"#
        );
        let (url, _) = spawn_server(http_response("200 OK", &body)).await;

        let client = client_for(Some(url), Arc::new(RecordingSink::default()));
        let doc = client.fetch().await;

        assert_eq!(doc.platform_status, PlatformStatus::Operational);
        assert!(!doc.updated_at.is_empty());
        assert!(doc.uptime.is_none());
        assert!(doc.backups.is_none());
        assert!(doc.infrastructure.is_none());
    }
}
