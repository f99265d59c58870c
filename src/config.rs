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

//! Application configuration management.
//!
//! Persistent configuration is stored in TOML via confy. The status and
//! analytics endpoint URLs can also come from the `ELYTRA_STATUS_URL` and
//! `ELYTRA_ANALYTICS_URL` environment variables, which take precedence over
//! the config file.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use status_client::ClientConfig;

/// Environment variable overriding the status endpoint URL.
pub const STATUS_URL_ENV: &str = "ELYTRA_STATUS_URL";

/// Environment variable overriding the analytics collector URL.
pub const ANALYTICS_URL_ENV: &str = "ELYTRA_ANALYTICS_URL";

/// Application configuration stored in TOML format.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Status endpoint URL (env var takes precedence)
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Analytics collector URL; when absent, telemetry goes to the local log
    #[serde(default)]
    pub analytics_endpoint: Option<String>,

    /// Response cache lifetime in seconds
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,

    /// Age in minutes beyond which status data counts as stale
    #[serde(default = "default_stale_threshold_minutes")]
    pub stale_threshold_minutes: i64,

    /// Age in minutes beyond which the staleness warning escalates
    #[serde(default = "default_severe_stale_threshold_minutes")]
    pub severe_stale_threshold_minutes: i64,

    /// Refresh interval for watch mode, in seconds
    #[serde(default = "default_watch_interval_seconds")]
    pub watch_interval_seconds: u64,
}

// Default value functions for serde
fn default_cache_ttl_seconds() -> u64 {
    600
}

fn default_stale_threshold_minutes() -> i64 {
    30
}

fn default_severe_stale_threshold_minutes() -> i64 {
    60
}

fn default_watch_interval_seconds() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            analytics_endpoint: None,
            cache_ttl_seconds: default_cache_ttl_seconds(),
            stale_threshold_minutes: default_stale_threshold_minutes(),
            severe_stale_threshold_minutes: default_severe_stale_threshold_minutes(),
            watch_interval_seconds: default_watch_interval_seconds(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating the file with defaults when it
    /// does not exist yet.
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load("elytra-status", "config")
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store("elytra-status", "config", self)
    }

    /// Get the config file path for display to user.
    pub fn config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path("elytra-status", "config")
    }

    /// Apply environment variable overrides for the endpoint URLs.
    pub fn apply_env_overrides(&mut self) {
        let status_url = std::env::var(STATUS_URL_ENV).ok();
        let analytics_url = std::env::var(ANALYTICS_URL_ENV).ok();
        self.apply_overrides(status_url, analytics_url);
    }

    fn apply_overrides(&mut self, status_url: Option<String>, analytics_url: Option<String>) {
        if let Some(url) = status_url.filter(|u| !u.is_empty()) {
            self.endpoint_url = Some(url);
        }
        if let Some(url) = analytics_url.filter(|u| !u.is_empty()) {
            self.analytics_endpoint = Some(url);
        }
    }

    /// Build the status client configuration from this app config.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint_url: self.endpoint_url.clone(),
            cache_ttl: Duration::from_secs(self.cache_ttl_seconds),
            stale_threshold_minutes: self.stale_threshold_minutes,
            severe_stale_threshold_minutes: self.severe_stale_threshold_minutes,
            ..Default::default()
        }
    }
}
