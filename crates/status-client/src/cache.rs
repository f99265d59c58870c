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

//! Response cache with a fixed TTL, keyed by endpoint URL.
//!
//! Bounds load on the status endpoint: repeated fetches inside the TTL
//! window reuse the stored document instead of going back to the network.
//! Only successful responses are stored, so a failed fetch is retried on
//! the next call. Expired entries are dropped on the next store.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::document::StatusDocument;

struct CacheEntry {
    document: StatusDocument,
    stored_at: Instant,
}

/// TTL cache for fetched status documents.
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl ResponseCache {
    /// Create an empty cache with the given entry lifetime.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up a still-valid document for `url`.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<StatusDocument> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(url)?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.document.clone())
        } else {
            None
        }
    }

    /// Store a document for `url`, replacing any previous entry.
    ///
    /// Entries that have outlived the TTL are dropped at the same time, so
    /// the map never accumulates dead endpoints.
    pub fn store(&self, url: &str, document: StatusDocument) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
            entries.insert(
                url.to_string(),
                CacheEntry {
                    document,
                    stored_at: Instant::now(),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PlatformStatus;

    fn operational_doc() -> StatusDocument {
        StatusDocument {
            platform_status: PlatformStatus::Operational,
            ..Default::default()
        }
    }

    #[test]
    fn test_store_and_get() {
        let cache = ResponseCache::new(Duration::from_secs(600));
        cache.store("https://example.com/status.json", operational_doc());

        let hit = cache.get("https://example.com/status.json").unwrap();
        assert_eq!(hit.platform_status, PlatformStatus::Operational);
        assert!(cache.get("https://example.com/other.json").is_none());
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.store("https://example.com/status.json", operational_doc());
        assert!(cache.get("https://example.com/status.json").is_none());
    }

    #[test]
    fn test_store_drops_expired_entries() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.store("https://example.com/a.json", operational_doc());
        cache.store("https://example.com/b.json", operational_doc());

        // The second store purged the already-expired first entry
        assert_eq!(cache.entries.lock().unwrap().len(), 1);
    }
}
