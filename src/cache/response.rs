//! URL-keyed response cache with a publication-time expiry
//!
//! Upstream sources roll their pages over once a day, so a fixed TTL would
//! either refetch too often or serve yesterday's page past rollover. Instead
//! every entry expires at the next occurrence of the upstream publication
//! time: today if that time has not yet passed, otherwise tomorrow.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Days, Local, NaiveTime};

/// Hour of day (local) when upstream pages are assumed to roll over
const PUBLICATION_HOUR: u32 = 3;

/// Minute of the publication time
const PUBLICATION_MINUTE: u32 = 15;

#[derive(Debug, Clone)]
struct CachedBody {
    body: String,
    expires_at: DateTime<Local>,
}

/// In-memory cache of response bodies keyed by URL
///
/// Thread-safe; entries are evicted lazily on read.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CachedBody>>,
}

impl ResponseCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached body for a URL if it has not expired
    pub fn get(&self, url: &str) -> Option<String> {
        self.get_at(url, Local::now())
    }

    /// Stores a response body, expiring at the next publication time
    pub fn put(&self, url: &str, body: &str) {
        self.put_at(url, body, Local::now());
    }

    /// Number of live entries (expired entries may still be counted)
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().expect("response cache lock poisoned").len()
    }

    /// True if the cache holds no entries
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_at(&self, url: &str, now: DateTime<Local>) -> Option<String> {
        let mut entries = self.entries.lock().expect("response cache lock poisoned");
        match entries.get(url) {
            Some(entry) if now < entry.expires_at => Some(entry.body.clone()),
            Some(_) => {
                entries.remove(url);
                None
            }
            None => None,
        }
    }

    fn put_at(&self, url: &str, body: &str, now: DateTime<Local>) {
        let entry = CachedBody {
            body: body.to_string(),
            expires_at: next_publication_instant(now),
        };
        self.entries
            .lock()
            .expect("response cache lock poisoned")
            .insert(url.to_string(), entry);
    }
}

/// Computes the next occurrence of the publication time after `now`
fn next_publication_instant(now: DateTime<Local>) -> DateTime<Local> {
    let publication =
        NaiveTime::from_hms_opt(PUBLICATION_HOUR, PUBLICATION_MINUTE, 0).expect("valid time");

    let today_candidate = now.date_naive().and_time(publication);
    let naive = if now.naive_local() < today_candidate {
        today_candidate
    } else {
        now.date_naive()
            .checked_add_days(Days::new(1))
            .expect("date in range")
            .and_time(publication)
    };

    // Ambiguous local times (DST transitions) resolve to the earliest mapping
    naive
        .and_local_timezone(Local)
        .earliest()
        .unwrap_or_else(|| now + chrono::Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(y, m, d)
                    .unwrap()
                    .and_hms_opt(h, min, 0)
                    .unwrap(),
            )
            .earliest()
            .unwrap()
    }

    #[test]
    fn test_expiry_before_publication_time_is_same_day() {
        let now = local(2024, 7, 16, 1, 0);
        let expiry = next_publication_instant(now);
        assert_eq!(expiry, local(2024, 7, 16, 3, 15));
    }

    #[test]
    fn test_expiry_after_publication_time_is_next_day() {
        let now = local(2024, 7, 16, 12, 0);
        let expiry = next_publication_instant(now);
        assert_eq!(expiry, local(2024, 7, 17, 3, 15));
    }

    #[test]
    fn test_expiry_exactly_at_publication_time_is_next_day() {
        let now = local(2024, 7, 16, 3, 15);
        let expiry = next_publication_instant(now);
        assert_eq!(expiry, local(2024, 7, 17, 3, 15));
    }

    #[test]
    fn test_get_returns_fresh_entry() {
        let cache = ResponseCache::new();
        let now = local(2024, 7, 16, 12, 0);
        cache.put_at("https://example.com/a", "body a", now);

        let later = local(2024, 7, 17, 1, 0);
        assert_eq!(
            cache.get_at("https://example.com/a", later),
            Some("body a".to_string())
        );
    }

    #[test]
    fn test_get_evicts_expired_entry() {
        let cache = ResponseCache::new();
        let now = local(2024, 7, 16, 12, 0);
        cache.put_at("https://example.com/a", "body a", now);

        // Past the 03:15 rollover on the 17th
        let later = local(2024, 7, 17, 4, 0);
        assert_eq!(cache.get_at("https://example.com/a", later), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_unknown_url() {
        let cache = ResponseCache::new();
        assert_eq!(cache.get("https://example.com/nope"), None);
    }

    #[test]
    fn test_put_overwrites() {
        let cache = ResponseCache::new();
        let now = local(2024, 7, 16, 12, 0);
        cache.put_at("https://example.com/a", "first", now);
        cache.put_at("https://example.com/a", "second", now);
        assert_eq!(
            cache.get_at("https://example.com/a", now),
            Some("second".to_string())
        );
        assert_eq!(cache.len(), 1);
    }
}
