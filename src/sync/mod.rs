//! Cache synchronization
//!
//! The synchronizer is the only component allowed to mutate the cache store.
//! On every pass it compares, per (Source, Style) pair, the date recorded in
//! the store's tomorrow slot against the real calendar tomorrow, and when the
//! two disagree it samples one live page to learn what the source itself
//! considers tomorrow. Depending on how far behind the store is it either
//! rotates slots internally (copy without refetch) or refetches the slots
//! that can no longer be derived:
//!
//! * store tomorrow == real tomorrow: current, nothing to do
//! * source tomorrow == store tomorrow: current (timezone skew), nothing to do
//! * source tomorrow == store tomorrow + 1: rotate today -> yesterday and
//!   tomorrow -> today, then refetch tomorrow only
//! * source tomorrow == store tomorrow + 2: copy tomorrow -> yesterday (the
//!   old today is too old to keep), then refetch today and tomorrow
//! * anything else: refetch all three days
//!
//! A rotation saves 36 fetches (3 days x 12 signs) against a source whose
//! calendar merely advanced by a day.

use std::sync::{Arc, RwLock};

use chrono::{Days, Local, NaiveDate};
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::CacheManager;
use crate::data::{RelativeDay, Sign, Source, Style};
use crate::fetch::HoroscopeFetcher;
use crate::store::{CacheStore, DayEntry, Horoscope, StyleBlock};

/// Maximum number of in-flight fetches while repopulating a day slot
const FETCH_CONCURRENCY: usize = 4;

/// The sign used when sampling a source's current date; page dates are
/// sign-independent so any fixed sign works
const SAMPLE_SIGN: Sign = Sign::Aries;

/// How far a (Source, Style) pair has drifted behind the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// Store and source agree; nothing to do
    Current,
    /// One day behind; a rotation plus one refetched day repairs it
    OneDayStale,
    /// Two days behind; only the old tomorrow slot is still usable
    TwoDaysStale,
    /// Too far gone; every slot must be refetched
    FullyStale,
}

/// Result of one synchronization pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The pass ran; `refreshed_days` day slots were refetched across all
    /// (Source, Style) pairs
    Completed { refreshed_days: usize },
    /// A previous pass was still running; this trigger was dropped
    Skipped,
}

/// Classifies staleness from the three input dates
///
/// `source_tomorrow` is `None` when the live sample fetch failed; in that
/// case staleness cannot be determined and `None` is returned so the caller
/// leaves the pair untouched rather than discarding known-good data.
fn classify(
    stored_tomorrow: NaiveDate,
    real_tomorrow: NaiveDate,
    source_tomorrow: Option<NaiveDate>,
) -> Option<Staleness> {
    if stored_tomorrow == real_tomorrow {
        return Some(Staleness::Current);
    }
    let source_tomorrow = source_tomorrow?;
    let plus = |days| stored_tomorrow.checked_add_days(Days::new(days));

    if source_tomorrow == stored_tomorrow {
        // Local wall clock disagrees but the source has not moved on, e.g.
        // timezone skew around midnight
        Some(Staleness::Current)
    } else if Some(source_tomorrow) == plus(1) {
        Some(Staleness::OneDayStale)
    } else if Some(source_tomorrow) == plus(2) {
        Some(Staleness::TwoDaysStale)
    } else {
        Some(Staleness::FullyStale)
    }
}

/// Drives staleness detection and repair over the shared cache store
///
/// The store behind the synchronizer may be read at any time via
/// [`Synchronizer::get`]; readers see either the pre-pass or the fully
/// post-pass value of each (Source, Style) block, never a half-rotated one.
pub struct Synchronizer {
    store: Arc<RwLock<CacheStore>>,
    fetcher: Arc<dyn HoroscopeFetcher>,
    manager: Option<CacheManager>,
    /// Held for the duration of a pass; overlapping triggers are skipped
    pass_guard: Mutex<()>,
}

impl Synchronizer {
    /// Creates a synchronizer over an empty, fully-slotted store
    ///
    /// # Arguments
    /// * `fetcher` - Document fetcher (HTTP in production, scripted in tests)
    /// * `manager` - Durable storage; `None` disables persistence
    pub fn new(fetcher: Arc<dyn HoroscopeFetcher>, manager: Option<CacheManager>) -> Self {
        let initial = match &manager {
            Some(manager) => manager.load(),
            None => CacheStore::with_shape(),
        };
        Self {
            store: Arc::new(RwLock::new(initial)),
            fetcher,
            manager,
            pass_guard: Mutex::new(()),
        }
    }

    /// Reads one horoscope from the in-memory store
    ///
    /// Never triggers a fetch; serves the last-known-good value. An empty
    /// text means the last sync attempt for that sign failed.
    pub fn get(
        &self,
        source: Source,
        style: Style,
        day: RelativeDay,
        sign: Sign,
    ) -> Option<Horoscope> {
        self.store
            .read()
            .expect("store lock poisoned")
            .get(source, style, day, sign)
    }

    /// Returns a copy of the current store
    pub fn snapshot(&self) -> CacheStore {
        self.store.read().expect("store lock poisoned").clone()
    }

    /// Runs one synchronization pass against the real wall clock
    pub async fn run_sync_pass(&self) -> PassOutcome {
        self.run_sync_pass_at(Local::now().date_naive()).await
    }

    /// Runs one synchronization pass with an explicit reference date
    ///
    /// Exposed separately so tests can drive the state machine with an
    /// injected clock. Only one pass runs at a time; a call arriving while
    /// another pass is in flight returns [`PassOutcome::Skipped`].
    pub async fn run_sync_pass_at(&self, today: NaiveDate) -> PassOutcome {
        let _guard = match self.pass_guard.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("previous synchronization pass still running, skipping");
                return PassOutcome::Skipped;
            }
        };

        // Pick up changes the durable copy may have seen since the last pass
        if let Some(manager) = &self.manager {
            *self.store.write().expect("store lock poisoned") = manager.load();
        }

        let mut refreshed_days = 0;
        for source in Source::ALL {
            for &style in source.styles() {
                refreshed_days += self.sync_pair(source, style, today).await;
            }
        }

        if refreshed_days > 0 {
            self.persist();
        }
        info!(refreshed_days, "synchronization pass complete");
        PassOutcome::Completed { refreshed_days }
    }

    /// Checks and repairs one (Source, Style) pair
    ///
    /// Returns the number of day slots that were refetched.
    async fn sync_pair(&self, source: Source, style: Style, today: NaiveDate) -> usize {
        let real_tomorrow = RelativeDay::Tomorrow.resolve(today);
        let stored_tomorrow = self
            .store
            .read()
            .expect("store lock poisoned")
            .tomorrow_date(source, style);

        let staleness = match stored_tomorrow {
            // Nothing has ever been fetched for this pair; no sample needed
            None => Some(Staleness::FullyStale),
            Some(stored) if stored == real_tomorrow => Some(Staleness::Current),
            Some(stored) => {
                debug!(
                    source = source.display_name(),
                    style = style.display_name(),
                    %stored,
                    %real_tomorrow,
                    "stored tomorrow does not match the calendar, sampling source"
                );
                let sample = self
                    .fetcher
                    .fetch_document(source, style, RelativeDay::Tomorrow, SAMPLE_SIGN, today)
                    .await
                    .map(|doc| doc.date)
                    .ok();
                classify(stored, real_tomorrow, sample)
            }
        };

        let staleness = match staleness {
            Some(staleness) => staleness,
            None => {
                warn!(
                    source = source.display_name(),
                    style = style.display_name(),
                    "source date sample failed, leaving pair untouched this pass"
                );
                return 0;
            }
        };

        let refetch: &[RelativeDay] = match staleness {
            Staleness::Current => {
                debug!(source = source.display_name(), style = style.display_name(), "current");
                return 0;
            }
            Staleness::OneDayStale => &[RelativeDay::Tomorrow],
            Staleness::TwoDaysStale => &[RelativeDay::Today, RelativeDay::Tomorrow],
            Staleness::FullyStale => &RelativeDay::ALL,
        };

        info!(
            source = source.display_name(),
            style = style.display_name(),
            ?staleness,
            "repairing"
        );

        // Build the replacement block off to the side: rotate first, then
        // overwrite the refetched slots, and only then swap the block in.
        // Copying before fetching matters; the reverse order would overwrite
        // a slot that still needs to be copied out.
        let mut block = self
            .store
            .read()
            .expect("store lock poisoned")
            .style_block(source, style)
            .cloned()
            .unwrap_or_else(StyleBlock::empty);

        match staleness {
            Staleness::Current => unreachable!("handled above"),
            Staleness::OneDayStale => {
                block.copy_day(RelativeDay::Today, RelativeDay::Yesterday);
                block.copy_day(RelativeDay::Tomorrow, RelativeDay::Today);
            }
            Staleness::TwoDaysStale => {
                block.copy_day(RelativeDay::Tomorrow, RelativeDay::Yesterday);
            }
            Staleness::FullyStale => {}
        }

        for &day in refetch {
            let entry = self.fetch_day(source, style, day, today).await;
            block.put_day(day, entry);
        }

        self.store
            .write()
            .expect("store lock poisoned")
            .put_style_block(source, style, block);

        refetch.len()
    }

    /// Fetches all twelve signs for one day slot
    ///
    /// Fetches run concurrently with a bounded fan-out. A failed sign is
    /// recorded as empty text rather than keeping the previous value; the
    /// entry's date comes from the first successful document and stays
    /// unset if every sign failed, which forces a refetch on the next pass.
    async fn fetch_day(
        &self,
        source: Source,
        style: Style,
        day: RelativeDay,
        today: NaiveDate,
    ) -> DayEntry {
        let results: Vec<(Sign, Option<crate::fetch::Document>)> = stream::iter(Sign::ALL)
            .map(|sign| {
                let fetcher = Arc::clone(&self.fetcher);
                async move {
                    let doc = match fetcher
                        .fetch_document(source, style, day, sign, today)
                        .await
                    {
                        Ok(doc) => Some(doc),
                        Err(e) => {
                            warn!(
                                source = source.display_name(),
                                sign = sign.name(),
                                day = day.name(),
                                error = %e,
                                "fetch failed, storing empty text"
                            );
                            None
                        }
                    };
                    (sign, doc)
                }
            })
            .buffer_unordered(FETCH_CONCURRENCY)
            .collect()
            .await;

        let mut entry = DayEntry::empty();
        for (sign, doc) in results {
            match doc {
                Some(doc) => {
                    if entry.date.is_none() {
                        entry.date = Some(doc.date);
                    }
                    entry.signs.insert(sign, doc.text);
                }
                None => {
                    entry.signs.insert(sign, String::new());
                }
            }
        }
        entry
    }

    /// Writes the current store to durable storage, logging failures
    fn persist(&self) {
        if let Some(manager) = &self.manager {
            let snapshot = self.snapshot();
            if let Err(e) = manager.write(&snapshot) {
                warn!(error = %e, "failed to persist snapshot");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_classify_current_by_calendar() {
        let t = date(2024, 7, 17);
        assert_eq!(classify(t, t, None), Some(Staleness::Current));
    }

    #[test]
    fn test_classify_current_by_source_agreement() {
        let stored = date(2024, 7, 17);
        let real = date(2024, 7, 18);
        assert_eq!(
            classify(stored, real, Some(stored)),
            Some(Staleness::Current)
        );
    }

    #[test]
    fn test_classify_one_day_stale() {
        let stored = date(2024, 7, 17);
        let real = date(2024, 7, 18);
        assert_eq!(
            classify(stored, real, Some(date(2024, 7, 18))),
            Some(Staleness::OneDayStale)
        );
    }

    #[test]
    fn test_classify_two_days_stale() {
        let stored = date(2024, 7, 17);
        let real = date(2024, 7, 19);
        assert_eq!(
            classify(stored, real, Some(date(2024, 7, 19))),
            Some(Staleness::TwoDaysStale)
        );
    }

    #[test]
    fn test_classify_fully_stale_on_large_gap() {
        let stored = date(2024, 7, 17);
        let real = date(2024, 7, 25);
        assert_eq!(
            classify(stored, real, Some(date(2024, 7, 25))),
            Some(Staleness::FullyStale)
        );
    }

    #[test]
    fn test_classify_fully_stale_on_backwards_source_date() {
        let stored = date(2024, 7, 17);
        let real = date(2024, 7, 18);
        assert_eq!(
            classify(stored, real, Some(date(2024, 7, 10))),
            Some(Staleness::FullyStale)
        );
    }

    #[test]
    fn test_classify_indeterminate_without_sample() {
        let stored = date(2024, 7, 17);
        let real = date(2024, 7, 18);
        assert_eq!(classify(stored, real, None), None);
    }
}
