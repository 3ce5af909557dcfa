//! Caching layers
//!
//! Two independent caches live here: [`ResponseCache`] deduplicates HTTP
//! fetches of the same URL between upstream publication times, and
//! [`CacheManager`] persists the whole horoscope store to disk as a JSON
//! snapshot so the daemon survives restarts without refetching everything.

mod manager;
mod response;

pub use manager::CacheManager;
pub use response::ResponseCache;
