//! horocache library
//!
//! A time-windowed horoscope cache: fetches daily horoscopes for three
//! relative days (yesterday, today, tomorrow) from multiple upstream web
//! sources, detects when the wall clock has advanced past what the cache
//! believes, and repairs the cache by rotating slots instead of refetching
//! everything. Consumers read through [`sync::Synchronizer::get`]; the
//! `main` binary wires up the periodic scheduler.

pub mod cache;
pub mod cli;
pub mod data;
pub mod fetch;
pub mod refresh;
pub mod store;
pub mod sync;
