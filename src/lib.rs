//! Offline core for the ICT Wiki content app.
//!
//! This crate owns everything the app does on-device: the persistent article and
//! computer-part cache (7-day expiry, LRU eviction), the cache statistics and
//! maintenance layer behind the settings screen, and the in-memory fuzzy search
//! index that powers the search page. The remote data platform is only ever
//! reached through the narrow [`content::ContentBackend`] seam.

pub mod cache;
pub mod config;
pub mod content;
pub mod logging;
pub mod search;
