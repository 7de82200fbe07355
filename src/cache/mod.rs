//! Offline caching layer for data persistence and offline support.
//!
//! This module provides the on-device cache behind the content client:
//! - Entries carry usage metadata and expire 7 days after they were written
//! - Expiry is lazy (checked on read), never a background timer
//! - A bounded storage budget is protected by fixed-batch LRU eviction
//! - Statistics and bulk-clear actions back the cache-management screen

mod layer;
mod maintenance;
mod store;
mod traits;

pub use layer::CacheLayer;
pub use maintenance::{format_bytes, CacheMaintenance, CacheStats, CacheUsage};
pub use store::{CacheStore, KindStats, NoopStore, SqliteStore};
pub use traits::Cacheable;
