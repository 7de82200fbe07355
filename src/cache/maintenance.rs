//! Cache statistics and user-facing maintenance actions.
//!
//! Everything here is computed on demand when the cache-management screen is
//! opened; the store's hot path carries no size accounting of its own.

use chrono::{DateTime, Utc};
use color_eyre::Result;
use std::sync::Arc;

use super::store::{CacheStore, KindStats, SqliteStore};
use super::traits::Cacheable;
use crate::content::{Article, ComputerPart};

/// Per-kind cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
  pub articles: KindStats,
  pub parts: KindStats,
}

/// Aggregate view of on-device cache usage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheUsage {
  pub article_count: usize,
  pub part_count: usize,
  /// Estimated on-device footprint in bytes
  pub total_size: u64,
  /// Storage budget in bytes
  pub quota: u64,
  /// `total_size / quota`, as a percentage
  pub usage: f64,
  pub oldest_entry: Option<DateTime<Utc>>,
  pub newest_entry: Option<DateTime<Utc>>,
}

/// Read-only aggregation over the store, plus bulk-clear wrappers.
#[derive(Clone)]
pub struct CacheMaintenance {
  store: Arc<SqliteStore>,
}

impl CacheMaintenance {
  pub fn new(store: Arc<SqliteStore>) -> Self {
    Self { store }
  }

  /// Per-kind totals, expired counts and estimated sizes.
  ///
  /// `expired` is counted against the same window the store expires with, but
  /// nothing is deleted here.
  pub fn stats(&self) -> Result<CacheStats> {
    Ok(CacheStats {
      articles: self.store.kind_stats(Article::entity_type())?,
      parts: self.store.kind_stats(ComputerPart::entity_type())?,
    })
  }

  /// Aggregate usage for the cache-management screen.
  pub fn usage(&self) -> Result<CacheUsage> {
    let articles = self.store.kind_stats(Article::entity_type())?;
    let parts = self.store.kind_stats(ComputerPart::entity_type())?;

    let total_size = self.store.disk_usage()?;
    let quota = self.store.storage_budget();
    let range = self.store.cached_at_range()?;

    Ok(CacheUsage {
      article_count: articles.total,
      part_count: parts.total,
      total_size,
      quota,
      usage: total_size as f64 / quota as f64 * 100.0,
      oldest_entry: range.and_then(|(oldest, _)| DateTime::from_timestamp_millis(oldest)),
      newest_entry: range.and_then(|(_, newest)| DateTime::from_timestamp_millis(newest)),
    })
  }

  /// Clear all cached articles. Returns the number removed.
  pub fn clear_articles(&self) -> Result<usize> {
    self.store.clear_kind(Article::entity_type())
  }

  /// Clear all cached parts. Returns the number removed.
  pub fn clear_parts(&self) -> Result<usize> {
    self.store.clear_kind(ComputerPart::entity_type())
  }

  /// Clear the entire cache. Use for logout or manual reset.
  pub fn clear_all(&self) -> Result<()> {
    self.store.clear_all()
  }

  /// Clear expired entries only. Returns the number removed.
  pub fn clear_expired(&self) -> Result<usize> {
    self.store.clear_expired()
  }
}

/// Format a byte count for display, e.g. `1.5 MB`.
pub fn format_bytes(bytes: u64) -> String {
  if bytes == 0 {
    return "0 Bytes".to_string();
  }

  const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
  let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
  let exponent = exponent.min(UNITS.len() - 1);
  let value = bytes as f64 / 1024f64.powi(exponent as i32);

  format!("{} {}", (value * 100.0).round() / 100.0, UNITS[exponent])
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::CacheConfig;
  use crate::content::PartCategory;
  use chrono::Utc;

  const DAY_MS: i64 = 24 * 60 * 60 * 1000;

  fn article(id: &str) -> Article {
    Article {
      id: id.to_string(),
      title: format!("Article {}", id),
      slug: format!("article-{}", id),
      content: "# Heading\n\nSome markdown body long enough to matter.".to_string(),
      excerpt: Some("A short summary.".to_string()),
      cover_image: None,
      topic_id: "topic-1".to_string(),
      published_at: "2026-01-01T00:00:00Z".to_string(),
      created_at: "2026-01-01T00:00:00Z".to_string(),
      updated_at: "2026-01-01T00:00:00Z".to_string(),
      view_count: 0,
      is_featured: false,
    }
  }

  fn part(id: &str) -> ComputerPart {
    ComputerPart {
      id: id.to_string(),
      name: format!("Part {}", id),
      slug: format!("part-{}", id),
      category: PartCategory::Cpu,
      description: "A dependable processor for everyday builds.".to_string(),
      image_url: None,
      specifications: Default::default(),
      manufacturer: Some("ACME".to_string()),
      model_number: None,
      created_at: "2026-01-01T00:00:00Z".to_string(),
      updated_at: "2026-01-01T00:00:00Z".to_string(),
    }
  }

  fn maintenance() -> CacheMaintenance {
    let store = SqliteStore::open_in_memory(&CacheConfig::default()).unwrap();
    CacheMaintenance::new(Arc::new(store))
  }

  #[test]
  fn test_stats_expired_counts() {
    let maintenance = maintenance();
    let store = &maintenance.store;

    for id in ["a1", "a2", "a3"] {
      store.put(&article(id)).unwrap();
    }
    store.put(&part("p1")).unwrap();

    let now = Utc::now().timestamp_millis();
    store.set_cached_at("article", "a1", now - 8 * DAY_MS);
    store.set_cached_at("article", "a2", now - 9 * DAY_MS);

    let stats = maintenance.stats().unwrap();
    assert_eq!(stats.articles.total, 3);
    assert_eq!(stats.articles.expired, 2);
    assert_eq!(stats.parts.total, 1);
    assert_eq!(stats.parts.expired, 0);
    assert!(stats.articles.expired <= stats.articles.total);

    // Counting must not sweep
    assert_eq!(store.count_entries(), 4);
  }

  #[test]
  fn test_usage_aggregates() {
    let maintenance = maintenance();
    let store = &maintenance.store;

    store.put(&article("a1")).unwrap();
    store.put(&part("p1")).unwrap();

    let now = Utc::now().timestamp_millis();
    store.set_cached_at("article", "a1", now - 2 * DAY_MS);
    store.set_cached_at("part", "p1", now - DAY_MS);

    let usage = maintenance.usage().unwrap();
    assert_eq!(usage.article_count, 1);
    assert_eq!(usage.part_count, 1);
    assert_eq!(usage.quota, 50 * 1024 * 1024);
    assert!(usage.total_size > 0);
    assert!(usage.usage > 0.0 && usage.usage < 100.0);

    let oldest = usage.oldest_entry.unwrap().timestamp_millis();
    let newest = usage.newest_entry.unwrap().timestamp_millis();
    assert_eq!(oldest, now - 2 * DAY_MS);
    assert_eq!(newest, now - DAY_MS);
  }

  #[test]
  fn test_usage_empty_store() {
    let maintenance = maintenance();
    let usage = maintenance.usage().unwrap();

    assert_eq!(usage.article_count, 0);
    assert!(usage.oldest_entry.is_none());
    assert!(usage.newest_entry.is_none());
  }

  #[test]
  fn test_clear_wrappers() {
    let maintenance = maintenance();
    let store = &maintenance.store;

    store.put(&article("a1")).unwrap();
    store.put(&article("a2")).unwrap();
    store.put(&part("p1")).unwrap();

    assert_eq!(maintenance.clear_articles().unwrap(), 2);
    assert_eq!(maintenance.clear_parts().unwrap(), 1);

    store.put(&article("a1")).unwrap();
    let now = Utc::now().timestamp_millis();
    store.set_cached_at("article", "a1", now - 8 * DAY_MS);
    assert_eq!(maintenance.clear_expired().unwrap(), 1);

    store.put(&article("a1")).unwrap();
    maintenance.clear_all().unwrap();
    assert_eq!(store.count_entries(), 0);
  }

  #[test]
  fn test_format_bytes() {
    assert_eq!(format_bytes(0), "0 Bytes");
    assert_eq!(format_bytes(512), "512 Bytes");
    assert_eq!(format_bytes(1024), "1 KB");
    assert_eq!(format_bytes(1536), "1.5 KB");
    assert_eq!(format_bytes(5 * 1024 * 1024), "5 MB");
  }
}
