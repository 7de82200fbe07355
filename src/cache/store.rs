//! Cache storage trait and SQLite implementation.
//!
//! Entries carry usage metadata (`cached_at`, `access_count`, `last_accessed`)
//! so the store can expire them lazily on read and evict the least recently
//! used ones when the on-device budget is exceeded.

use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

use super::traits::Cacheable;
use crate::config::CacheConfig;

/// Number of entries removed by one LRU sweep. A fixed batch bounds the cost
/// of a write instead of evicting down to the exact quota on every put.
const EVICTION_BATCH: usize = 10;

/// Per-entry size assumed when serialized sizes cannot be measured.
const FALLBACK_ENTRY_BYTES: u64 = 5120;

/// Current time as epoch milliseconds.
fn now_ms() -> i64 {
  Utc::now().timestamp_millis()
}

/// Aggregate counters for one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindStats {
  /// Entries currently stored
  pub total: usize,
  /// Entries past the expiry window but not yet swept
  pub expired: usize,
  /// Estimated serialized size of all entries
  pub size_bytes: u64,
}

/// Trait for cache storage backends.
pub trait CacheStore: Send + Sync {
  /// Get a record by id.
  ///
  /// A hit increments `access_count` and refreshes `last_accessed`. An entry
  /// past the expiry window is deleted and reported as missing (lazy expiry).
  /// Concurrent gets against the same id race last-write-wins on the usage
  /// metadata; there is no compare-and-swap.
  fn get<T: Cacheable>(&self, id: &str) -> Result<Option<T>>;

  /// Insert or fully replace the entry for the record's id, resetting its
  /// usage metadata, then run the eviction check.
  fn put<T: Cacheable>(&self, record: &T) -> Result<()>;

  /// Get several records, in the given order. Misses and expired entries are
  /// dropped silently.
  fn get_many<T: Cacheable>(&self, ids: &[String]) -> Result<Vec<T>>;

  /// Delete every entry older than the expiry window, across all kinds.
  /// Returns the number removed.
  fn clear_expired(&self) -> Result<usize>;

  /// Delete every entry of one kind. Returns the number removed.
  fn clear_kind(&self, kind: &str) -> Result<usize>;

  /// Unconditionally empty the store.
  fn clear_all(&self) -> Result<()>;
}

/// Storage implementation that doesn't cache anything.
/// Used when the offline cache is disabled - all operations are no-ops.
pub struct NoopStore;

impl CacheStore for NoopStore {
  fn get<T: Cacheable>(&self, _id: &str) -> Result<Option<T>> {
    Ok(None) // Always miss
  }

  fn put<T: Cacheable>(&self, _record: &T) -> Result<()> {
    Ok(()) // Discard
  }

  fn get_many<T: Cacheable>(&self, _ids: &[String]) -> Result<Vec<T>> {
    Ok(Vec::new())
  }

  fn clear_expired(&self) -> Result<usize> {
    Ok(0)
  }

  fn clear_kind(&self, _kind: &str) -> Result<usize> {
    Ok(0)
  }

  fn clear_all(&self) -> Result<()> {
    Ok(())
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStore {
  conn: Mutex<Connection>,
  /// None for in-memory stores
  path: Option<PathBuf>,
  expiry_ms: i64,
  max_storage_bytes: u64,
}

impl SqliteStore {
  /// Open or create the store at the default location.
  pub fn open(config: &CacheConfig) -> Result<Self> {
    let path = Self::default_path()?;
    Self::open_at(&path, config)
  }

  /// Open or create the store at a specific path.
  pub fn open_at(path: &Path, config: &CacheConfig) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    let store = Self {
      conn: Mutex::new(conn),
      path: Some(path.to_path_buf()),
      expiry_ms: config.expiry_ms(),
      max_storage_bytes: config.max_storage_bytes(),
    };
    store.run_migrations()?;

    Ok(store)
  }

  /// Open an in-memory store. Used by tests and private-browsing sessions.
  pub fn open_in_memory(config: &CacheConfig) -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory cache: {}", e))?;

    let store = Self {
      conn: Mutex::new(conn),
      path: None,
      expiry_ms: config.expiry_ms(),
      max_storage_bytes: config.max_storage_bytes(),
    };
    store.run_migrations()?;

    Ok(store)
  }

  /// Get the default database path.
  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("ictwiki").join("cache.db"))
  }

  /// Run database migrations for the cache table.
  fn run_migrations(&self) -> Result<()> {
    let conn = self.lock_conn()?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }

  fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
    self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))
  }

  /// Delete every entry with `cached_at` strictly before `cutoff`.
  pub(crate) fn clear_expired_before(&self, cutoff: i64) -> Result<usize> {
    let conn = self.lock_conn()?;

    let removed = conn
      .execute("DELETE FROM entry_cache WHERE cached_at < ?", params![cutoff])
      .map_err(|e| eyre!("Failed to clear expired entries: {}", e))?;

    if removed > 0 {
      info!(removed, "cleared expired cache entries");
    }

    Ok(removed)
  }

  /// Estimated serialized size of every stored entry, in bytes.
  pub(crate) fn total_size_bytes(&self) -> Result<u64> {
    let conn = self.lock_conn()?;

    match conn.query_row(
      "SELECT COALESCE(SUM(LENGTH(data)), 0) FROM entry_cache",
      [],
      |row| row.get::<_, i64>(0),
    ) {
      Ok(bytes) => Ok(bytes as u64),
      Err(e) => {
        // Estimation is best-effort: fall back to a flat per-entry figure
        warn!("cache size estimation failed, using fallback: {}", e);
        let count: i64 = conn
          .query_row("SELECT COUNT(*) FROM entry_cache", [], |row| row.get(0))
          .map_err(|e| eyre!("Failed to count cache entries: {}", e))?;
        Ok(count as u64 * FALLBACK_ENTRY_BYTES)
      }
    }
  }

  /// Aggregate counters for one kind, against the store's expiry window.
  /// Count-only: nothing is deleted here.
  pub(crate) fn kind_stats(&self, kind: &str) -> Result<KindStats> {
    let cutoff = now_ms() - self.expiry_ms;
    let conn = self.lock_conn()?;

    let (total, expired): (i64, i64) = conn
      .query_row(
        "SELECT COUNT(*), COALESCE(SUM(cached_at < ?), 0) FROM entry_cache WHERE kind = ?",
        params![cutoff, kind],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .map_err(|e| eyre!("Failed to read cache stats for {}: {}", kind, e))?;

    let size_bytes = match conn.query_row(
      "SELECT COALESCE(SUM(LENGTH(data)), 0) FROM entry_cache WHERE kind = ?",
      params![kind],
      |row| row.get::<_, i64>(0),
    ) {
      Ok(bytes) => bytes as u64,
      Err(e) => {
        warn!(kind, "cache size estimation failed, using fallback: {}", e);
        total as u64 * FALLBACK_ENTRY_BYTES
      }
    };

    Ok(KindStats {
      total: total as usize,
      expired: expired as usize,
      size_bytes,
    })
  }

  /// Oldest and newest `cached_at` across all entries, if any.
  pub(crate) fn cached_at_range(&self) -> Result<Option<(i64, i64)>> {
    let conn = self.lock_conn()?;

    let range: Option<(Option<i64>, Option<i64>)> = conn
      .query_row(
        "SELECT MIN(cached_at), MAX(cached_at) FROM entry_cache",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cache timestamps: {}", e))?;

    Ok(match range {
      Some((Some(oldest), Some(newest))) => Some((oldest, newest)),
      _ => None,
    })
  }

  /// The configured storage budget in bytes.
  pub(crate) fn storage_budget(&self) -> u64 {
    self.max_storage_bytes
  }

  /// On-device footprint: the database file's size where the store is
  /// file-backed, otherwise the serialized-size estimate.
  pub(crate) fn disk_usage(&self) -> Result<u64> {
    if let Some(path) = &self.path {
      if let Ok(meta) = std::fs::metadata(path) {
        return Ok(meta.len());
      }
    }
    self.total_size_bytes()
  }

  /// Evict if the storage budget is exceeded: expired entries go first
  /// (cheap, policy-neutral), then one fixed LRU batch across both kinds.
  fn evict_if_needed(&self) -> Result<()> {
    if self.total_size_bytes()? <= self.max_storage_bytes {
      return Ok(());
    }

    self.clear_expired()?;

    if self.total_size_bytes()? <= self.max_storage_bytes {
      return Ok(());
    }

    self.evict_lru(EVICTION_BATCH)
  }

  /// Delete the `count` globally least recently used entries.
  fn evict_lru(&self, count: usize) -> Result<()> {
    let conn = self.lock_conn()?;

    let evicted = conn
      .execute(
        "DELETE FROM entry_cache WHERE rowid IN (
            SELECT rowid FROM entry_cache ORDER BY last_accessed ASC LIMIT ?
        )",
        params![count as i64],
      )
      .map_err(|e| eyre!("Failed to evict cache entries: {}", e))?;

    info!(evicted, "evicted least recently used cache entries");
    Ok(())
  }
}

/// Schema for the cache table.
const CACHE_SCHEMA: &str = r#"
-- Generic entity cache (stores serialized JSON plus usage metadata)
CREATE TABLE IF NOT EXISTS entry_cache (
    kind TEXT NOT NULL,
    entry_id TEXT NOT NULL,
    data BLOB NOT NULL,
    cached_at INTEGER NOT NULL,
    access_count INTEGER NOT NULL,
    last_accessed INTEGER NOT NULL,
    PRIMARY KEY (kind, entry_id)
);

CREATE INDEX IF NOT EXISTS idx_entry_cache_expiry ON entry_cache(cached_at);

CREATE INDEX IF NOT EXISTS idx_entry_cache_lru ON entry_cache(last_accessed);
"#;

impl CacheStore for SqliteStore {
  fn get<T: Cacheable>(&self, id: &str) -> Result<Option<T>> {
    let kind = T::entity_type();
    let now = now_ms();
    let conn = self.lock_conn()?;

    let row: Option<(Vec<u8>, i64)> = conn
      .query_row(
        "SELECT data, cached_at FROM entry_cache WHERE kind = ? AND entry_id = ?",
        params![kind, id],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cache entry: {}", e))?;

    let (data, cached_at) = match row {
      Some(r) => r,
      None => return Ok(None),
    };

    // Lazy expiry: stale entries are purged on read, not by a background timer
    if now - cached_at > self.expiry_ms {
      conn
        .execute(
          "DELETE FROM entry_cache WHERE kind = ? AND entry_id = ?",
          params![kind, id],
        )
        .map_err(|e| eyre!("Failed to delete expired entry: {}", e))?;
      debug!(kind, id, "cache entry expired");
      return Ok(None);
    }

    conn
      .execute(
        "UPDATE entry_cache SET access_count = access_count + 1, last_accessed = ?
         WHERE kind = ? AND entry_id = ?",
        params![now, kind, id],
      )
      .map_err(|e| eyre!("Failed to update entry metadata: {}", e))?;

    let record: T = serde_json::from_slice(&data)
      .map_err(|e| eyre!("Failed to deserialize cached {}: {}", kind, e))?;

    Ok(Some(record))
  }

  fn put<T: Cacheable>(&self, record: &T) -> Result<()> {
    let kind = T::entity_type();
    let id = record.cache_key();
    let data =
      serde_json::to_vec(record).map_err(|e| eyre!("Failed to serialize {}: {}", kind, e))?;
    let now = now_ms();

    {
      let conn = self.lock_conn()?;
      conn
        .execute(
          "INSERT OR REPLACE INTO entry_cache (kind, entry_id, data, cached_at, access_count, last_accessed)
           VALUES (?, ?, ?, ?, 1, ?)",
          params![kind, id, data, now, now],
        )
        .map_err(|e| eyre!("Failed to store {}: {}", kind, e))?;
    }

    self.evict_if_needed()
  }

  fn get_many<T: Cacheable>(&self, ids: &[String]) -> Result<Vec<T>> {
    let mut records = Vec::new();
    for id in ids {
      if let Some(record) = self.get::<T>(id)? {
        records.push(record);
      }
    }
    Ok(records)
  }

  fn clear_expired(&self) -> Result<usize> {
    self.clear_expired_before(now_ms() - self.expiry_ms)
  }

  fn clear_kind(&self, kind: &str) -> Result<usize> {
    let conn = self.lock_conn()?;

    conn
      .execute("DELETE FROM entry_cache WHERE kind = ?", params![kind])
      .map_err(|e| eyre!("Failed to clear {} entries: {}", kind, e))
  }

  fn clear_all(&self) -> Result<()> {
    let conn = self.lock_conn()?;

    conn
      .execute("DELETE FROM entry_cache", [])
      .map_err(|e| eyre!("Failed to clear cache: {}", e))?;

    Ok(())
  }
}

#[cfg(test)]
impl SqliteStore {
  pub(crate) fn entry_meta(&self, kind: &str, id: &str) -> Option<(i64, i64, i64)> {
    let conn = self.conn.lock().unwrap();
    conn
      .query_row(
        "SELECT cached_at, access_count, last_accessed FROM entry_cache
         WHERE kind = ? AND entry_id = ?",
        params![kind, id],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
      )
      .optional()
      .unwrap()
  }

  pub(crate) fn set_cached_at(&self, kind: &str, id: &str, ts: i64) {
    let conn = self.conn.lock().unwrap();
    conn
      .execute(
        "UPDATE entry_cache SET cached_at = ? WHERE kind = ? AND entry_id = ?",
        params![ts, kind, id],
      )
      .unwrap();
  }

  pub(crate) fn set_last_accessed(&self, kind: &str, id: &str, ts: i64) {
    let conn = self.conn.lock().unwrap();
    conn
      .execute(
        "UPDATE entry_cache SET last_accessed = ? WHERE kind = ? AND entry_id = ?",
        params![ts, kind, id],
      )
      .unwrap();
  }

  pub(crate) fn count_entries(&self) -> i64 {
    let conn = self.conn.lock().unwrap();
    conn
      .query_row("SELECT COUNT(*) FROM entry_cache", [], |row| row.get(0))
      .unwrap()
  }
}
