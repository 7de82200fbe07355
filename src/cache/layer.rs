//! Cache-aside layer that couples the store with backend fetching.

use color_eyre::Result;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use super::store::CacheStore;
use super::traits::Cacheable;

/// Cache layer that manages cache-aside reads against a storage backend.
///
/// This layer sits between the content client and the network: reads probe
/// the store first, fall back to the fetcher on a miss, and write the fetched
/// record through so the next read is served offline.
pub struct CacheLayer<S: CacheStore> {
  store: Arc<S>,
}

impl<S: CacheStore> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(store: S) -> Self {
    Self::from_shared(Arc::new(store))
  }

  /// Create a cache layer over an already-shared store, so maintenance can
  /// aggregate over the same database the client writes to.
  pub fn from_shared(store: Arc<S>) -> Self {
    Self { store }
  }

  /// The underlying store, shared.
  pub fn store(&self) -> Arc<S> {
    Arc::clone(&self.store)
  }

  /// Fetch a single record with cache-aside semantics.
  ///
  /// 1. Probe the store - a live entry is returned immediately
  /// 2. On a miss (or an expired entry), run the fetcher
  /// 3. Write the fetched record through before returning it
  ///
  /// Storage and fetcher errors both propagate; a failed write-through is not
  /// swallowed, since silently dropping writes would leave readers convinced
  /// the record is cached when it isn't.
  pub async fn fetch_one<T, F, Fut>(&self, id: &str, fetcher: F) -> Result<T>
  where
    T: Cacheable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    if let Some(cached) = self.store.get::<T>(id)? {
      debug!(kind = T::entity_type(), id, "serving from cache");
      return Ok(cached);
    }

    debug!(kind = T::entity_type(), id, "cache miss, fetching");
    let record = fetcher().await?;
    self.store.put(&record)?;
    Ok(record)
  }

  /// Fetch without probing, then write through.
  ///
  /// Used for lookups by an alternate key (e.g. slug): the cache is keyed by
  /// record id, so there is nothing to probe until the backend has answered.
  pub async fn fetch_through<T, F, Fut>(&self, fetcher: F) -> Result<T>
  where
    T: Cacheable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    let record = fetcher().await?;
    self.store.put(&record)?;
    Ok(record)
  }

  /// Cache-only bulk read: returns the hits, in id order, dropping misses.
  pub fn get_cached<T: Cacheable>(&self, ids: &[String]) -> Result<Vec<T>> {
    self.store.get_many(ids)
  }
}

impl<S: CacheStore> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
    }
  }
}
