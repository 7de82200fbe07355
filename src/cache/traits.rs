//! Core trait for records the offline store can hold.

use serde::{de::DeserializeOwned, Serialize};

/// Trait for entities that can be cached.
///
/// Implementors must provide a unique cache key; entries are stored as one row
/// per (kind, key) and a repeated put fully replaces the previous row.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Unique identifier for this record (the platform UUID)
  fn cache_key(&self) -> String;

  /// Entity kind name for storage organization (e.g., "article", "part")
  fn entity_type() -> &'static str;
}
