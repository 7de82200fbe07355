//! Caching implementations for content types.

use crate::cache::Cacheable;

use super::types::{Article, ComputerPart};

impl Cacheable for Article {
  fn cache_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "article"
  }
}

impl Cacheable for ComputerPart {
  fn cache_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "part"
  }
}
