//! Content client that wraps the backend with transparent caching.

use color_eyre::Result;

use crate::cache::{CacheLayer, CacheStore};

use super::backend::ContentBackend;
use super::types::{Article, ArticleCard, ComputerPart, PartCategory, RelatedArticle};

/// Content client with transparent offline caching.
///
/// Detail reads go cache-aside: probe the store, fall back to the backend,
/// write the record through. List reads pass straight through - the app never
/// caches list projections, only full records. When built over [`NoopStore`]
/// (cache disabled in config), every read hits the backend.
///
/// [`NoopStore`]: crate::cache::NoopStore
pub struct CachedContentClient<B: ContentBackend, S: CacheStore> {
  backend: B,
  cache: CacheLayer<S>,
}

impl<B: ContentBackend, S: CacheStore> CachedContentClient<B, S> {
  /// Create a new cached content client over its own store.
  pub fn new(backend: B, store: S) -> Self {
    Self {
      backend,
      cache: CacheLayer::new(store),
    }
  }

  /// Create a client over an existing cache layer (shared with maintenance).
  pub fn with_layer(backend: B, cache: CacheLayer<S>) -> Self {
    Self { backend, cache }
  }

  /// Get an article by id, serving from the offline cache when possible.
  pub async fn get_article(&self, id: &str) -> Result<Article> {
    self
      .cache
      .fetch_one(id, || self.backend.fetch_article(id))
      .await
  }

  /// Get an article by slug (for routing).
  ///
  /// The cache is keyed by id, so slug lookups always hit the backend; the
  /// fetched article is written through for later id reads.
  pub async fn get_article_by_slug(&self, slug: &str) -> Result<Article> {
    self
      .cache
      .fetch_through(|| self.backend.fetch_article_by_slug(slug))
      .await
  }

  /// Cache-only bulk read of articles. Misses are dropped silently.
  pub fn cached_articles(&self, ids: &[String]) -> Result<Vec<Article>> {
    self.cache.get_cached(ids)
  }

  /// Featured articles for the home page (not cached - list endpoints).
  pub async fn featured_articles(&self) -> Result<Vec<ArticleCard>> {
    self.backend.fetch_featured().await
  }

  /// Latest published articles (not cached).
  pub async fn latest_articles(&self, limit: u32) -> Result<Vec<ArticleCard>> {
    self.backend.fetch_latest(limit).await
  }

  /// Articles for one topic (not cached).
  pub async fn articles_by_topic(
    &self,
    topic_id: &str,
    offset: u32,
    limit: u32,
  ) -> Result<Vec<ArticleCard>> {
    self.backend.fetch_by_topic(topic_id, offset, limit).await
  }

  /// Related-article references (not cached - small and rarely viewed twice).
  pub async fn related_articles(&self, article_id: &str) -> Result<Vec<RelatedArticle>> {
    self.backend.fetch_related(article_id).await
  }

  /// Get a part by id, serving from the offline cache when possible.
  pub async fn get_part(&self, id: &str) -> Result<ComputerPart> {
    self
      .cache
      .fetch_one(id, || self.backend.fetch_part(id))
      .await
  }

  /// Get a part by slug. Always hits the backend, writes through by id.
  pub async fn get_part_by_slug(&self, slug: &str) -> Result<ComputerPart> {
    self
      .cache
      .fetch_through(|| self.backend.fetch_part_by_slug(slug))
      .await
  }

  /// Cache-only bulk read of parts. Misses are dropped silently.
  pub fn cached_parts(&self, ids: &[String]) -> Result<Vec<ComputerPart>> {
    self.cache.get_cached(ids)
  }

  /// All parts, paginated (not cached).
  pub async fn parts(&self, offset: u32, limit: u32) -> Result<Vec<ComputerPart>> {
    self.backend.fetch_parts(offset, limit).await
  }

  /// Parts in one category, paginated (not cached).
  pub async fn parts_by_category(
    &self,
    category: PartCategory,
    offset: u32,
    limit: u32,
  ) -> Result<Vec<ComputerPart>> {
    self
      .backend
      .fetch_parts_by_category(category, offset, limit)
      .await
  }
}
