//! Narrow seam to the hosted data platform.

use async_trait::async_trait;
use color_eyre::Result;

use super::types::{Article, ArticleCard, ComputerPart, PartCategory, RelatedArticle};

/// Remote operations the content client needs.
///
/// Implemented by the platform HTTP client in the app shell. Kept narrow so
/// the offline core never sees authentication, row-level security or storage
/// buckets; whatever the implementation raises is passed through untouched.
#[async_trait]
pub trait ContentBackend: Send + Sync {
  /// Full article by id.
  async fn fetch_article(&self, id: &str) -> Result<Article>;

  /// Full article by URL slug.
  async fn fetch_article_by_slug(&self, slug: &str) -> Result<Article>;

  /// Featured articles for the home page, newest first.
  async fn fetch_featured(&self) -> Result<Vec<ArticleCard>>;

  /// Latest published articles, newest first.
  async fn fetch_latest(&self, limit: u32) -> Result<Vec<ArticleCard>>;

  /// Articles for one topic, paginated.
  async fn fetch_by_topic(&self, topic_id: &str, offset: u32, limit: u32)
    -> Result<Vec<ArticleCard>>;

  /// "You may also like" references for an article, in display order.
  async fn fetch_related(&self, article_id: &str) -> Result<Vec<RelatedArticle>>;

  /// Full part by id.
  async fn fetch_part(&self, id: &str) -> Result<ComputerPart>;

  /// Full part by URL slug.
  async fn fetch_part_by_slug(&self, slug: &str) -> Result<ComputerPart>;

  /// All parts ordered by name, paginated.
  async fn fetch_parts(&self, offset: u32, limit: u32) -> Result<Vec<ComputerPart>>;

  /// Parts in one category ordered by name, paginated.
  async fn fetch_parts_by_category(
    &self,
    category: PartCategory,
    offset: u32,
    limit: u32,
  ) -> Result<Vec<ComputerPart>>;
}
