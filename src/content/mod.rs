//! Content domain: the records the app moves around, the narrow seam to the
//! hosted platform, and the cached client that ties the two together.

mod backend;
mod cache;
mod client;
mod types;

pub use backend::ContentBackend;
pub use client::CachedContentClient;
pub use types::{
  Article, ArticleCard, ComputerPart, PartCategory, PartSpecs, RelatedArticle,
};
