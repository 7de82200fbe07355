//! Search result types shared between the index and the search page.

use serde::Serialize;
use std::collections::BTreeMap;

/// Which collection a hit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
  Article,
  Part,
}

/// Character range of a matched substring, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchRange {
  pub start: usize,
  pub end: usize,
}

/// Matched ranges per field name, for highlighting.
pub type FieldMatches = BTreeMap<&'static str, Vec<MatchRange>>;

/// A single ranked search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
  pub kind: SearchKind,
  pub id: String,
  /// Article title or part name
  pub title: String,
  pub slug: String,
  /// Article excerpt or part description
  pub excerpt: Option<String>,
  /// Cover image for articles, product image for parts
  pub image: Option<String>,
  /// Articles only
  pub topic_id: Option<String>,
  /// Articles only
  pub published_at: Option<String>,
  /// Parts only
  pub category: Option<String>,
  /// Parts only
  pub manufacturer: Option<String>,
  /// Lower is better, roughly 0..1
  pub relevance_score: f64,
  pub matches: FieldMatches,
}

/// User-selected filters for refining search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchFilters {
  /// Restrict the search to one collection
  pub kind: Option<SearchKind>,
}

/// A search request from the UI.
#[derive(Debug, Clone)]
pub struct SearchQuery {
  pub query: String,
  pub filters: SearchFilters,
  /// Overall result cap; defaults to [`DEFAULT_RESULT_LIMIT`]
  ///
  /// [`DEFAULT_RESULT_LIMIT`]: super::DEFAULT_RESULT_LIMIT
  pub limit: Option<usize>,
}

impl SearchQuery {
  /// A query over both collections with default limits.
  pub fn new(query: impl Into<String>) -> Self {
    Self {
      query: query.into(),
      filters: SearchFilters::default(),
      limit: None,
    }
  }
}
