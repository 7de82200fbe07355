//! The rebuildable in-memory search index.
//!
//! Populated once per session from freshly fetched collections and queried
//! synchronously by the search page. Indexing a kind replaces its previous
//! index wholesale; nothing here is persisted.

use nucleo_matcher::{Config, Matcher, Utf32String};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::content::{Article, ComputerPart};

use super::matcher::{score_fields, FieldSpec, FuzzyQuery, ARTICLE_FIELDS, PART_FIELDS};
use super::results::{SearchHit, SearchKind, SearchQuery};

/// Default cap on results returned by a single search.
pub const DEFAULT_RESULT_LIMIT: usize = 50;

/// Counts of indexed records per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
  pub articles: usize,
  pub parts: usize,
}

struct IndexedArticle {
  record: Article,
  title: Utf32String,
  content: Utf32String,
  excerpt: Utf32String,
}

impl IndexedArticle {
  fn new(record: Article) -> Self {
    let title = Utf32String::from(record.title.as_str());
    let content = Utf32String::from(record.content.as_str());
    let excerpt = Utf32String::from(record.excerpt.as_deref().unwrap_or(""));
    Self {
      record,
      title,
      content,
      excerpt,
    }
  }

  fn fields(&self) -> [(&'static FieldSpec, &Utf32String); 3] {
    [
      (&ARTICLE_FIELDS[0], &self.title),
      (&ARTICLE_FIELDS[1], &self.content),
      (&ARTICLE_FIELDS[2], &self.excerpt),
    ]
  }
}

struct IndexedPart {
  record: ComputerPart,
  name: Utf32String,
  description: Utf32String,
  manufacturer: Utf32String,
}

impl IndexedPart {
  fn new(record: ComputerPart) -> Self {
    let name = Utf32String::from(record.name.as_str());
    let description = Utf32String::from(record.description.as_str());
    let manufacturer = Utf32String::from(record.manufacturer.as_deref().unwrap_or(""));
    Self {
      record,
      name,
      description,
      manufacturer,
    }
  }

  fn fields(&self) -> [(&'static FieldSpec, &Utf32String); 3] {
    [
      (&PART_FIELDS[0], &self.name),
      (&PART_FIELDS[1], &self.description),
      (&PART_FIELDS[2], &self.manufacturer),
    ]
  }
}

#[derive(Default)]
struct IndexState {
  /// None until `index_articles` has run at least once
  articles: Option<Vec<IndexedArticle>>,
  /// None until `index_parts` has run at least once
  parts: Option<Vec<IndexedPart>>,
}

/// Process-wide fuzzy search index over the session's loaded collections.
///
/// State lives behind a read-write lock and rebuilds swap a kind's index in
/// one write, so a query never observes a half-built index. The stateful
/// matcher sits behind its own mutex; queries serialize on it.
pub struct SearchIndex {
  state: RwLock<IndexState>,
  matcher: Mutex<Matcher>,
}

impl SearchIndex {
  pub fn new() -> Self {
    Self {
      state: RwLock::new(IndexState::default()),
      matcher: Mutex::new(Matcher::new(Config::DEFAULT)),
    }
  }

  /// Index articles for searching. Replaces any previous article index.
  /// Should be called whenever the article collection is (re)fetched.
  pub fn index_articles(&self, articles: Vec<Article>) {
    let indexed: Vec<IndexedArticle> = articles.into_iter().map(IndexedArticle::new).collect();
    debug!(count = indexed.len(), "indexed articles");
    self.write_state().articles = Some(indexed);
  }

  /// Index parts for searching. Replaces any previous part index.
  pub fn index_parts(&self, parts: Vec<ComputerPart>) {
    let indexed: Vec<IndexedPart> = parts.into_iter().map(IndexedPart::new).collect();
    debug!(count = indexed.len(), "indexed parts");
    self.write_state().parts = Some(indexed);
  }

  /// Search articles, best matches first.
  ///
  /// Empty or too-short queries and an unbuilt index both yield an empty
  /// list, never an error.
  pub fn search_articles(&self, query: &str, limit: usize) -> Vec<SearchHit> {
    let state = self.read_state();
    let Some(articles) = state.articles.as_ref() else {
      return Vec::new();
    };

    let mut matcher = self.lock_matcher();
    let Some(parsed) = FuzzyQuery::parse(query, &mut matcher) else {
      return Vec::new();
    };

    let mut hits: Vec<SearchHit> = articles
      .iter()
      .filter_map(|indexed| {
        let (score, matches) = score_fields(&parsed, &indexed.fields(), &mut matcher)?;
        Some(article_hit(&indexed.record, score, matches))
      })
      .collect();

    sort_hits(&mut hits);
    hits.truncate(limit);
    hits
  }

  /// Search parts, best matches first.
  pub fn search_parts(&self, query: &str, limit: usize) -> Vec<SearchHit> {
    let state = self.read_state();
    let Some(parts) = state.parts.as_ref() else {
      return Vec::new();
    };

    let mut matcher = self.lock_matcher();
    let Some(parsed) = FuzzyQuery::parse(query, &mut matcher) else {
      return Vec::new();
    };

    let mut hits: Vec<SearchHit> = parts
      .iter()
      .filter_map(|indexed| {
        let (score, matches) = score_fields(&parsed, &indexed.fields(), &mut matcher)?;
        Some(part_hit(&indexed.record, score, matches))
      })
      .collect();

    sort_hits(&mut hits);
    hits.truncate(limit);
    hits
  }

  /// Unified search across both collections.
  ///
  /// Ranking is global: results are merged, re-sorted by score and truncated
  /// to the overall limit, so a weak part can be pushed out by a stronger
  /// article even when the part index had room to spare.
  pub fn search(&self, query: &SearchQuery) -> Vec<SearchHit> {
    let limit = query.limit.unwrap_or(DEFAULT_RESULT_LIMIT);
    let kind = query.filters.kind;

    let mut results = Vec::new();
    if kind != Some(SearchKind::Part) {
      results.extend(self.search_articles(&query.query, limit));
    }
    if kind != Some(SearchKind::Article) {
      results.extend(self.search_parts(&query.query, limit));
    }

    sort_hits(&mut results);
    results.truncate(limit);
    results
  }

  /// True once both kinds have been indexed at least once, even with zero
  /// records.
  pub fn is_ready(&self) -> bool {
    let state = self.read_state();
    state.articles.is_some() && state.parts.is_some()
  }

  /// Number of records currently indexed per kind.
  pub fn index_stats(&self) -> IndexStats {
    let state = self.read_state();
    IndexStats {
      articles: state.articles.as_ref().map_or(0, Vec::len),
      parts: state.parts.as_ref().map_or(0, Vec::len),
    }
  }

  /// Reset both kinds to the unindexed state.
  pub fn clear_indexes(&self) {
    let mut state = self.write_state();
    state.articles = None;
    state.parts = None;
  }

  // Index data is plain records; a panic mid-rebuild leaves the previous
  // state intact, so poisoned locks are safe to keep serving from.
  fn read_state(&self) -> RwLockReadGuard<'_, IndexState> {
    match self.state.read() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    }
  }

  fn write_state(&self) -> RwLockWriteGuard<'_, IndexState> {
    match self.state.write() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    }
  }

  fn lock_matcher(&self) -> MutexGuard<'_, Matcher> {
    match self.matcher.lock() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    }
  }
}

impl Default for SearchIndex {
  fn default() -> Self {
    Self::new()
  }
}

fn sort_hits(hits: &mut [SearchHit]) {
  hits.sort_by(|a, b| {
    a.relevance_score
      .partial_cmp(&b.relevance_score)
      .unwrap_or(std::cmp::Ordering::Equal)
  });
}

fn article_hit(record: &Article, score: f64, matches: super::results::FieldMatches) -> SearchHit {
  SearchHit {
    kind: SearchKind::Article,
    id: record.id.clone(),
    title: record.title.clone(),
    slug: record.slug.clone(),
    excerpt: record.excerpt.clone(),
    image: record.cover_image.clone(),
    topic_id: Some(record.topic_id.clone()),
    published_at: Some(record.published_at.clone()),
    category: None,
    manufacturer: None,
    relevance_score: score,
    matches,
  }
}

fn part_hit(record: &ComputerPart, score: f64, matches: super::results::FieldMatches) -> SearchHit {
  SearchHit {
    kind: SearchKind::Part,
    id: record.id.clone(),
    title: record.name.clone(),
    slug: record.slug.clone(),
    excerpt: Some(record.description.clone()),
    image: record.image_url.clone(),
    topic_id: None,
    published_at: None,
    category: Some(record.category.as_str().to_string()),
    manufacturer: record.manufacturer.clone(),
    relevance_score: score,
    matches,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::PartCategory;
  use crate::search::results::SearchFilters;

  fn article(id: &str, title: &str, content: &str, excerpt: Option<&str>) -> Article {
    Article {
      id: id.to_string(),
      title: title.to_string(),
      slug: format!("slug-{}", id),
      content: content.to_string(),
      excerpt: excerpt.map(String::from),
      cover_image: None,
      topic_id: "t1".to_string(),
      published_at: "2026-01-01T00:00:00Z".to_string(),
      created_at: "2026-01-01T00:00:00Z".to_string(),
      updated_at: "2026-01-01T00:00:00Z".to_string(),
      view_count: 0,
      is_featured: false,
    }
  }

  fn part(id: &str, name: &str, description: &str, manufacturer: Option<&str>) -> ComputerPart {
    ComputerPart {
      id: id.to_string(),
      name: name.to_string(),
      slug: format!("slug-{}", id),
      category: PartCategory::Peripherals,
      description: description.to_string(),
      image_url: None,
      specifications: Default::default(),
      manufacturer: manufacturer.map(String::from),
      model_number: None,
      created_at: "2026-01-01T00:00:00Z".to_string(),
      updated_at: "2026-01-01T00:00:00Z".to_string(),
    }
  }

  fn indexed() -> SearchIndex {
    let index = SearchIndex::new();
    index.index_articles(vec![
      article(
        "a1",
        "Mechanical Keyboards Explained",
        "A guide to switches, keycaps and layouts.",
        Some("All about mechanical keyboards"),
      ),
      article(
        "a2",
        "Choosing a Power Supply",
        "Wattage, efficiency ratings and rails.",
        None,
      ),
      article(
        "a3",
        "Watercooling Basics",
        "Loops, radiators and a keyboard-sized pump.",
        None,
      ),
    ]);
    index.index_parts(vec![
      part(
        "p1",
        "Mechanical Gaming Keyboard",
        "Hot-swappable switches with RGB lighting.",
        Some("Keychron"),
      ),
      part(
        "p2",
        "750W Power Supply",
        "Fully modular with an efficiency rating.",
        Some("Seasonic"),
      ),
    ]);
    index
  }

  #[test]
  fn test_empty_query_returns_empty() {
    let index = indexed();
    assert!(index.search_articles("", 50).is_empty());
    assert!(index.search_articles("   ", 50).is_empty());
    assert!(index.search_parts("", 50).is_empty());
    assert!(index.search(&SearchQuery::new("")).is_empty());
  }

  #[test]
  fn test_single_char_query_returns_empty() {
    let index = indexed();
    assert!(index.search_articles("a", 50).is_empty());
  }

  #[test]
  fn test_unbuilt_index_returns_empty() {
    let index = SearchIndex::new();
    assert!(index.search_articles("keyboard", 50).is_empty());
    assert!(index.search_parts("keyboard", 50).is_empty());
    assert!(index.search(&SearchQuery::new("keyboard")).is_empty());
    assert!(!index.is_ready());
  }

  #[test]
  fn test_title_match_found_with_ranges() {
    let index = indexed();
    let hits = index.search_articles("keyboards", 50);

    assert!(!hits.is_empty());
    let top = &hits[0];
    assert_eq!(top.id, "a1");

    // The matched substring in the title is reported for highlighting
    let ranges = top.matches.get("title").expect("title ranges");
    let title_chars: Vec<char> = top.title.chars().collect();
    let highlighted: String = ranges
      .iter()
      .flat_map(|r| title_chars[r.start..r.end].iter())
      .collect();
    assert_eq!(highlighted.to_lowercase(), "keyboards");
  }

  #[test]
  fn test_unrelated_query_matches_nothing() {
    let index = indexed();
    assert!(index.search_articles("quantum entanglement", 50).is_empty());
  }

  #[test]
  fn test_scores_ascending() {
    let index = indexed();
    let hits = index.search(&SearchQuery::new("keyboard"));

    assert!(hits.len() >= 2);
    for pair in hits.windows(2) {
      assert!(pair[0].relevance_score <= pair[1].relevance_score);
    }
  }

  #[test]
  fn test_title_match_outranks_content_match() {
    let index = indexed();
    let hits = index.search_articles("keyboard", 50);

    let a1_pos = hits.iter().position(|h| h.id == "a1").unwrap();
    let a3_pos = hits.iter().position(|h| h.id == "a3").unwrap();
    // a1 matches on the title, a3 only in its content
    assert!(a1_pos < a3_pos);
  }

  #[test]
  fn test_per_kind_limit() {
    let index = indexed();
    let hits = index.search_articles("keyboard", 1);
    assert_eq!(hits.len(), 1);
  }

  #[test]
  fn test_unified_search_spans_kinds() {
    let index = indexed();
    let hits = index.search(&SearchQuery::new("mechanical keyboard"));

    assert!(hits.iter().any(|h| h.kind == SearchKind::Article));
    assert!(hits.iter().any(|h| h.kind == SearchKind::Part));
  }

  #[test]
  fn test_kind_filter() {
    let index = indexed();
    let query = SearchQuery {
      query: "mechanical keyboard".to_string(),
      filters: SearchFilters {
        kind: Some(SearchKind::Part),
      },
      limit: None,
    };

    let hits = index.search(&query);
    assert!(!hits.is_empty());
    assert!(hits.iter().all(|h| h.kind == SearchKind::Part));
  }

  #[test]
  fn test_global_truncation_keeps_best_scores() {
    let index = indexed();

    let all = index.search(&SearchQuery::new("power supply"));
    let limited = index.search(&SearchQuery {
      query: "power supply".to_string(),
      filters: SearchFilters::default(),
      limit: Some(1),
    });

    assert!(all.len() > 1);
    assert_eq!(limited.len(), 1);
    // Truncation keeps the head of the globally sorted list
    assert_eq!(limited[0].id, all[0].id);
  }

  #[test]
  fn test_part_hit_carries_catalog_fields() {
    let index = indexed();
    let hits = index.search_parts("keychron", 50);

    assert_eq!(hits.len(), 1);
    let hit = &hits[0];
    assert_eq!(hit.id, "p1");
    assert_eq!(hit.category.as_deref(), Some("peripherals"));
    assert_eq!(hit.manufacturer.as_deref(), Some("Keychron"));
  }

  #[test]
  fn test_reindex_replaces_collection() {
    let index = indexed();
    assert!(!index.search_articles("keyboards", 50).is_empty());

    index.index_articles(vec![article("b1", "Fresh Start", "New content.", None)]);

    assert!(index.search_articles("keyboards", 50).is_empty());
    assert!(!index.search_articles("fresh start", 50).is_empty());
    assert_eq!(index.index_stats().articles, 1);
  }

  #[test]
  fn test_is_ready_requires_both_kinds() {
    let index = SearchIndex::new();
    assert!(!index.is_ready());

    index.index_articles(Vec::new());
    assert!(!index.is_ready());

    // Ready even with zero records, as long as both kinds were indexed
    index.index_parts(Vec::new());
    assert!(index.is_ready());
  }

  #[test]
  fn test_clear_indexes_resets() {
    let index = indexed();
    assert!(index.is_ready());

    index.clear_indexes();

    assert!(!index.is_ready());
    assert!(index.search_articles("keyboard", 50).is_empty());
    assert_eq!(
      index.index_stats(),
      IndexStats {
        articles: 0,
        parts: 0
      }
    );
  }

  #[test]
  fn test_index_stats_counts() {
    let index = indexed();
    assert_eq!(
      index.index_stats(),
      IndexStats {
        articles: 3,
        parts: 2
      }
    );
  }
}
