//! Weighted multi-field fuzzy scoring on top of nucleo's matcher.
//!
//! nucleo reports integer scores (higher = better) and per-character match
//! indices. This module turns those into the contract the search page works
//! with: a normalized 0-to-1 distance per field (0 = perfect), a threshold
//! that decides whether a field counts as matched at all, and contiguous
//! character ranges for highlighting.

use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32Str, Utf32String};

use super::results::{FieldMatches, MatchRange};

/// Normalized match tolerance. A field only counts as matched when its
/// distance stays at or below this; lower = stricter.
pub const SCORE_THRESHOLD: f64 = 0.35;

/// Queries and matched substrings shorter than this are ignored.
pub const MIN_MATCH_LENGTH: usize = 2;

/// Floor for a matched field's distance, so a perfect field can't zero out
/// the combined score and erase the weighting between fields.
const MIN_FIELD_DISTANCE: f64 = 0.001;

/// A searchable field and its contribution to the record score.
pub struct FieldSpec {
  pub name: &'static str,
  pub weight: f64,
}

/// Article field weighting: title dominates, body and excerpt refine.
pub static ARTICLE_FIELDS: [FieldSpec; 3] = [
  FieldSpec {
    name: "title",
    weight: 0.6,
  },
  FieldSpec {
    name: "content",
    weight: 0.3,
  },
  FieldSpec {
    name: "excerpt",
    weight: 0.1,
  },
];

/// Part field weighting.
pub static PART_FIELDS: [FieldSpec; 3] = [
  FieldSpec {
    name: "name",
    weight: 0.7,
  },
  FieldSpec {
    name: "description",
    weight: 0.2,
  },
  FieldSpec {
    name: "manufacturer",
    weight: 0.1,
  },
];

/// A parsed query plus the perfect-match reference used to normalize scores.
pub struct FuzzyQuery {
  pattern: Pattern,
  /// Score of the pattern against the query itself
  self_score: u32,
}

impl FuzzyQuery {
  /// Parse a raw query. Returns None for queries too short to match.
  pub fn parse(raw: &str, matcher: &mut Matcher) -> Option<Self> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < MIN_MATCH_LENGTH {
      return None;
    }

    let pattern = Pattern::parse(trimmed, CaseMatching::Ignore, Normalization::Smart);
    let mut buf = Vec::new();
    let self_score = pattern.score(Utf32Str::new(trimmed, &mut buf), matcher)?;
    if self_score == 0 {
      return None;
    }

    Some(Self {
      pattern,
      self_score,
    })
  }

  /// Score one field.
  ///
  /// Returns the normalized distance (0 = perfect) and the matched character
  /// ranges, or None when the field misses the threshold entirely.
  fn match_field(&self, field: &Utf32String, matcher: &mut Matcher) -> Option<(f64, Vec<MatchRange>)> {
    let mut indices = Vec::new();
    let score = self.pattern.indices(field.slice(..), matcher, &mut indices)?;

    let distance = 1.0 - (f64::from(score) / f64::from(self.self_score)).min(1.0);
    if distance > SCORE_THRESHOLD {
      return None;
    }

    indices.sort_unstable();
    indices.dedup();
    Some((distance, collapse_ranges(&indices)))
  }
}

/// Score a record's fields against a parsed query.
///
/// The record score is the product of each matched field's distance raised to
/// that field's weight (weights per kind sum to 1). Unmatched fields
/// contribute nothing, so a high-weight field match pulls the score down
/// harder than a low-weight one, and matching more fields can only improve
/// the rank. Returns None when no field matched.
pub(crate) fn score_fields(
  query: &FuzzyQuery,
  fields: &[(&FieldSpec, &Utf32String)],
  matcher: &mut Matcher,
) -> Option<(f64, FieldMatches)> {
  let mut score = 1.0;
  let mut matched = false;
  let mut matches = FieldMatches::new();

  for (spec, text) in fields {
    if let Some((distance, ranges)) = query.match_field(text, matcher) {
      score *= distance.max(MIN_FIELD_DISTANCE).powf(spec.weight);
      matched = true;
      if !ranges.is_empty() {
        matches.insert(spec.name, ranges);
      }
    }
  }

  if !matched {
    return None;
  }
  Some((score, matches))
}

/// Collapse sorted character indices into contiguous ranges, dropping runs
/// shorter than the minimum match length.
fn collapse_ranges(indices: &[u32]) -> Vec<MatchRange> {
  let mut ranges = Vec::new();
  let mut iter = indices.iter().copied();
  let Some(first) = iter.next() else {
    return ranges;
  };

  let mut start = first as usize;
  let mut end = start + 1;
  for idx in iter {
    let idx = idx as usize;
    if idx == end {
      end += 1;
    } else {
      push_range(&mut ranges, start, end);
      start = idx;
      end = idx + 1;
    }
  }
  push_range(&mut ranges, start, end);

  ranges
}

fn push_range(ranges: &mut Vec<MatchRange>, start: usize, end: usize) {
  if end - start >= MIN_MATCH_LENGTH {
    ranges.push(MatchRange { start, end });
  }
}
