//! Client-side fuzzy search over the loaded article and part collections.
//!
//! The index is rebuilt from freshly fetched collections once per session and
//! queried synchronously; it never touches the offline cache and is never
//! persisted. Matching is approximate with weighted fields, and every hit
//! carries character ranges for highlighting.

mod highlight;
mod index;
mod matcher;
mod results;

pub use highlight::highlight_matches;
pub use index::{IndexStats, SearchIndex, DEFAULT_RESULT_LIMIT};
pub use matcher::{MIN_MATCH_LENGTH, SCORE_THRESHOLD};
pub use results::{FieldMatches, MatchRange, SearchFilters, SearchHit, SearchKind, SearchQuery};
