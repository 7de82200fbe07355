//! Render match ranges as markup safe to hand to the results view.

use super::results::MatchRange;

/// Wrap the matched ranges of `text` in highlight markers.
///
/// All literal text is HTML-escaped before the markers are inserted, so
/// user-authored content echoed back through search can never smuggle markup
/// into the page. Ranges are character offsets with exclusive ends; they are
/// sorted internally and ranges that overlap an earlier one or fall outside
/// the text are skipped.
pub fn highlight_matches(text: &str, ranges: &[MatchRange]) -> String {
  if ranges.is_empty() {
    return escape_html(text);
  }

  let chars: Vec<char> = text.chars().collect();
  let mut sorted = ranges.to_vec();
  sorted.sort_by_key(|r| r.start);

  let mut out = String::with_capacity(text.len() + sorted.len() * 40);
  let mut cursor = 0usize;

  for range in sorted {
    let start = range.start.min(chars.len());
    let end = range.end.min(chars.len());
    if start < cursor || start >= end {
      continue;
    }

    escape_into(&mut out, &chars[cursor..start]);
    out.push_str("<mark class=\"search-highlight\">");
    escape_into(&mut out, &chars[start..end]);
    out.push_str("</mark>");
    cursor = end;
  }

  escape_into(&mut out, &chars[cursor..]);
  out
}

/// Escape HTML special characters.
fn escape_html(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    escape_char(&mut out, c);
  }
  out
}

fn escape_into(out: &mut String, chars: &[char]) {
  for &c in chars {
    escape_char(out, c);
  }
}

fn escape_char(out: &mut String, c: char) {
  match c {
    '&' => out.push_str("&amp;"),
    '<' => out.push_str("&lt;"),
    '>' => out.push_str("&gt;"),
    '"' => out.push_str("&quot;"),
    '\'' => out.push_str("&#39;"),
    _ => out.push(c),
  }
}
