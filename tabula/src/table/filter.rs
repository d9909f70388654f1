//! Row filtering for hosts that narrow the table's input by a search term.

use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};

use super::TableRow;

/// Rows whose named attributes contain `query`, ignoring case.
///
/// Input order is preserved. An empty query keeps every row.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tabula::table::filter_rows;
///
/// let users = vec![
///     json!({ "name": "John Doe", "email": "john@example.com" }),
///     json!({ "name": "Jane Smith", "email": "jane@example.com" }),
/// ];
/// let hits = filter_rows(&users, "JANE", &["name", "email"]);
/// assert_eq!(hits.len(), 1);
/// ```
pub fn filter_rows<'a, R: TableRow>(rows: &'a [R], query: &str, keys: &[&str]) -> Vec<&'a R> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return rows.iter().collect();
    }

    rows.iter()
        .filter(|row| {
            keys.iter()
                .any(|key| row.value(key).to_string().to_lowercase().contains(&needle))
        })
        .collect()
}

/// Rows fuzzily matching `query` on any of the named attributes.
///
/// Returns matches sorted by score, best first; rows with equal scores keep
/// their input order. An empty query keeps every row in input order.
pub fn fuzzy_filter_rows<'a, R: TableRow>(
    rows: &'a [R],
    query: &str,
    keys: &[&str],
) -> Vec<&'a R> {
    if query.is_empty() {
        return rows.iter().collect();
    }

    let mut matcher = Matcher::new(Config::DEFAULT);
    let pattern = Pattern::new(
        query,
        CaseMatching::Ignore,
        Normalization::Smart,
        AtomKind::Fuzzy,
    );

    let mut buf = Vec::new();
    let mut matches: Vec<(u32, &R)> = rows
        .iter()
        .filter_map(|row| {
            keys.iter()
                .filter_map(|key| {
                    let text = row.value(key).to_string();
                    let haystack = Utf32Str::new(&text, &mut buf);
                    pattern.score(haystack, &mut matcher)
                })
                .max()
                .map(|score| (score, row))
        })
        .collect();

    // Sort by score descending (stable, ties keep input order)
    matches.sort_by(|a, b| b.0.cmp(&a.0));

    matches.into_iter().map(|(_, row)| row).collect()
}
