//! List filtering, ordering, and pagination helpers.
//!
//! This module lives in `core` (zero internal deps) so repositories can
//! build SQL fragments from user input without trusting it.

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of rows per page for catalog listings.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Maximum number of rows per page for catalog listings.
pub const MAX_LIST_LIMIT: i64 = 200;

// ---------------------------------------------------------------------------
// Search terms
// ---------------------------------------------------------------------------

/// Turn free-text input into an `ILIKE` pattern matching it as a substring.
///
/// `%`, `_` and `\` in the input are escaped so they match literally.
/// Blank input yields `None` (no filter).
pub fn ilike_pattern(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut escaped = String::with_capacity(trimmed.len() + 2);
    escaped.push('%');
    for c in trimmed.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    Some(escaped)
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Resolve a `?ordering=` value against a whitelist of sortable columns.
///
/// A leading `-` requests descending order. Unknown fields fall back to
/// `default`, which is itself given in the same `field` / `-field` syntax.
///
/// Returns an SQL `ORDER BY` body such as `"price DESC"`.
///
/// # Examples
///
/// ```
/// use bookstore_core::search::resolve_ordering;
/// let allowed = &["title", "price"];
/// assert_eq!(resolve_ordering(Some("-price"), allowed, "title"), "price DESC");
/// assert_eq!(resolve_ordering(Some("isbn"), allowed, "title"), "title ASC");
/// ```
pub fn resolve_ordering(requested: Option<&str>, allowed: &[&str], default: &str) -> String {
    let parse = |spec: &str| -> Option<(String, &'static str)> {
        let (field, direction) = match spec.strip_prefix('-') {
            Some(rest) => (rest, "DESC"),
            None => (spec, "ASC"),
        };
        allowed
            .iter()
            .find(|a| **a == field)
            .map(|a| (a.to_string(), direction))
    };

    let (field, direction) = requested
        .and_then(|r| parse(r.trim()))
        .or_else(|| parse(default))
        .unwrap_or_else(|| (default.trim_start_matches('-').to_string(), "ASC"));
    format!("{field} {direction}")
}

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
