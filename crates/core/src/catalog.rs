//! Catalog entity kinds and field-level validation rules.
//!
//! The database enforces uniqueness; everything that can be decided from a
//! single input value (ISBN shape, price and stock bounds, required text)
//! is checked here before a repository is called.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum length of a category name.
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

/// Maximum length of an author's first or last name.
pub const MAX_AUTHOR_NAME_LEN: usize = 100;

/// Maximum length of a book title.
pub const MAX_TITLE_LEN: usize = 200;

/// Highest accepted book price (inclusive).
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 2);

/// Highest accepted rating (inclusive).
pub const MAX_RATING: Decimal = Decimal::from_parts(500, 0, 0, false, 2);

// ---------------------------------------------------------------------------
// Entity types
// ---------------------------------------------------------------------------

/// The three catalog entity kinds the integrity service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Category,
    Author,
    Book,
}

impl EntityType {
    /// Value stored in `audit_records.entity_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Category => "category",
            EntityType::Author => "author",
            EntityType::Book => "book",
        }
    }

    /// Human-readable name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Category => "Category",
            EntityType::Author => "Author",
            EntityType::Book => "Book",
        }
    }

    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            EntityType::Category => "categories",
            EntityType::Author => "authors",
            EntityType::Book => "books",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(EntityType::Category),
            "author" => Ok(EntityType::Author),
            "book" => Ok(EntityType::Book),
            other => Err(format!("Unknown entity type: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Book condition
// ---------------------------------------------------------------------------

/// Physical condition of a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookCondition {
    #[default]
    New,
    Good,
    Fair,
    Poor,
}

impl BookCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookCondition::New => "new",
            BookCondition::Good => "good",
            BookCondition::Fair => "fair",
            BookCondition::Poor => "poor",
        }
    }
}

impl FromStr for BookCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(BookCondition::New),
            "good" => Ok(BookCondition::Good),
            "fair" => Ok(BookCondition::Fair),
            "poor" => Ok(BookCondition::Poor),
            other => Err(format!(
                "Invalid condition '{other}': expected one of new, good, fair, poor"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Trim a required text field and enforce its maximum length.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} is required"));
    }
    if trimmed.chars().count() > max_len {
        return Err(format!("{field} must be at most {max_len} characters"));
    }
    Ok(trimmed.to_string())
}

/// Normalize an ISBN by stripping hyphens and spaces.
///
/// The result must be exactly 10 or 13 ASCII digits.
pub fn normalize_isbn(raw: &str) -> Result<String, String> {
    let normalized: String = raw
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect();

    if !normalized.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("ISBN '{raw}' must contain only digits"));
    }
    match normalized.len() {
        10 | 13 => Ok(normalized),
        n => Err(format!("ISBN must have 10 or 13 digits, got {n}")),
    }
}

/// Price must be positive, at most [`MAX_PRICE`], with no more than two
/// decimal places.
pub fn validate_price(price: Decimal) -> Result<Decimal, String> {
    if price <= Decimal::ZERO {
        return Err("Price must be a positive number".to_string());
    }
    if price > MAX_PRICE {
        return Err(format!("Price must not exceed {MAX_PRICE}"));
    }
    if price.normalize().scale() > 2 {
        return Err("Price must have at most 2 decimal places".to_string());
    }
    Ok(price.round_dp(2))
}

/// Rating is optional; when present it must lie in `0.00..=5.00`.
pub fn validate_rating(rating: Decimal) -> Result<Decimal, String> {
    if rating < Decimal::ZERO || rating > MAX_RATING {
        return Err(format!("Rating must be between 0 and {MAX_RATING}"));
    }
    Ok(rating.round_dp(2))
}

/// Page count, when given, must be positive.
pub fn validate_pages(pages: i32) -> Result<i32, String> {
    if pages <= 0 {
        return Err("Pages must be a positive number".to_string());
    }
    Ok(pages)
}

/// A book must be linked to at least one author. Duplicates are collapsed.
pub fn normalize_author_ids(ids: &[i64]) -> Result<Vec<i64>, String> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Err("At least one author is required".to_string());
    }
    Ok(ids)
}

/// Compose an author's display name.
pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isbn_strips_hyphens_and_spaces() {
        assert_eq!(
            normalize_isbn("978-0-306-40615-7").unwrap(),
            "9780306406157"
        );
        assert_eq!(normalize_isbn("0 306 40615 2").unwrap(), "0306406152");
    }

    #[test]
    fn isbn_rejects_wrong_lengths() {
        let err = normalize_isbn("12345").unwrap_err();
        assert!(err.contains("got 5"), "unexpected message: {err}");
        assert!(normalize_isbn("12345678901").is_err());
    }

    #[test]
    fn isbn_rejects_letters() {
        assert!(normalize_isbn("030640615X").is_err());
    }

    #[test]
    fn price_bounds() {
        assert!(validate_price(Decimal::ZERO).is_err());
        assert!(validate_price(Decimal::new(-100, 2)).is_err());
        assert_eq!(validate_price(Decimal::new(1999, 2)).unwrap(), Decimal::new(1999, 2));
        assert!(validate_price(MAX_PRICE).is_ok());
        assert!(validate_price(Decimal::new(1_000_001, 2)).is_err());
    }

    #[test]
    fn price_rejects_sub_cent_precision() {
        assert!(validate_price(Decimal::new(19_999, 3)).is_err());
        // Trailing zeros are not extra precision.
        assert!(validate_price(Decimal::new(19_990, 3)).is_ok());
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(Decimal::new(450, 2)).is_ok());
        assert!(validate_rating(Decimal::new(501, 2)).is_err());
        assert!(validate_rating(Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn required_text_is_trimmed() {
        assert_eq!(
            validate_required_text("  Fiction  ", "name", 100).unwrap(),
            "Fiction"
        );
        assert!(validate_required_text("   ", "name", 100).is_err());
        assert!(validate_required_text(&"x".repeat(101), "name", 100).is_err());
    }

    #[test]
    fn author_ids_deduplicated_and_required() {
        assert_eq!(normalize_author_ids(&[3, 1, 3]).unwrap(), vec![1, 3]);
        assert!(normalize_author_ids(&[]).is_err());
    }

    #[test]
    fn entity_type_parses_audit_names() {
        for et in [EntityType::Category, EntityType::Author, EntityType::Book] {
            assert_eq!(et.as_str().parse::<EntityType>().unwrap(), et);
        }
        assert!("books".parse::<EntityType>().is_err());
    }

    #[test]
    fn condition_parses_lowercase_only() {
        assert_eq!("fair".parse::<BookCondition>().unwrap(), BookCondition::Fair);
        assert!("Fair".parse::<BookCondition>().is_err());
        assert_eq!(BookCondition::default(), BookCondition::New);
    }

    #[test]
    fn full_name_handles_blank_parts() {
        assert_eq!(full_name("Ursula", "Le Guin"), "Ursula Le Guin");
        assert_eq!(full_name("", "Homer"), "Homer");
    }
}
