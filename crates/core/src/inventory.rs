//! Stock-level rules for books.
//!
//! Repositories lock the book row, hand the current quantity to
//! [`apply_adjustment`], and persist the result only when it is `Ok`.

use serde::Serialize;

/// Highest stock quantity a single book may carry (inclusive).
pub const MAX_STOCK: i32 = 10_000;

/// Books at or below this quantity are reported as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("Quantity must be a positive number, got {0}")]
    InvalidQuantity(i32),

    #[error("Stock quantity must be between 0 and {MAX_STOCK}, got {0}")]
    OutOfRange(i64),

    #[error("Insufficient stock: {available} available, {requested} requested")]
    Insufficient { available: i32, requested: i32 },
}

/// A requested change to a book's stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "quantity", rename_all = "snake_case")]
pub enum StockAdjustment {
    /// Replace the quantity outright.
    Set(i32),
    /// Receive new copies.
    Add(i32),
    /// Sell or write off copies.
    Remove(i32),
}

impl StockAdjustment {
    /// Audit action label for this adjustment.
    pub fn describe(&self) -> String {
        match self {
            StockAdjustment::Set(n) => format!("set to {n}"),
            StockAdjustment::Add(n) => format!("added {n}"),
            StockAdjustment::Remove(n) => format!("removed {n}"),
        }
    }
}

/// Validate an absolute stock quantity.
pub fn validate_stock(quantity: i64) -> Result<i32, InventoryError> {
    if !(0..=MAX_STOCK as i64).contains(&quantity) {
        return Err(InventoryError::OutOfRange(quantity));
    }
    Ok(quantity as i32)
}

/// Compute the new quantity for `adjustment` applied to `current`.
pub fn apply_adjustment(current: i32, adjustment: StockAdjustment) -> Result<i32, InventoryError> {
    match adjustment {
        StockAdjustment::Set(n) => validate_stock(n as i64),
        StockAdjustment::Add(n) => {
            if n <= 0 {
                return Err(InventoryError::InvalidQuantity(n));
            }
            validate_stock(current as i64 + n as i64)
        }
        StockAdjustment::Remove(n) => {
            if n <= 0 {
                return Err(InventoryError::InvalidQuantity(n));
            }
            if n > current {
                return Err(InventoryError::Insufficient {
                    available: current,
                    requested: n,
                });
            }
            Ok(current - n)
        }
    }
}

pub fn is_low_stock(quantity: i32) -> bool {
    quantity <= LOW_STOCK_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_within_bounds() {
        assert_eq!(apply_adjustment(3, StockAdjustment::Add(7)), Ok(10));
    }

    #[test]
    fn add_past_maximum_is_rejected() {
        assert_eq!(
            apply_adjustment(9_999, StockAdjustment::Add(2)),
            Err(InventoryError::OutOfRange(10_001))
        );
    }

    #[test]
    fn remove_more_than_available() {
        assert_eq!(
            apply_adjustment(2, StockAdjustment::Remove(3)),
            Err(InventoryError::Insufficient {
                available: 2,
                requested: 3
            })
        );
    }

    #[test]
    fn remove_everything_reaches_zero() {
        assert_eq!(apply_adjustment(4, StockAdjustment::Remove(4)), Ok(0));
    }

    #[test]
    fn relative_adjustments_need_positive_quantity() {
        assert_eq!(
            apply_adjustment(4, StockAdjustment::Add(0)),
            Err(InventoryError::InvalidQuantity(0))
        );
        assert_eq!(
            apply_adjustment(4, StockAdjustment::Remove(-1)),
            Err(InventoryError::InvalidQuantity(-1))
        );
    }

    #[test]
    fn set_ignores_current_but_checks_range() {
        assert_eq!(apply_adjustment(100, StockAdjustment::Set(0)), Ok(0));
        assert!(apply_adjustment(0, StockAdjustment::Set(-5)).is_err());
        assert!(apply_adjustment(0, StockAdjustment::Set(MAX_STOCK)).is_ok());
    }

    #[test]
    fn low_stock_threshold_is_inclusive() {
        assert!(is_low_stock(5));
        assert!(!is_low_stock(6));
        assert!(is_low_stock(0));
    }
}
