//! Pure domain logic for the bookstore catalog backend.
//!
//! Nothing in this crate talks to the database directly. Repositories and
//! HTTP handlers pass data in; the integrity service reaches storage only
//! through the [`integrity::CatalogStore`] trait.

pub mod catalog;
pub mod error;
pub mod hashing;
pub mod integrity;
pub mod inventory;
pub mod password_reset;
pub mod roles;
pub mod search;
pub mod types;
