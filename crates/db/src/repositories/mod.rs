//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Catalog writes append an
//! audit record in the same transaction. Catalog deletes are not here: they
//! go through [`crate::store::PgCatalogStore`] and the integrity service.

pub mod audit_repo;
pub mod author_repo;
pub mod book_repo;
pub mod category_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;

pub use audit_repo::AuditRepo;
pub use author_repo::AuthorRepo;
pub use book_repo::{BookRepo, StockUpdate};
pub use category_repo::CategoryRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
