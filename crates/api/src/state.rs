use std::sync::Arc;

use bookstore_core::integrity::CatalogIntegrity;
use bookstore_db::PgCatalogStore;

use crate::config::ServerConfig;
use crate::mail::EmailDelivery;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference counted and the rest sits
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: bookstore_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// SMTP mailer, present only when `SMTP_HOST` is configured.
    pub mailer: Option<Arc<EmailDelivery>>,
}

impl AppState {
    pub fn new(pool: bookstore_db::DbPool, config: ServerConfig) -> Self {
        let mailer = config
            .email
            .clone()
            .map(|email| Arc::new(EmailDelivery::new(email)));
        Self {
            pool,
            config: Arc::new(config),
            mailer,
        }
    }

    /// Integrity service over the shared pool.
    pub fn integrity(&self) -> CatalogIntegrity<PgCatalogStore> {
        CatalogIntegrity::new(PgCatalogStore::new(self.pool.clone()))
    }
}
