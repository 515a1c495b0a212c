//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::db::PgStore;
use crate::services::{AssignmentQueryService, DistributionCoordinator};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    coordinator: DistributionCoordinator<PgStore>,
    queries: AssignmentQueryService<PgStore>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let store = PgStore::new(pool.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                coordinator: DistributionCoordinator::new(store.clone()),
                queries: AssignmentQueryService::new(store),
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The upload distribution pipeline.
    #[must_use]
    pub fn coordinator(&self) -> &DistributionCoordinator<PgStore> {
        &self.inner.coordinator
    }

    /// Assignment read views.
    #[must_use]
    pub fn queries(&self) -> &AssignmentQueryService<PgStore> {
        &self.inner.queries
    }
}
