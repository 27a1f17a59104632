//! Application state shared by all handlers.

use std::sync::Arc;

use crate::content::{ArchiveSource, CatalogCache};
use crate::db::DbPool;
use crate::services::AttemptCounter;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Users, sessions, settings, course structure, events and progress
    pub auth_db: DbPool,
    /// Packaged exercise archive; reopened per request
    pub archive: ArchiveSource,
    pub catalog: Arc<CatalogCache>,
    pub attempts: Arc<AttemptCounter>,
}

impl AppState {
    pub fn new(auth_db: DbPool, archive: ArchiveSource) -> Self {
        Self {
            auth_db,
            archive,
            catalog: Arc::new(CatalogCache::new()),
            attempts: Arc::new(AttemptCounter::new()),
        }
    }
}
