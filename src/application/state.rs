// src/application/state.rs

use std::sync::Arc;

use crate::config::{AppConfig, StorageBackend};
use crate::db::{create_connection_pool, get_connection, initialize_database, ConnectionPool};
use crate::domain::EntryKind;
use crate::error::{AppError, AppResult};
use crate::repositories::{
    CatalogRepository, FixedStatusVocabulary, JsonFileCatalogRepository, SqliteCatalogRepository,
    SqliteStatusVocabulary, StatusVocabularySource,
};
use crate::services::CatalogService;

/// Wired services, one per entry kind.
/// All fields are Arc-wrapped for sharing across threads.
pub struct AppState {
    pub book_service: Arc<CatalogService>,
    pub movie_service: Arc<CatalogService>,
    /// Present for the SQLite backend only
    pub pool: Option<Arc<ConnectionPool>>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        match &config.backend {
            StorageBackend::Sqlite { path } => {
                let pool = Arc::new(create_connection_pool(path, config.pool_size)?);
                {
                    let conn = get_connection(&pool)?;
                    initialize_database(&conn)?;
                }
                log::info!("Catalog opened on SQLite database {}", path.display());
                Ok(Self::with_pool(pool))
            }
            StorageBackend::JsonFile {
                books_path,
                movies_path,
            } => {
                let vocabulary: Arc<dyn StatusVocabularySource> =
                    Arc::new(FixedStatusVocabulary::defaults());

                let books = JsonFileCatalogRepository::new(
                    EntryKind::Book,
                    books_path,
                    vocabulary.clone(),
                )?;
                let movies =
                    JsonFileCatalogRepository::new(EntryKind::Movie, movies_path, vocabulary)?;

                log::info!(
                    "Catalog opened on JSON files {} and {}",
                    books_path.display(),
                    movies_path.display()
                );
                Ok(Self::with_repositories(Arc::new(books), Arc::new(movies), None))
            }
        }
    }

    /// Wire SQLite repositories on an already initialized pool
    pub fn with_pool(pool: Arc<ConnectionPool>) -> Self {
        let vocabulary: Arc<dyn StatusVocabularySource> =
            Arc::new(SqliteStatusVocabulary::new(pool.clone()));

        let books =
            SqliteCatalogRepository::new(EntryKind::Book, pool.clone(), vocabulary.clone());
        let movies = SqliteCatalogRepository::new(EntryKind::Movie, pool.clone(), vocabulary);

        Self::with_repositories(Arc::new(books), Arc::new(movies), Some(pool))
    }

    pub fn with_repositories(
        books: Arc<dyn CatalogRepository>,
        movies: Arc<dyn CatalogRepository>,
        pool: Option<Arc<ConnectionPool>>,
    ) -> Self {
        Self {
            book_service: Arc::new(CatalogService::new(books)),
            movie_service: Arc::new(CatalogService::new(movies)),
            pool,
        }
    }

    pub fn service(&self, kind: EntryKind) -> &Arc<CatalogService> {
        match kind {
            EntryKind::Book => &self.book_service,
            EntryKind::Movie => &self.movie_service,
        }
    }

    /// Look up a service by a user-supplied kind name ("book", "movies", ...)
    pub fn service_by_name(&self, name: &str) -> AppResult<&Arc<CatalogService>> {
        let kind: EntryKind = name.parse().map_err(AppError::Validation)?;
        Ok(self.service(kind))
    }
}
