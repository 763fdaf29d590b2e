// src/repositories/vocabulary_repository.rs
//
// Status vocabulary sources
//
// Both catalog backends receive their vocabulary through
// `StatusVocabularySource`, so the relational and flat-file stores
// validate against whichever source the application wires in.

use rusqlite::params;
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::{get_connection, ConnectionPool};
use crate::domain::{DomainError, EntryKind, StatusVocabulary};
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
pub trait StatusVocabularySource: Send + Sync {
    fn fetch_allowed_statuses(&self, kind: EntryKind) -> AppResult<StatusVocabulary>;
}

// ---------------------------------------------------------------------
// SQLite vocabulary (live query, no caching)
// ---------------------------------------------------------------------
pub struct SqliteStatusVocabulary {
    pool: Arc<ConnectionPool>,
}

impl SqliteStatusVocabulary {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn status_table(kind: EntryKind) -> &'static str {
        match kind {
            EntryKind::Book => "book_status",
            EntryKind::Movie => "movie_status",
        }
    }

    /// Add a status name to the vocabulary. Returns false if it was
    /// already present.
    pub fn register_status(&self, kind: EntryKind, name: &str) -> AppResult<bool> {
        if name.trim().is_empty() {
            return Err(AppError::Validation(DomainError::MalformedRecord(
                "Status name cannot be empty".to_string(),
            )));
        }

        let conn = get_connection(&self.pool)?;
        let inserted = conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (name) VALUES (?1)",
                Self::status_table(kind)
            ),
            params![name],
        )?;

        if inserted > 0 {
            log::info!("Registered {} status '{}'", kind, name);
        }
        Ok(inserted > 0)
    }
}

impl StatusVocabularySource for SqliteStatusVocabulary {
    fn fetch_allowed_statuses(&self, kind: EntryKind) -> AppResult<StatusVocabulary> {
        let conn = get_connection(&self.pool)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT name FROM {} ORDER BY id",
            Self::status_table(kind)
        ))?;

        let names: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StatusVocabulary::new(names))
    }
}

// ---------------------------------------------------------------------
// Fixed vocabulary (constant per kind)
// ---------------------------------------------------------------------
#[derive(Debug, Clone, Default)]
pub struct FixedStatusVocabulary {
    vocabularies: HashMap<EntryKind, StatusVocabulary>,
}

impl FixedStatusVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The vocabularies seeded into a fresh database
    pub fn defaults() -> Self {
        Self::new()
            .with(
                EntryKind::Book,
                StatusVocabulary::new(["owned", "read", "reading", "wishlist"]),
            )
            .with(
                EntryKind::Movie,
                StatusVocabulary::new(["owned", "watched", "watchlist"]),
            )
    }

    pub fn with(mut self, kind: EntryKind, vocabulary: StatusVocabulary) -> Self {
        self.vocabularies.insert(kind, vocabulary);
        self
    }
}

impl StatusVocabularySource for FixedStatusVocabulary {
    fn fetch_allowed_statuses(&self, kind: EntryKind) -> AppResult<StatusVocabulary> {
        Ok(self.vocabularies.get(&kind).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_memory_pool, initialize_database};

    fn sqlite_vocabulary() -> SqliteStatusVocabulary {
        let pool = Arc::new(create_memory_pool().unwrap());
        {
            let conn = pool.get().unwrap();
            initialize_database(&conn).unwrap();
        }
        SqliteStatusVocabulary::new(pool)
    }

    #[test]
    fn test_sqlite_vocabulary_in_storage_order() {
        let source = sqlite_vocabulary();
        let books = source.fetch_allowed_statuses(EntryKind::Book).unwrap();
        assert_eq!(
            books.iter().collect::<Vec<_>>(),
            vec!["owned", "read", "reading", "wishlist"]
        );

        let movies = source.fetch_allowed_statuses(EntryKind::Movie).unwrap();
        assert!(movies.contains("watchlist"));
        assert!(!movies.contains("read"));
    }

    #[test]
    fn test_registered_status_is_visible_immediately() {
        let source = sqlite_vocabulary();
        assert!(source.register_status(EntryKind::Book, "lent").unwrap());
        assert!(!source.register_status(EntryKind::Book, "lent").unwrap());

        let books = source.fetch_allowed_statuses(EntryKind::Book).unwrap();
        assert!(books.contains("lent"));
        assert_eq!(books.len(), 5);
    }

    #[test]
    fn test_blank_status_name_rejected() {
        let source = sqlite_vocabulary();
        assert!(matches!(
            source.register_status(EntryKind::Movie, " "),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_fixed_defaults_match_seeded_vocabulary() {
        let fixed = FixedStatusVocabulary::defaults();
        let sqlite = sqlite_vocabulary();
        for kind in EntryKind::ALL {
            assert_eq!(
                fixed.fetch_allowed_statuses(kind).unwrap(),
                sqlite.fetch_allowed_statuses(kind).unwrap()
            );
        }
    }

    #[test]
    fn test_fixed_unknown_kind_is_empty() {
        let fixed = FixedStatusVocabulary::new();
        assert!(fixed
            .fetch_allowed_statuses(EntryKind::Movie)
            .unwrap()
            .is_empty());
    }
}
