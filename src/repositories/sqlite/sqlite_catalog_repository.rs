// src/repositories/sqlite/sqlite_catalog_repository.rs
//
// Relational catalog persistence
//
// Layout per kind: `<kind>` (entries), `<kind>_status` (vocabulary),
// `<kind>_has_status` (links). Links are deleted and re-inserted on
// every save, inside the same transaction as the entry upsert.
//
// Reads run one status query per entry. That is linear in the number
// of entries and fine for a personal catalog.

use rusqlite::{params, Connection, Row, Transaction};
use std::sync::Arc;

use crate::db::{get_connection, ConnectionPool};
use crate::domain::{CatalogEntry, EntryKind, EntryRecord, StatusVocabulary};
use crate::error::{AppError, AppResult};
use crate::repositories::{CatalogRepository, EntryFilter, StatusVocabularySource};

/// Table names for one entry kind
#[derive(Debug, Clone, Copy)]
struct Tables {
    entry: &'static str,
    status: &'static str,
    link: &'static str,
}

impl Tables {
    fn for_kind(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Book => Tables {
                entry: "book",
                status: "book_status",
                link: "book_has_status",
            },
            EntryKind::Movie => Tables {
                entry: "movie",
                status: "movie_status",
                link: "movie_has_status",
            },
        }
    }
}

pub struct SqliteCatalogRepository {
    kind: EntryKind,
    tables: Tables,
    pool: Arc<ConnectionPool>,
    vocabulary: Arc<dyn StatusVocabularySource>,
}

impl SqliteCatalogRepository {
    pub fn new(
        kind: EntryKind,
        pool: Arc<ConnectionPool>,
        vocabulary: Arc<dyn StatusVocabularySource>,
    ) -> Self {
        Self {
            kind,
            tables: Tables::for_kind(kind),
            pool,
            vocabulary,
        }
    }

    /// Map a base row to a record. Statuses are filled in separately.
    fn row_to_record(row: &Row) -> Result<EntryRecord, rusqlite::Error> {
        Ok(EntryRecord {
            key: row.get("key")?,
            title: row.get("title")?,
            author: row.get("author")?,
            cover_url: row.get("cover_url")?,
            rating: row.get("rating")?,
            user_statuses: Vec::new(),
            added_timestamp: row.get("added_timestamp")?,
        })
    }

    fn status_id(&self, conn: &Connection, name: &str) -> AppResult<Option<i64>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT id FROM {} WHERE name = ?1",
            self.tables.status
        ))?;

        match stmt.query_row(params![name], |row| row.get(0)) {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn status_names(&self, conn: &Connection, key: &str) -> AppResult<Vec<String>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT s.name FROM {status} s
             JOIN {link} l ON s.id = l.status_id
             WHERE l.entry_key = ?1
             ORDER BY s.id",
            status = self.tables.status,
            link = self.tables.link
        ))?;

        let names = stmt
            .query_map(params![key], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(names)
    }

    /// Upsert the base row and regenerate its links.
    /// Any error leaves the transaction uncommitted.
    fn write_entry(&self, tx: &Transaction, entry: &CatalogEntry) -> AppResult<()> {
        tx.execute(
            &format!(
                "INSERT INTO {} (key, title, author, cover_url, rating, added_timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(key) DO UPDATE SET
                    title = excluded.title,
                    author = excluded.author,
                    cover_url = excluded.cover_url,
                    rating = excluded.rating,
                    added_timestamp = excluded.added_timestamp",
                self.tables.entry
            ),
            params![
                entry.key(),
                entry.title(),
                entry.author(),
                entry.cover_url(),
                entry.rating(),
                entry.added_timestamp(),
            ],
        )?;

        tx.execute(
            &format!("DELETE FROM {} WHERE entry_key = ?1", self.tables.link),
            params![entry.key()],
        )?;

        let mut insert = tx.prepare(&format!(
            "INSERT INTO {} (entry_key, status_id) VALUES (?1, ?2)",
            self.tables.link
        ))?;

        for name in entry.user_statuses() {
            let status_id = self.status_id(tx, name)?.ok_or_else(|| {
                AppError::StorageConsistency(format!(
                    "Status '{}' for {} '{}' is not in table '{}'",
                    name,
                    self.kind,
                    entry.key(),
                    self.tables.status
                ))
            })?;
            insert.execute(params![entry.key(), status_id])?;
        }

        Ok(())
    }

    fn hydrate(
        &self,
        record: EntryRecord,
        vocabulary: &StatusVocabulary,
    ) -> Result<CatalogEntry, (String, crate::domain::DomainError)> {
        let key = record.key.clone();
        CatalogEntry::from_record(self.kind, record, vocabulary).map_err(|e| (key, e))
    }
}

impl CatalogRepository for SqliteCatalogRepository {
    fn kind(&self) -> EntryKind {
        self.kind
    }

    fn fetch_allowed_statuses(&self) -> AppResult<StatusVocabulary> {
        self.vocabulary.fetch_allowed_statuses(self.kind)
    }

    fn find_all(&self, filter: &EntryFilter) -> AppResult<Vec<CatalogEntry>> {
        let vocabulary = self.fetch_allowed_statuses()?;

        if let Some(status) = filter.status() {
            if !vocabulary.contains(status) {
                log::warn!(
                    "find_all: {} status filter '{}' is not in the vocabulary",
                    self.kind,
                    status
                );
                return Ok(Vec::new());
            }
        }

        let conn = get_connection(&self.pool)?;

        let rows: Vec<rusqlite::Result<EntryRecord>> = match filter.status() {
            Some(status) => {
                let Some(status_id) = self.status_id(&conn, status)? else {
                    log::warn!(
                        "find_all: {} status '{}' not found in table '{}'",
                        self.kind,
                        status,
                        self.tables.status
                    );
                    return Ok(Vec::new());
                };

                let mut stmt = conn.prepare(&format!(
                    "SELECT e.key, e.title, e.author, e.cover_url, e.rating, e.added_timestamp
                     FROM {entry} e
                     JOIN {link} l ON e.key = l.entry_key
                     WHERE l.status_id = ?1
                     ORDER BY e.added_timestamp DESC, e.key",
                    entry = self.tables.entry,
                    link = self.tables.link
                ))?;
                let rows = stmt.query_map(params![status_id], Self::row_to_record)?.collect();
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT key, title, author, cover_url, rating, added_timestamp
                     FROM {}
                     ORDER BY added_timestamp DESC, key",
                    self.tables.entry
                ))?;
                let rows = stmt.query_map([], Self::row_to_record)?.collect();
                rows
            }
        };

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let mut record = match row {
                Ok(record) => record,
                Err(e) => {
                    log::warn!("Skipping unreadable {} row: {}", self.kind, e);
                    continue;
                }
            };
            record.user_statuses = self.status_names(&conn, &record.key)?;

            match self.hydrate(record, &vocabulary) {
                Ok(entry) => entries.push(entry),
                Err((key, e)) => {
                    log::warn!("Skipping invalid {} '{}' from database: {}", self.kind, key, e);
                }
            }
        }

        Ok(entries)
    }

    fn find_by_key(&self, key: &str) -> AppResult<Option<CatalogEntry>> {
        let vocabulary = self.fetch_allowed_statuses()?;
        let conn = get_connection(&self.pool)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT key, title, author, cover_url, rating, added_timestamp
             FROM {} WHERE key = ?1",
            self.tables.entry
        ))?;

        let mut record = match stmt.query_row(params![key], Self::row_to_record) {
            Ok(record) => record,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e @ rusqlite::Error::InvalidColumnType(..))
            | Err(e @ rusqlite::Error::FromSqlConversionFailure(..)) => {
                return Err(AppError::StorageConsistency(format!(
                    "Stored {} '{}' is unreadable: {}",
                    self.kind, key, e
                )));
            }
            Err(e) => return Err(AppError::Database(e)),
        };
        record.user_statuses = self.status_names(&conn, key)?;

        match self.hydrate(record, &vocabulary) {
            Ok(entry) => Ok(Some(entry)),
            Err((_, e)) => {
                log::error!("Failed to hydrate {} '{}' from database: {}", self.kind, key, e);
                Err(AppError::StorageConsistency(format!(
                    "Stored {} '{}' is inconsistent: {}",
                    self.kind, key, e
                )))
            }
        }
    }

    fn exists(&self, key: &str) -> AppResult<bool> {
        let conn = get_connection(&self.pool)?;

        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE key = ?1", self.tables.entry),
            params![key],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    fn save(&self, entry: &CatalogEntry) -> AppResult<()> {
        if entry.kind() != self.kind {
            return Err(AppError::StorageConsistency(format!(
                "Cannot save {} '{}' into the {} catalog",
                entry.kind(),
                entry.key(),
                self.kind
            )));
        }

        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;

        // Dropping an uncommitted transaction rolls it back
        if let Err(e) = self.write_entry(&tx, entry) {
            log::error!("Rolled back save of {} '{}': {}", self.kind, entry.key(), e);
            return Err(e);
        }

        tx.commit()?;
        log::debug!("Saved {} '{}'", self.kind, entry.key());
        Ok(())
    }

    fn delete_by_key(&self, key: &str) -> AppResult<bool> {
        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;

        tx.execute(
            &format!("DELETE FROM {} WHERE entry_key = ?1", self.tables.link),
            params![key],
        )?;
        let removed = tx.execute(
            &format!("DELETE FROM {} WHERE key = ?1", self.tables.entry),
            params![key],
        )?;

        tx.commit()?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_memory_pool, initialize_database};
    use crate::repositories::{FixedStatusVocabulary, SqliteStatusVocabulary};

    fn setup() -> (Arc<ConnectionPool>, SqliteCatalogRepository) {
        let pool = Arc::new(create_memory_pool().unwrap());
        {
            let conn = pool.get().unwrap();
            initialize_database(&conn).unwrap();
        }
        let vocabulary = Arc::new(SqliteStatusVocabulary::new(pool.clone()));
        let repo = SqliteCatalogRepository::new(EntryKind::Book, pool.clone(), vocabulary);
        (pool, repo)
    }

    fn book(key: &str, statuses: &[&str], added: i64) -> CatalogEntry {
        let vocabulary = StatusVocabulary::new(["owned", "read", "reading", "wishlist"]);
        CatalogEntry::new(
            EntryKind::Book,
            EntryRecord {
                key: key.to_string(),
                title: format!("Title {}", key),
                author: Some("Author".to_string()),
                cover_url: Some("http://covers/x.jpg".to_string()),
                rating: Some(3.5),
                user_statuses: statuses.iter().map(|s| s.to_string()).collect(),
                added_timestamp: Some(added),
            },
            &vocabulary,
        )
        .unwrap()
    }

    fn link_count(pool: &ConnectionPool, key: &str) -> i64 {
        let conn = pool.get().unwrap();
        conn.query_row(
            "SELECT COUNT(*) FROM book_has_status WHERE entry_key = ?1",
            params![key],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_save_then_find() {
        let (_pool, repo) = setup();
        let entry = book("111", &["owned", "read"], 100);

        repo.save(&entry).unwrap();

        let found = repo.find_by_key("111").unwrap().unwrap();
        assert_eq!(found, entry);
        assert!(repo.exists("111").unwrap());
    }

    #[test]
    fn test_find_missing_is_none() {
        let (_pool, repo) = setup();
        assert!(repo.find_by_key("nope").unwrap().is_none());
        assert!(!repo.exists("nope").unwrap());
    }

    #[test]
    fn test_save_replaces_links() {
        let (pool, repo) = setup();
        repo.save(&book("111", &["owned"], 100)).unwrap();
        repo.save(&book("111", &["read"], 100)).unwrap();

        let found = repo.find_by_key("111").unwrap().unwrap();
        assert_eq!(found.user_statuses().iter().collect::<Vec<_>>(), vec!["read"]);
        assert_eq!(link_count(&pool, "111"), 1);
    }

    #[test]
    fn test_unresolvable_status_rolls_back() {
        let (pool, repo) = setup();
        let original = book("111", &["owned"], 100);
        repo.save(&original).unwrap();

        let lenient = FixedStatusVocabulary::new()
            .with(EntryKind::Book, StatusVocabulary::new(["owned", "lent"]));
        let mut changed = CatalogEntry::new(
            EntryKind::Book,
            EntryRecord {
                title: "Changed".to_string(),
                user_statuses: vec!["lent".to_string()],
                ..original.to_record()
            },
            &lenient.fetch_allowed_statuses(EntryKind::Book).unwrap(),
        )
        .unwrap();
        changed.set_rating(Some(1.0)).unwrap();

        let result = repo.save(&changed);
        assert!(matches!(result, Err(AppError::StorageConsistency(_))));

        let stored = repo.find_by_key("111").unwrap().unwrap();
        assert_eq!(stored, original);
        assert_eq!(link_count(&pool, "111"), 1);
    }

    #[test]
    fn test_failed_insert_leaves_no_row() {
        let (_pool, repo) = setup();
        let lenient = StatusVocabulary::new(["lent"]);
        let entry = CatalogEntry::new(
            EntryKind::Book,
            EntryRecord {
                key: "222".to_string(),
                title: "Borrowed".to_string(),
                user_statuses: vec!["lent".to_string()],
                ..Default::default()
            },
            &lenient,
        )
        .unwrap();

        assert!(repo.save(&entry).is_err());
        assert!(!repo.exists("222").unwrap());
    }

    #[test]
    fn test_delete_removes_entry_and_links() {
        let (pool, repo) = setup();
        repo.save(&book("111", &["owned", "read"], 100)).unwrap();

        assert!(repo.delete_by_key("111").unwrap());
        assert!(repo.find_by_key("111").unwrap().is_none());
        assert_eq!(link_count(&pool, "111"), 0);
    }

    #[test]
    fn test_delete_missing_returns_false() {
        let (_pool, repo) = setup();
        repo.save(&book("111", &["owned"], 100)).unwrap();

        assert!(!repo.delete_by_key("999").unwrap());
        assert_eq!(repo.find_all(&EntryFilter::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_find_all_orders_newest_first_and_filters() {
        let (_pool, repo) = setup();
        repo.save(&book("a", &["owned"], 100)).unwrap();
        repo.save(&book("b", &["read"], 300)).unwrap();
        repo.save(&book("c", &["owned", "read"], 200)).unwrap();

        let all = repo.find_all(&EntryFilter::default()).unwrap();
        let keys: Vec<&str> = all.iter().map(|e| e.key()).collect();
        assert_eq!(keys, vec!["b", "c", "a"]);

        let owned = repo.find_by_user_status("owned").unwrap();
        let keys: Vec<&str> = owned.iter().map(|e| e.key()).collect();
        assert_eq!(keys, vec!["c", "a"]);
        // Filtered rows still carry their full status set
        assert_eq!(owned[0].user_statuses().len(), 2);
    }

    #[test]
    fn test_unknown_status_filter_is_empty() {
        let (_pool, repo) = setup();
        repo.save(&book("a", &["owned"], 100)).unwrap();

        let result = repo
            .find_all(&EntryFilter::with_status("nonexistent_status"))
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_corrupt_row_skipped_in_listing_but_fails_targeted_fetch() {
        let (pool, repo) = setup();
        repo.save(&book("good", &["owned"], 100)).unwrap();
        {
            let conn = pool.get().unwrap();
            conn.execute(
                "INSERT INTO book (key, title, rating, added_timestamp) VALUES ('bad', 'Bad', 0.3, 50)",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO book_has_status (entry_key, status_id) VALUES ('bad', 1)",
                [],
            )
            .unwrap();
        }

        let all = repo.find_all(&EntryFilter::default()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].key(), "good");

        assert!(matches!(
            repo.find_by_key("bad"),
            Err(AppError::StorageConsistency(_))
        ));
    }

    #[test]
    fn test_entry_without_links_is_corrupt() {
        let (pool, repo) = setup();
        {
            let conn = pool.get().unwrap();
            conn.execute(
                "INSERT INTO book (key, title, added_timestamp) VALUES ('bare', 'Bare', 10)",
                [],
            )
            .unwrap();
        }

        assert!(repo.find_all(&EntryFilter::default()).unwrap().is_empty());
        assert!(repo.find_by_key("bare").is_err());
        assert!(repo.exists("bare").unwrap());
    }

    #[test]
    fn test_kinds_are_isolated() {
        let (pool, books) = setup();
        let vocabulary = Arc::new(SqliteStatusVocabulary::new(pool.clone()));
        let movies = SqliteCatalogRepository::new(EntryKind::Movie, pool.clone(), vocabulary);

        books.save(&book("111", &["owned"], 100)).unwrap();
        assert!(movies.find_by_key("111").unwrap().is_none());
        assert!(movies.save(&book("111", &["owned"], 100)).is_err());
    }
}
