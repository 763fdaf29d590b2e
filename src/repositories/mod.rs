// src/repositories/mod.rs
//
// Repository layer
//
// RULES:
// - Repositories translate between storage and validated entries
// - Every hydrated entry goes through CatalogEntry validation
// - Bulk reads skip invalid records, targeted reads fail on them
// - Writes are all-or-nothing per entry

pub mod json_file_repository;
pub mod sqlite;
pub mod vocabulary_repository;

pub use json_file_repository::JsonFileCatalogRepository;
pub use sqlite::SqliteCatalogRepository;
pub use vocabulary_repository::{
    FixedStatusVocabulary, SqliteStatusVocabulary, StatusVocabularySource,
};

#[cfg(test)]
pub use vocabulary_repository::MockStatusVocabularySource;

use serde::{Deserialize, Serialize};

use crate::domain::{CatalogEntry, EntryKind, StatusVocabulary};
use crate::error::AppResult;

/// Listing filters
///
/// A blank `user_status` means no filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFilter {
    #[serde(default)]
    pub user_status: Option<String>,
}

impl EntryFilter {
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            user_status: Some(status.into()),
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.user_status
            .as_deref()
            .filter(|status| !status.trim().is_empty())
    }
}

// ---------------------------------------------------------------------
// Repository contract (one instance per entry kind)
// ---------------------------------------------------------------------
#[cfg_attr(test, mockall::automock)]
pub trait CatalogRepository: Send + Sync {
    fn kind(&self) -> EntryKind;

    /// Current vocabulary for this repository's kind, never cached
    fn fetch_allowed_statuses(&self) -> AppResult<StatusVocabulary>;

    /// Entries ordered newest first. A status filter outside the
    /// vocabulary yields an empty list.
    fn find_all(&self, filter: &EntryFilter) -> AppResult<Vec<CatalogEntry>>;

    fn find_by_user_status(&self, status: &str) -> AppResult<Vec<CatalogEntry>> {
        self.find_all(&EntryFilter::with_status(status))
    }

    /// `None` means not found. A stored record that fails validation is
    /// a `StorageConsistency` error.
    fn find_by_key(&self, key: &str) -> AppResult<Option<CatalogEntry>>;

    /// Raw existence check, no hydration
    fn exists(&self, key: &str) -> AppResult<bool>;

    /// Upsert the entry and replace its status set
    fn save(&self, entry: &CatalogEntry) -> AppResult<()>;

    /// True iff an entry was removed
    fn delete_by_key(&self, key: &str) -> AppResult<bool>;
}
