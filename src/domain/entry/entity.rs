use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::invariants::{
    normalize_user_statuses, validate_added_timestamp, validate_entry, validate_rating,
};
use crate::domain::{DomainError, DomainResult, EntryKind, StatusVocabulary};

/// Plain key-value representation of a catalog entry.
///
/// This is both the raw input accepted by the use cases and the shape
/// produced by `CatalogEntry::to_record`. `isbn` is accepted as an alias
/// of `key` on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    #[serde(alias = "isbn", default)]
    pub key: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub cover_url: Option<String>,

    #[serde(default)]
    pub rating: Option<f64>,

    #[serde(default)]
    pub user_statuses: Vec<String>,

    #[serde(default)]
    pub added_timestamp: Option<i64>,
}

/// A book or movie in the user's catalog
///
/// Fields are private: the only ways to change an entry after
/// construction are the validating setters below.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Book or movie
    kind: EntryKind,

    /// Unique catalog identifier (ISBN for books), immutable
    key: String,

    title: String,

    author: Option<String>,

    /// Not validated as a URL
    cover_url: Option<String>,

    /// Half-point rating in [0.5, 5.0], None means unrated
    rating: Option<f64>,

    /// Non-empty set of vocabulary statuses
    user_statuses: BTreeSet<String>,

    /// Epoch seconds
    added_timestamp: i64,
}

impl CatalogEntry {
    /// Create a new CatalogEntry
    /// This is the only way to construct a valid entry. `added_timestamp`
    /// defaults to now when the record carries none.
    pub fn new(
        kind: EntryKind,
        record: EntryRecord,
        vocabulary: &StatusVocabulary,
    ) -> DomainResult<Self> {
        let entry = Self {
            kind,
            key: record.key,
            title: record.title,
            author: record.author,
            cover_url: record.cover_url,
            rating: record.rating,
            user_statuses: record.user_statuses.into_iter().collect(),
            added_timestamp: record
                .added_timestamp
                .unwrap_or_else(|| Utc::now().timestamp()),
        };

        validate_entry(&entry, vocabulary)?;
        Ok(entry)
    }

    /// Rebuild an entry from its record form. Runs the full validation,
    /// so stored data is never trusted as-is.
    pub fn from_record(
        kind: EntryKind,
        record: EntryRecord,
        vocabulary: &StatusVocabulary,
    ) -> DomainResult<Self> {
        Self::new(kind, record, vocabulary)
    }

    /// Hydrate from an untyped JSON map
    pub fn from_value(
        kind: EntryKind,
        value: serde_json::Value,
        vocabulary: &StatusVocabulary,
    ) -> DomainResult<Self> {
        let record: EntryRecord = serde_json::from_value(value)
            .map_err(|e| DomainError::MalformedRecord(e.to_string()))?;
        Self::from_record(kind, record, vocabulary)
    }

    pub fn to_record(&self) -> EntryRecord {
        EntryRecord {
            key: self.key.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            cover_url: self.cover_url.clone(),
            rating: self.rating,
            user_statuses: self.user_statuses.iter().cloned().collect(),
            added_timestamp: Some(self.added_timestamp),
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.cover_url.as_deref()
    }

    pub fn rating(&self) -> Option<f64> {
        self.rating
    }

    pub fn user_statuses(&self) -> &BTreeSet<String> {
        &self.user_statuses
    }

    pub fn has_status(&self, status: &str) -> bool {
        self.user_statuses.contains(status)
    }

    pub fn added_timestamp(&self) -> i64 {
        self.added_timestamp
    }

    /// Update the rating. The entry is left untouched on error.
    pub fn set_rating(&mut self, rating: Option<f64>) -> DomainResult<()> {
        validate_rating(rating)?;
        self.rating = rating;
        Ok(())
    }

    /// Replace the status set, validated against the vocabulary current
    /// at call time. Duplicates collapse.
    pub fn set_user_statuses(
        &mut self,
        statuses: Vec<String>,
        vocabulary: &StatusVocabulary,
    ) -> DomainResult<()> {
        self.user_statuses = normalize_user_statuses(statuses, vocabulary)?;
        Ok(())
    }

    /// Overwrite the added timestamp. Negative values are rejected.
    pub fn set_added_timestamp(&mut self, timestamp: i64) -> DomainResult<()> {
        validate_added_timestamp(timestamp)?;
        self.added_timestamp = timestamp;
        Ok(())
    }
}

impl Serialize for CatalogEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_record().serialize(serializer)
    }
}

impl std::fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}' ({})", self.kind, self.title, self.key)
    }
}
