// src/repositories/json_file_repository.rs
//
// Flat-file catalog persistence
//
// The whole catalog of one kind is a single JSON array. Every operation
// reads the file, and writes replace it as a whole (temp file + rename),
// so a single update is atomic. There is no locking: concurrent writers
// will lose updates, callers must serialize access to one file.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::{CatalogEntry, EntryKind, StatusVocabulary};
use crate::error::{AppError, AppResult};
use crate::repositories::{CatalogRepository, EntryFilter, StatusVocabularySource};

pub struct JsonFileCatalogRepository {
    kind: EntryKind,
    path: PathBuf,
    vocabulary: Arc<dyn StatusVocabularySource>,
}

impl JsonFileCatalogRepository {
    /// Open (or create as `[]`) the library file at `path`
    pub fn new(
        kind: EntryKind,
        path: impl Into<PathBuf>,
        vocabulary: Arc<dyn StatusVocabularySource>,
    ) -> AppResult<Self> {
        let path = path.into();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|e| {
                        AppError::StorageConsistency(format!(
                            "Failed to create library directory {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
            }
            fs::write(&path, "[]").map_err(|e| {
                AppError::StorageConsistency(format!(
                    "Failed to create library file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            log::info!("Created {} library file {}", kind, path.display());
        }

        Ok(Self {
            kind,
            path,
            vocabulary,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Key of a raw stored record (`key`, or the legacy `isbn` field).
    /// Numeric keys written by hand are read as their decimal text.
    fn record_key(value: &Value) -> Option<String> {
        match value.get("key").or_else(|| value.get("isbn"))? {
            Value::String(key) => Some(key.clone()),
            Value::Number(key) => Some(key.to_string()),
            _ => None,
        }
    }

    fn has_key(value: &Value, key: &str) -> bool {
        Self::record_key(value).as_deref() == Some(key)
    }

    fn read_document(&self) -> AppResult<Value> {
        let json = fs::read_to_string(&self.path).map_err(|e| {
            AppError::StorageConsistency(format!(
                "Library file is not readable: {}: {}",
                self.path.display(),
                e
            ))
        })?;

        serde_json::from_str(&json).map_err(|e| {
            AppError::StorageConsistency(format!(
                "Error decoding JSON from library file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Items for reading. A document that is not an array reads as empty.
    fn read_data(&self) -> AppResult<Vec<Value>> {
        match self.read_document()? {
            Value::Array(items) => Ok(items),
            other => {
                log::warn!(
                    "Library file {} holds a JSON {} instead of an array, treating as empty",
                    self.path.display(),
                    json_type_name(&other)
                );
                Ok(Vec::new())
            }
        }
    }

    /// Items for a read-modify-write. A document that is not an array is
    /// never overwritten.
    fn read_data_for_write(&self) -> AppResult<Vec<Value>> {
        match self.read_document()? {
            Value::Array(items) => Ok(items),
            other => Err(AppError::StorageConsistency(format!(
                "Library file {} holds a JSON {} instead of an array, refusing to overwrite it",
                self.path.display(),
                json_type_name(&other)
            ))),
        }
    }

    fn write_data(&self, items: &[Value]) -> AppResult<()> {
        let json = serde_json::to_string_pretty(items)?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, json)
            .and_then(|_| fs::rename(&tmp_path, &self.path))
            .map_err(|e| {
                AppError::StorageConsistency(format!(
                    "Failed to write to library file {}: {}",
                    self.path.display(),
                    e
                ))
            })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl CatalogRepository for JsonFileCatalogRepository {
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

        let mut entries = Vec::new();
        for item in self.read_data()? {
            let key = Self::record_key(&item).unwrap_or_else(|| "<missing>".to_string());
            match CatalogEntry::from_value(self.kind, item, &vocabulary) {
                Ok(entry) => {
                    let matches = match filter.status() {
                        Some(status) => entry.has_status(status),
                        None => true,
                    };
                    if matches {
                        entries.push(entry);
                    }
                }
                Err(e) => {
                    log::warn!("Skipping corrupted {} '{}' in library file: {}", self.kind, key, e);
                }
            }
        }

        entries.sort_by(|a, b| {
            b.added_timestamp()
                .cmp(&a.added_timestamp())
                .then_with(|| a.key().cmp(b.key()))
        });

        Ok(entries)
    }

    fn find_by_key(&self, key: &str) -> AppResult<Option<CatalogEntry>> {
        let vocabulary = self.fetch_allowed_statuses()?;

        let Some(item) = self
            .read_data()?
            .into_iter()
            .find(|item| Self::has_key(item, key))
        else {
            return Ok(None);
        };

        CatalogEntry::from_value(self.kind, item, &vocabulary)
            .map(Some)
            .map_err(|e| {
                log::error!("Failed to hydrate {} '{}' from library file: {}", self.kind, key, e);
                AppError::StorageConsistency(format!(
                    "Stored {} '{}' is inconsistent: {}",
                    self.kind, key, e
                ))
            })
    }

    fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self
            .read_data()?
            .iter()
            .any(|item| Self::has_key(item, key)))
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

        let mut items = self.read_data_for_write()?;
        let value = serde_json::to_value(entry.to_record())?;

        match items
            .iter_mut()
            .find(|item| Self::has_key(item, entry.key()))
        {
            Some(existing) => *existing = value,
            None => items.push(value),
        }

        self.write_data(&items)?;
        log::debug!("Saved {} '{}' to {}", self.kind, entry.key(), self.path.display());
        Ok(())
    }

    fn delete_by_key(&self, key: &str) -> AppResult<bool> {
        let mut items = self.read_data_for_write()?;
        let initial_count = items.len();

        items.retain(|item| !Self::has_key(item, key));

        if items.len() < initial_count {
            self.write_data(&items)?;
            return Ok(true);
        }
        Ok(false)
    }
}
