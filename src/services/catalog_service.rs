// src/services/catalog_service.rs
//
// Catalog Service - Entry use cases for one entry kind
//
// RULES:
// - Sequences repository calls and entry mutation, nothing more
// - The vocabulary is fetched fresh for every validating call
// - Keys are unique: add never overwrites, updates never create

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::entry::invariants::validate_key;
use crate::domain::{CatalogEntry, EntryKind, EntryRecord, StatusVocabulary};
use crate::error::{AppError, AppResult};
use crate::repositories::{CatalogRepository, EntryFilter};

/// Request to change (or clear) an entry's rating
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRatingRequest {
    #[serde(alias = "isbn")]
    pub key: String,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Request to replace an entry's status set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserStatusesRequest {
    #[serde(alias = "isbn")]
    pub key: String,
    pub user_statuses: Vec<String>,
}

pub struct CatalogService {
    repository: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        Self { repository }
    }

    pub fn kind(&self) -> EntryKind {
        self.repository.kind()
    }

    /// Add a new entry
    ///
    /// Fails with `Conflict` if the key is already cataloged; the stored
    /// entry is left untouched.
    pub fn add_entry(&self, record: EntryRecord) -> AppResult<CatalogEntry> {
        validate_key(&record.key)?;

        let vocabulary = self.repository.fetch_allowed_statuses()?;
        let entry = CatalogEntry::new(self.kind(), record, &vocabulary)?;

        if self.repository.exists(entry.key())? {
            return Err(AppError::Conflict(format!(
                "{} with key {} already exists",
                self.kind(),
                entry.key()
            )));
        }

        self.repository.save(&entry)?;
        log::info!("Added {}", entry);
        Ok(entry)
    }

    /// Delete an entry by key
    pub fn delete_entry(&self, key: &str) -> AppResult<bool> {
        validate_key(key)?;

        if !self.repository.exists(key)? {
            return Err(self.not_found(key));
        }

        let deleted = self.repository.delete_by_key(key)?;
        log::info!("Deleted {} {}", self.kind(), key);
        Ok(deleted)
    }

    /// Set or clear the rating of an existing entry
    pub fn update_rating(&self, request: UpdateRatingRequest) -> AppResult<CatalogEntry> {
        validate_key(&request.key)?;

        let mut entry = self
            .repository
            .find_by_key(&request.key)?
            .ok_or_else(|| self.not_found(&request.key))?;

        entry.set_rating(request.rating)?;
        self.repository.save(&entry)?;

        log::info!("Updated rating of {} to {:?}", entry, entry.rating());
        Ok(entry)
    }

    /// Replace the status set of an existing entry
    pub fn update_user_statuses(
        &self,
        request: UpdateUserStatusesRequest,
    ) -> AppResult<CatalogEntry> {
        validate_key(&request.key)?;

        let vocabulary = self.repository.fetch_allowed_statuses()?;
        let mut entry = self
            .repository
            .find_by_key(&request.key)?
            .ok_or_else(|| self.not_found(&request.key))?;

        entry.set_user_statuses(request.user_statuses, &vocabulary)?;
        self.repository.save(&entry)?;

        log::info!("Updated statuses of {} to {:?}", entry, entry.user_statuses());
        Ok(entry)
    }

    pub fn list_entries(&self, filter: &EntryFilter) -> AppResult<Vec<CatalogEntry>> {
        let entries = self.repository.find_all(filter)?;
        log::debug!("Listed {} {} entries", entries.len(), self.kind());
        Ok(entries)
    }

    pub fn get_entry(&self, key: &str) -> AppResult<Option<CatalogEntry>> {
        self.repository.find_by_key(key)
    }

    pub fn allowed_statuses(&self) -> AppResult<StatusVocabulary> {
        self.repository.fetch_allowed_statuses()
    }

    fn not_found(&self, key: &str) -> AppError {
        AppError::NotFound(format!("{} with key {} not found", self.kind(), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::repositories::MockCatalogRepository;
    use mockall::predicate::eq;

    fn vocabulary() -> StatusVocabulary {
        StatusVocabulary::new(["owned", "read", "wishlist"])
    }

    fn record(key: &str) -> EntryRecord {
        EntryRecord {
            key: key.to_string(),
            title: "Dune".to_string(),
            user_statuses: vec!["owned".to_string()],
            added_timestamp: Some(1_000),
            ..Default::default()
        }
    }

    fn stored(key: &str) -> CatalogEntry {
        CatalogEntry::new(EntryKind::Book, record(key), &vocabulary()).unwrap()
    }

    fn mock_repo() -> MockCatalogRepository {
        let mut repo = MockCatalogRepository::new();
        repo.expect_kind().return_const(EntryKind::Book);
        repo.expect_fetch_allowed_statuses()
            .returning(|| Ok(vocabulary()));
        repo
    }

    #[test]
    fn test_add_entry_saves_new_entry() {
        let mut repo = mock_repo();
        repo.expect_exists().with(eq("123")).returning(|_| Ok(false));
        repo.expect_save()
            .withf(|entry| entry.key() == "123" && entry.has_status("owned"))
            .times(1)
            .returning(|_| Ok(()));

        let service = CatalogService::new(Arc::new(repo));
        let entry = service.add_entry(record("123")).unwrap();
        assert_eq!(entry.title(), "Dune");
    }

    #[test]
    fn test_add_existing_key_conflicts_without_saving() {
        let mut repo = mock_repo();
        repo.expect_exists().returning(|_| Ok(true));
        repo.expect_save().never();

        let service = CatalogService::new(Arc::new(repo));
        assert!(matches!(
            service.add_entry(record("123")),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_add_invalid_entry_is_validation_error() {
        let mut repo = mock_repo();
        repo.expect_exists().never();
        repo.expect_save().never();

        let service = CatalogService::new(Arc::new(repo));

        let mut data = record("123");
        data.user_statuses = vec!["borrowed".to_string()];
        assert!(matches!(
            service.add_entry(data),
            Err(AppError::Validation(DomainError::UnknownStatus { .. }))
        ));

        assert!(matches!(
            service.add_entry(record("")),
            Err(AppError::Validation(DomainError::EmptyKey))
        ));
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let mut repo = mock_repo();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_delete_by_key().never();

        let service = CatalogService::new(Arc::new(repo));
        assert!(matches!(
            service.delete_entry("404"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_existing() {
        let mut repo = mock_repo();
        repo.expect_exists().returning(|_| Ok(true));
        repo.expect_delete_by_key()
            .with(eq("123"))
            .times(1)
            .returning(|_| Ok(true));

        let service = CatalogService::new(Arc::new(repo));
        assert!(service.delete_entry("123").unwrap());
    }

    #[test]
    fn test_update_rating() {
        let mut repo = mock_repo();
        repo.expect_find_by_key()
            .returning(|key| Ok(Some(stored(key))));
        repo.expect_save()
            .withf(|entry| entry.rating() == Some(2.5))
            .times(1)
            .returning(|_| Ok(()));

        let service = CatalogService::new(Arc::new(repo));
        let entry = service
            .update_rating(UpdateRatingRequest {
                key: "123".to_string(),
                rating: Some(2.5),
            })
            .unwrap();
        assert_eq!(entry.rating(), Some(2.5));
    }

    #[test]
    fn test_invalid_rating_is_not_saved() {
        let mut repo = mock_repo();
        repo.expect_find_by_key()
            .returning(|key| Ok(Some(stored(key))));
        repo.expect_save().never();

        let service = CatalogService::new(Arc::new(repo));
        let result = service.update_rating(UpdateRatingRequest {
            key: "123".to_string(),
            rating: Some(5.5),
        });
        assert!(matches!(
            result,
            Err(AppError::Validation(DomainError::InvalidRating(_)))
        ));
    }

    #[test]
    fn test_update_rating_on_missing_entry() {
        let mut repo = mock_repo();
        repo.expect_find_by_key().returning(|_| Ok(None));
        repo.expect_save().never();

        let service = CatalogService::new(Arc::new(repo));
        let result = service.update_rating(UpdateRatingRequest {
            key: "404".to_string(),
            rating: None,
        });
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_update_user_statuses_replaces_set() {
        let mut repo = mock_repo();
        repo.expect_find_by_key()
            .returning(|key| Ok(Some(stored(key))));
        repo.expect_save()
            .withf(|entry| {
                entry.user_statuses().iter().collect::<Vec<_>>() == vec!["read", "wishlist"]
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = CatalogService::new(Arc::new(repo));
        let entry = service
            .update_user_statuses(UpdateUserStatusesRequest {
                key: "123".to_string(),
                user_statuses: vec![
                    "wishlist".to_string(),
                    "read".to_string(),
                    "read".to_string(),
                ],
            })
            .unwrap();
        assert!(!entry.has_status("owned"));
    }

    #[test]
    fn test_update_user_statuses_rejects_empty_set() {
        let mut repo = mock_repo();
        repo.expect_find_by_key()
            .returning(|key| Ok(Some(stored(key))));
        repo.expect_save().never();

        let service = CatalogService::new(Arc::new(repo));
        let result = service.update_user_statuses(UpdateUserStatusesRequest {
            key: "123".to_string(),
            user_statuses: vec![],
        });
        assert!(matches!(
            result,
            Err(AppError::Validation(DomainError::EmptyStatuses))
        ));
    }

    #[test]
    fn test_list_passes_filter_through() {
        let mut repo = mock_repo();
        repo.expect_find_all()
            .withf(|filter| filter.status() == Some("read"))
            .returning(|_| Ok(vec![stored("1"), stored("2")]));

        let service = CatalogService::new(Arc::new(repo));
        let entries = service
            .list_entries(&EntryFilter::with_status("read"))
            .unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_request_accepts_isbn_alias() {
        let request: UpdateRatingRequest =
            serde_json::from_str(r#"{"isbn":"978","rating":null}"#).unwrap();
        assert_eq!(request.key, "978");
        assert_eq!(request.rating, None);
    }
}
