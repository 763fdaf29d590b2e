use std::collections::BTreeSet;

use super::entity::CatalogEntry;
use crate::domain::{DomainError, DomainResult, StatusVocabulary};

pub const MIN_RATING: f64 = 0.5;
pub const MAX_RATING: f64 = 5.0;

/// Validates all CatalogEntry invariants against the given vocabulary
pub fn validate_entry(entry: &CatalogEntry, vocabulary: &StatusVocabulary) -> DomainResult<()> {
    validate_key(entry.key())?;
    validate_title(entry.title())?;
    validate_rating(entry.rating())?;
    validate_user_statuses(entry.user_statuses(), vocabulary)?;
    validate_added_timestamp(entry.added_timestamp())?;
    Ok(())
}

/// Key cannot be empty
pub fn validate_key(key: &str) -> DomainResult<()> {
    if key.trim().is_empty() {
        return Err(DomainError::EmptyKey);
    }
    Ok(())
}

/// Title cannot be empty
pub fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::EmptyTitle);
    }
    Ok(())
}

/// Rating is either absent or a half-point value in [0.5, 5.0]
pub fn validate_rating(rating: Option<f64>) -> DomainResult<()> {
    match rating {
        None => Ok(()),
        Some(r)
            if r.is_finite()
                && (MIN_RATING..=MAX_RATING).contains(&r)
                && (r * 2.0).fract() == 0.0 =>
        {
            Ok(())
        }
        Some(r) => Err(DomainError::InvalidRating(r)),
    }
}

/// Status set is non-empty and drawn from the vocabulary
pub fn validate_user_statuses(
    statuses: &BTreeSet<String>,
    vocabulary: &StatusVocabulary,
) -> DomainResult<()> {
    if statuses.is_empty() {
        return Err(DomainError::EmptyStatuses);
    }
    if let Some(unknown) = statuses.iter().find(|s| !vocabulary.contains(s)) {
        return Err(DomainError::UnknownStatus {
            status: unknown.clone(),
            allowed: vocabulary.to_string(),
        });
    }
    Ok(())
}

/// Collapse duplicates and validate the result
pub fn normalize_user_statuses(
    statuses: Vec<String>,
    vocabulary: &StatusVocabulary,
) -> DomainResult<BTreeSet<String>> {
    let set: BTreeSet<String> = statuses.into_iter().collect();
    validate_user_statuses(&set, vocabulary)?;
    Ok(set)
}

/// Timestamps are epoch seconds and never negative
pub fn validate_added_timestamp(timestamp: i64) -> DomainResult<()> {
    if timestamp < 0 {
        return Err(DomainError::InvalidTimestamp(timestamp));
    }
    Ok(())
}

/// Invariants that must hold true for a CatalogEntry:
///
/// 1. Key and title are never empty
/// 2. Rating is absent or a multiple of 0.5 within [0.5, 5]
/// 3. User statuses are never empty and belong to the vocabulary given
///    at validation time
/// 4. User statuses carry no duplicates
/// 5. Added timestamp is non-negative
/// 6. Key never changes after construction
///
/// A vocabulary change never invalidates an entry that was already
/// validated; it only affects later construction and mutation.
