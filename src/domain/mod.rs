// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod entry;
pub mod kind;
pub mod vocabulary;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Catalog Entry Domain
pub use entry::{validate_entry, CatalogEntry, EntryRecord};

// Entry kinds (book / movie)
pub use kind::EntryKind;

// Status Vocabulary
pub use vocabulary::StatusVocabulary;

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of catalog entry invariants
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Entry key cannot be empty")]
    EmptyKey,

    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Rating {0} must be between 0.5 and 5 in steps of 0.5, or null")]
    InvalidRating(f64),

    #[error("An entry must have at least one user status")]
    EmptyStatuses,

    #[error("Invalid status: {status}. Allowed statuses are: {allowed}")]
    UnknownStatus { status: String, allowed: String },

    #[error("Added timestamp {0} cannot be negative")]
    InvalidTimestamp(i64),

    #[error("Malformed entry data: {0}")]
    MalformedRecord(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
