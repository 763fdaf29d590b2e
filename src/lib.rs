// src/lib.rs
// MediaShelf - Personal catalog of books and movies
//
// Architecture:
// - Domain-centric: entry invariants live in the domain and nowhere else
// - Storage-agnostic: SQLite and JSON file backends behind one repository contract
// - Explicit: pool, vocabulary source and configuration are injected
// - Synchronous: every operation blocks until storage has answered

// ============================================================================
// CORE
// ============================================================================

pub mod db;
pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;
pub mod config;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    validate_entry, CatalogEntry, DomainError, DomainResult, EntryKind, EntryRecord,
    StatusVocabulary,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{create_connection_pool, create_memory_pool, initialize_database, ConnectionPool};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    CatalogRepository, EntryFilter, FixedStatusVocabulary, JsonFileCatalogRepository,
    SqliteCatalogRepository, SqliteStatusVocabulary, StatusVocabularySource,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{CatalogService, UpdateRatingRequest, UpdateUserStatusesRequest};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{ApiResponse, AppState, ErrorResponse, ErrorType};
pub use config::{AppConfig, StorageBackend};
