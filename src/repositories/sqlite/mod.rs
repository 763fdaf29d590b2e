// src/repositories/sqlite/mod.rs
//
// SQLite-backed repositories

pub mod sqlite_catalog_repository;

pub use sqlite_catalog_repository::SqliteCatalogRepository;
