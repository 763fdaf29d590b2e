// src/config.rs
//
// Storage configuration
//
// Read from the environment once at startup. Missing variables fall back
// to files under the platform data directory.

use std::path::PathBuf;

use crate::db::{get_data_dir, get_database_path, DEFAULT_POOL_SIZE};
use crate::domain::EntryKind;
use crate::error::{AppError, AppResult};

pub const ENV_BACKEND: &str = "MEDIASHELF_BACKEND";
pub const ENV_DB_PATH: &str = "MEDIASHELF_DB_PATH";
pub const ENV_BOOKS_FILE: &str = "MEDIASHELF_BOOKS_FILE";
pub const ENV_MOVIES_FILE: &str = "MEDIASHELF_MOVIES_FILE";
pub const ENV_POOL_SIZE: &str = "MEDIASHELF_POOL_SIZE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite {
        path: PathBuf,
    },
    /// One JSON array file per entry kind
    JsonFile {
        books_path: PathBuf,
        movies_path: PathBuf,
    },
}

impl StorageBackend {
    pub fn json_path(&self, kind: EntryKind) -> Option<&PathBuf> {
        match self {
            StorageBackend::JsonFile { books_path, .. } if kind == EntryKind::Book => {
                Some(books_path)
            }
            StorageBackend::JsonFile { movies_path, .. } => Some(movies_path),
            StorageBackend::Sqlite { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend: StorageBackend,
    pub pool_size: u32,
}

impl AppConfig {
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackend::Sqlite { path: path.into() },
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    pub fn json_files(books_path: impl Into<PathBuf>, movies_path: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackend::JsonFile {
                books_path: books_path.into(),
                movies_path: movies_path.into(),
            },
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let pool_size = match var(ENV_POOL_SIZE) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(AppError::Config(format!(
                        "{} must be a positive integer, got '{}'",
                        ENV_POOL_SIZE, raw
                    )))
                }
            },
            None => DEFAULT_POOL_SIZE,
        };

        let backend_name = var(ENV_BACKEND).unwrap_or_else(|| "sqlite".to_string());

        let backend = match backend_name.trim().to_ascii_lowercase().as_str() {
            "sqlite" => StorageBackend::Sqlite {
                path: match var(ENV_DB_PATH) {
                    Some(path) => PathBuf::from(path),
                    None => get_database_path()?,
                },
            },
            "json" => StorageBackend::JsonFile {
                books_path: match var(ENV_BOOKS_FILE) {
                    Some(path) => PathBuf::from(path),
                    None => get_data_dir()?.join("books.json"),
                },
                movies_path: match var(ENV_MOVIES_FILE) {
                    Some(path) => PathBuf::from(path),
                    None => get_data_dir()?.join("movies.json"),
                },
            },
            other => {
                return Err(AppError::Config(format!(
                    "Unknown {} '{}' (expected 'sqlite' or 'json')",
                    ENV_BACKEND, other
                )))
            }
        };

        log::debug!("Storage configuration: {:?}, pool size {}", backend, pool_size);

        Ok(Self { backend, pool_size })
    }
}
