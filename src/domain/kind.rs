use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::DomainError;

/// Kind of catalog entry
/// Books and movies share the same validated model; the kind selects
/// the vocabulary and the storage tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Book,
    Movie,
}

impl EntryKind {
    pub const ALL: [EntryKind; 2] = [EntryKind::Book, EntryKind::Movie];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Book => "book",
            EntryKind::Movie => "movie",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "book" | "books" => Ok(EntryKind::Book),
            "movie" | "movies" => Ok(EntryKind::Movie),
            other => Err(DomainError::MalformedRecord(format!(
                "Unknown entry kind '{}'",
                other
            ))),
        }
    }
}
