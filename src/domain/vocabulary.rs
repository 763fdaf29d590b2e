use serde::{Deserialize, Serialize};

/// The allowed user-status strings for one entry kind.
///
/// A vocabulary is data, read from storage for every validating
/// operation. It is never embedded in an entry: callers pass it to
/// the constructor and to `set_user_statuses`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusVocabulary {
    statuses: Vec<String>,
}

impl StatusVocabulary {
    /// Build a vocabulary, keeping the first occurrence of each name.
    pub fn new<I, S>(statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for status in statuses {
            let status = status.into();
            if !unique.contains(&status) {
                unique.push(status);
            }
        }
        Self { statuses: unique }
    }

    pub fn contains(&self, status: &str) -> bool {
        self.statuses.iter().any(|s| s == status)
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.statuses.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.statuses
    }
}

impl std::fmt::Display for StatusVocabulary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.statuses.join(", "))
    }
}
