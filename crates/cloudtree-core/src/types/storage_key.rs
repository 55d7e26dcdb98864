//! Opaque byte-store keys.
//!
//! A storage key is generated once when a node is created and never derived
//! from the node's display name, so renames stay metadata-only and two nodes
//! can never collide on a physical location.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Opaque identifier of a physical byte location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
pub struct StorageKey(String);

impl StorageKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wrap an existing key, rejecting values that could escape a byte-store
    /// namespace (empty, path separators, parent references).
    pub fn parse(value: impl Into<String>) -> Result<Self, AppError> {
        let value = value.into();
        if value.is_empty()
            || value.contains('/')
            || value.contains('\\')
            || value.contains("..")
        {
            return Err(AppError::validation(format!(
                "Invalid storage key: '{value}'"
            )));
        }
        Ok(Self(value))
    }

    /// Return the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(StorageKey::generate(), StorageKey::generate());
    }

    #[test]
    fn test_parse_rejects_path_like_values() {
        assert!(StorageKey::parse("").is_err());
        assert!(StorageKey::parse("a/b").is_err());
        assert!(StorageKey::parse("..").is_err());
        assert!(StorageKey::parse("c0ffee").is_ok());
    }
}
