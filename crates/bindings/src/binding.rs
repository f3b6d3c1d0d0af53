//! Binding and entry types.

use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A single named value inside a binding.
///
/// Entries are re-readable: every call to [`Entry::read_bytes`] returns the
/// full content again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Content backed by a file on disk.
    File(PathBuf),
    /// Content held in memory.
    Value(Vec<u8>),
}

impl Entry {
    /// Create an in-memory entry.
    #[must_use]
    pub fn value(content: impl Into<Vec<u8>>) -> Self {
        Self::Value(content.into())
    }

    /// Read the raw bytes of this entry.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::File(path) => std::fs::read(path).map_err(|e| Error::io(e, path, "read")),
            Self::Value(bytes) => Ok(bytes.clone()),
        }
    }

    /// Read this entry as text with surrounding whitespace removed.
    pub fn read_string(&self, name: &str) -> Result<String> {
        let bytes = self.read_bytes()?;
        let text = String::from_utf8(bytes).map_err(|_| Error::InvalidEntry {
            entry: name.to_string(),
        })?;
        Ok(text.trim().to_string())
    }
}

/// A typed bundle of named configuration entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Binding name (the directory name for filesystem bindings).
    pub name: String,
    /// Location of the binding.
    pub path: PathBuf,
    /// Binding type, e.g. `dependency-mirror`.
    pub binding_type: String,
    /// Optional provider; empty when unset.
    pub provider: String,
    /// Entries keyed by name.
    pub entries: BTreeMap<String, Entry>,
}

impl Binding {
    /// Create a binding with no entries.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        binding_type: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
            binding_type: binding_type.into(),
            provider: provider.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Add an in-memory entry, returning the binding.
    #[must_use]
    pub fn with_entry(mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.entries.insert(name.into(), Entry::value(content));
        self
    }

    /// Whether this binding has the given type and, when `provider` is
    /// non-empty, the given provider. Both comparisons ignore ASCII case.
    #[must_use]
    pub fn matches(&self, binding_type: &str, provider: &str) -> bool {
        self.binding_type.eq_ignore_ascii_case(binding_type)
            && (provider.is_empty() || self.provider.eq_ignore_ascii_case(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_entry_is_rereadable() {
        let entry = Entry::value("  https://mirror.test  \n");
        assert_eq!(entry.read_string("default").unwrap(), "https://mirror.test");
        assert_eq!(entry.read_string("default").unwrap(), "https://mirror.test");
    }

    #[test]
    fn test_invalid_utf8_entry() {
        let entry = Entry::value(vec![0xff, 0xfe]);
        let err = entry.read_string("broken").unwrap_err();
        assert!(matches!(err, Error::InvalidEntry { ref entry } if entry == "broken"));
    }

    #[test]
    fn test_matches_type_and_provider() {
        let binding = Binding::new("b", "/b", "Dependency-Mirror", "acme");
        assert!(binding.matches("dependency-mirror", ""));
        assert!(binding.matches("dependency-mirror", "ACME"));
        assert!(!binding.matches("dependency-mirror", "other"));
        assert!(!binding.matches("dependency-mapping", ""));
    }
}
