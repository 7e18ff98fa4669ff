//! The closed set of collections a store may touch.
//!
//! Collection names are never taken from callers as-is: every operation first
//! resolves the requested name through a [`TableRegistry`], and only the
//! registry's physical name ever reaches the storage engine. Entries are
//! `&'static str`, so a registry is fixed when the program is built or started.

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// Collections available in the default registry: issues and their processing rules.
pub const DEFAULT_TABLES: &[(&str, &str)] = &[("issues", "issues"), ("rules", "rules")];

/// Maps logical collection names to storage-level table names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRegistry {
    tables: Vec<(&'static str, &'static str)>,
}

impl TableRegistry {
    /// Creates a registry from `(name, physical name)` pairs.
    ///
    /// Later duplicates of a name are ignored.
    pub fn new(tables: impl IntoIterator<Item = (&'static str, &'static str)>) -> Self {
        let mut entries: Vec<(&'static str, &'static str)> = Vec::new();

        for (name, physical) in tables {
            if !entries.iter().any(|(existing, _)| *existing == name) {
                entries.push((name, physical));
            }
        }

        Self { tables: entries }
    }

    /// Creates a registry whose physical names equal the collection names.
    pub fn from_names(names: impl IntoIterator<Item = &'static str>) -> Self {
        Self::new(names.into_iter().map(|name| (name, name)))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.physical_name(name).is_some()
    }

    /// Returns the storage-level name of a registered collection.
    pub fn physical_name(&self, name: &str) -> Option<&'static str> {
        self.tables
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, physical)| *physical)
    }

    /// Like [`physical_name`](Self::physical_name), but fails with
    /// [`DocumentStoreError::UnknownCollection`] for unregistered names.
    pub fn resolve(&self, name: &str) -> DocumentStoreResult<&'static str> {
        self.physical_name(name)
            .ok_or_else(|| DocumentStoreError::UnknownCollection(name.to_string()))
    }

    /// Registered collection names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tables.iter().map(|(name, _)| *name)
    }

    /// `(name, physical name)` pairs, in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.tables.iter().copied()
    }

    /// Checks that every physical name is a plain identifier that can be quoted
    /// into SQL text as-is.
    pub fn validate_identifiers(&self) -> DocumentStoreResult<()> {
        for (name, physical) in self.entries() {
            if !is_identifier(physical) {
                return Err(DocumentStoreError::StorageUnavailable(format!(
                    "collection {name} maps to invalid table name {physical:?}"
                )));
            }
        }

        Ok(())
    }
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TABLES.iter().copied())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
