//! Catalog records for modules and the catalog map itself.

use std::collections::BTreeMap;

use crate::domain::{ModuleCode, PrerequisiteSet};

/// Upper bound on the credit value of a single module.
pub const MAX_CREDITS: u32 = 20;

/// A module's immutable descriptive record.
///
/// Entries are constructed once (from the catalog file or a metadata fetch)
/// and never mutated; the plan stores clones of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCatalogEntry {
    code: ModuleCode,
    name: String,
    credits: u32,
    category: String,
    preclusions: Vec<String>,
    prerequisites: PrerequisiteSet,
}

impl ModuleCatalogEntry {
    /// Creates a new catalog entry.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCreditsError`] unless `credits` is positive and at
    /// most [`MAX_CREDITS`].
    pub fn new(
        code: ModuleCode,
        name: String,
        credits: u32,
        category: String,
        preclusions: Vec<String>,
        prerequisites: PrerequisiteSet,
    ) -> Result<Self, InvalidCreditsError> {
        if credits == 0 || credits > MAX_CREDITS {
            return Err(InvalidCreditsError(credits));
        }

        Ok(Self {
            code,
            name,
            credits,
            category,
            preclusions,
            prerequisites,
        })
    }

    /// The module's unique code.
    #[must_use]
    pub const fn code(&self) -> &ModuleCode {
        &self.code
    }

    /// The module's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The module's credit value.
    #[must_use]
    pub const fn credits(&self) -> u32 {
        self.credits
    }

    /// The module's free-form category tag, such as `core`.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Free-text descriptions of modules mutually exclusive with this one.
    #[must_use]
    pub fn preclusions(&self) -> &[String] {
        &self.preclusions
    }

    /// The module's prerequisite requirement.
    #[must_use]
    pub const fn prerequisites(&self) -> &PrerequisiteSet {
        &self.prerequisites
    }

    /// Returns `true` if this module's preclusion text references `other`.
    ///
    /// Preclusions are free text, so matching is by scanning for the code as
    /// a standalone alphanumeric token, case-insensitively.
    #[must_use]
    pub fn precludes(&self, other: &ModuleCode) -> bool {
        self.preclusions.iter().any(|text| {
            text.split(|c: char| !c.is_ascii_alphanumeric())
                .any(|token| token.eq_ignore_ascii_case(other.as_str()))
        })
    }
}

/// The catalog of known modules, keyed by code.
///
/// Populated once at load time; lookups resolve codes held elsewhere (plan
/// cells, graph nodes) back to full entries.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<ModuleCode, ModuleCatalogEntry>,
}

impl Catalog {
    /// Inserts an entry, replacing any previous entry with the same code.
    ///
    /// Returns the replaced entry, if any. Reloads legitimately re-insert
    /// existing codes, so replacement is not an error.
    pub fn insert(&mut self, entry: ModuleCatalogEntry) -> Option<ModuleCatalogEntry> {
        let replaced = self.entries.insert(entry.code().clone(), entry);
        if let Some(old) = &replaced {
            tracing::debug!(code = %old.code(), "replaced existing catalog entry");
        }
        replaced
    }

    /// Looks up an entry by code.
    #[must_use]
    pub fn get(&self, code: &ModuleCode) -> Option<&ModuleCatalogEntry> {
        self.entries.get(code)
    }

    /// Returns `true` if the catalog holds an entry for `code`.
    #[must_use]
    pub fn contains(&self, code: &ModuleCode) -> bool {
        self.entries.contains_key(code)
    }

    /// Iterates over all entries in code order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleCatalogEntry> {
        self.entries.values()
    }

    /// The number of entries in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a ModuleCatalogEntry;
    type IntoIter = std::collections::btree_map::Values<'a, ModuleCode, ModuleCatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

/// Error returned when a module's credit value is out of range.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid credit value {0}: must be between 1 and {MAX_CREDITS}")]
pub struct InvalidCreditsError(u32);
