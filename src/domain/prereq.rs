//! Prerequisite requirements as a disjunction of conjunctions.
//!
//! A [`PrerequisiteSet`] holds a sequence of *options*; each option is a
//! sequence of required *tokens*. The requirement is satisfied when at least
//! one option has all of its tokens satisfied. A token is either a literal
//! module code or a wildcard prefix ending in `%`.

use std::{collections::BTreeSet, fmt};

use non_empty_string::NonEmptyString;

use crate::domain::ModuleCode;

/// The wildcard suffix character for prefix tokens.
///
/// A token such as `CS1%` is satisfied by any completed code starting with
/// `CS1`. A token that is exactly `%` matches nothing.
pub const WILDCARD: char = '%';

/// One module's prerequisite requirement: an OR of ANDs of module codes.
///
/// An empty option list means the module has no prerequisites and is
/// trivially satisfied. An individual option with no tokens is likewise
/// auto-satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrerequisiteSet {
    options: Vec<Vec<NonEmptyString>>,
}

impl PrerequisiteSet {
    /// A requirement with no options, satisfied by anything.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            options: Vec::new(),
        }
    }

    /// Builds a requirement from raw option token lists.
    ///
    /// Tokens are trimmed and uppercased, matching the normalization applied
    /// to [`ModuleCode`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTokenError`] if any token is empty after trimming.
    /// Options themselves may be empty.
    pub fn new<O, T, S>(options: O) -> Result<Self, InvalidTokenError>
    where
        O: IntoIterator<Item = T>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let options = options
            .into_iter()
            .map(|tokens| {
                tokens
                    .into_iter()
                    .map(|token| {
                        let normalized = token.as_ref().trim().to_ascii_uppercase();
                        NonEmptyString::new(normalized).map_err(|_| InvalidTokenError)
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { options })
    }

    /// Returns the option token lists, in their declared order.
    #[must_use]
    pub fn options(&self) -> &[Vec<NonEmptyString>] {
        &self.options
    }

    /// Returns `true` if this requirement has no options.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Evaluates the requirement against the completed and exempted codes.
    ///
    /// The requirement is satisfied iff some option has every token
    /// satisfied. A literal token is satisfied when it names a completed or
    /// exempted code; a wildcard token is satisfied when any *completed* code
    /// starts with its prefix. A requirement with no options is always
    /// satisfied.
    #[must_use]
    pub fn is_satisfied(
        &self,
        completed: &BTreeSet<ModuleCode>,
        exempted: &BTreeSet<ModuleCode>,
    ) -> bool {
        if self.options.is_empty() {
            return true;
        }

        self.options.iter().any(|option| {
            option
                .iter()
                .all(|token| token_satisfied(token.as_str(), completed, exempted))
        })
    }

    /// Checks the requirement for a module being added to a plan.
    ///
    /// Exemption short-circuits the check entirely: if `code` itself is
    /// exempted the requirement is considered met regardless of its options.
    ///
    /// # Errors
    ///
    /// Returns [`UnmetPrerequisite`] describing the unmet requirement if no
    /// option is satisfied.
    pub fn validate(
        &self,
        code: &ModuleCode,
        completed: &BTreeSet<ModuleCode>,
        exempted: &BTreeSet<ModuleCode>,
    ) -> Result<(), UnmetPrerequisite> {
        if exempted.contains(code) || self.is_satisfied(completed, exempted) {
            Ok(())
        } else {
            Err(UnmetPrerequisite {
                code: code.clone(),
                requirement: self.to_string(),
            })
        }
    }

    /// Resolves the codes within `universe` referenced by any token.
    ///
    /// Literal tokens resolve to a matching code in the universe; wildcard
    /// tokens resolve to every universe code sharing the prefix. Used to
    /// build the dependency edges of a working set.
    #[must_use]
    pub fn referenced_codes(&self, universe: &BTreeSet<ModuleCode>) -> BTreeSet<ModuleCode> {
        let mut referenced = BTreeSet::new();

        for token in self.options.iter().flatten() {
            let token = token.as_str();
            if let Some(prefix) = wildcard_prefix(token) {
                referenced.extend(
                    universe
                        .iter()
                        .filter(|code| code.as_str().starts_with(prefix))
                        .cloned(),
                );
            } else if let Some(code) = universe.iter().find(|code| code.as_str() == token) {
                referenced.insert(code.clone());
            }
        }

        referenced
    }
}

impl fmt::Display for PrerequisiteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.options.is_empty() {
            return write!(f, "nothing");
        }

        for (i, option) in self.options.iter().enumerate() {
            if i > 0 {
                write!(f, ", or ")?;
            }
            if option.is_empty() {
                write!(f, "nothing")?;
            }
            for (j, token) in option.iter().enumerate() {
                if j > 0 {
                    write!(f, " and ")?;
                }
                write!(f, "{token}")?;
            }
        }

        Ok(())
    }
}

/// Returns the prefix of a wildcard token, or `None` for literal tokens.
///
/// A bare `%` yields an empty prefix, which callers must treat as matching
/// nothing.
fn wildcard_prefix(token: &str) -> Option<&str> {
    token.strip_suffix(WILDCARD)
}

fn token_satisfied(
    token: &str,
    completed: &BTreeSet<ModuleCode>,
    exempted: &BTreeSet<ModuleCode>,
) -> bool {
    if let Some(prefix) = wildcard_prefix(token) {
        // A bare `%` is explicitly excluded from matching anything.
        if prefix.is_empty() {
            return false;
        }
        completed
            .iter()
            .any(|code| code.as_str().starts_with(prefix))
    } else {
        completed.iter().any(|code| code.as_str() == token)
            || exempted.iter().any(|code| code.as_str() == token)
    }
}

/// Error returned when a prerequisite token is empty.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("prerequisite tokens must not be empty")]
pub struct InvalidTokenError;

/// A module's prerequisite requirement was not met.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("prerequisites for {code} not met: requires {requirement}")]
pub struct UnmetPrerequisite {
    /// The module whose requirement failed.
    pub code: ModuleCode,
    /// Human-readable description of the requirement.
    pub requirement: String,
}
