use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

/// A validated module code, such as `CS1010` or `GER1000`.
///
/// Codes are normalized to uppercase on construction and contain only ASCII
/// alphanumeric characters. Every catalog map, plan cell and graph node is
/// keyed by a `ModuleCode`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ModuleCode(NonEmptyString);

impl ModuleCode {
    /// Creates a new `ModuleCode` from a string.
    ///
    /// Leading and trailing whitespace is trimmed and the remainder is
    /// uppercased before validation.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCodeError`] if the trimmed string is empty or
    /// contains characters other than ASCII letters and digits.
    pub fn new(s: &str) -> Result<Self, InvalidCodeError> {
        let normalized = s.trim().to_ascii_uppercase();

        if !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvalidCodeError(normalized));
        }

        let non_empty =
            NonEmptyString::new(normalized.clone()).map_err(|_| InvalidCodeError(normalized))?;

        Ok(Self(non_empty))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<&str> for ModuleCode {
    type Error = InvalidCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for ModuleCode {
    type Error = InvalidCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl AsRef<str> for ModuleCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for ModuleCode {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for ModuleCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ModuleCode {
    type Err = InvalidCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Error returned when a string is not a valid module code.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid module code '{0}': must be non-empty and contain only letters and digits")]
pub struct InvalidCodeError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let code = ModuleCode::new(" cs1010 ").expect("valid code");
        assert_eq!(code.as_str(), "CS1010");
        assert_eq!(code.to_string(), "CS1010");
    }

    #[test]
    fn rejects_empty_input() {
        assert!(ModuleCode::new("").is_err());
        assert!(ModuleCode::new("   ").is_err());
    }

    #[test]
    fn rejects_punctuation() {
        assert!(ModuleCode::new("CS-1010").is_err());
        assert!(ModuleCode::new("CS 1010").is_err());
    }

    #[test]
    fn equal_after_normalization() {
        let a = ModuleCode::new("cs2040").unwrap();
        let b = ModuleCode::new("CS2040").unwrap();
        assert_eq!(a, b);
    }
}
