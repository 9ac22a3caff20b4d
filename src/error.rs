//! Construction errors with codes and fix suggestions
//!
//! Every error carries the position of the offending node so a caller can
//! print `file:line:col` diagnostics.

use std::fmt;

use thiserror::Error;

use crate::ast::Pos;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Why a workflow node could not be constructed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("GHWF-001: {what} must be {expected}, but found {found}")]
    ShapeMismatch {
        what: String,
        expected: String,
        found: String,
        pos: Pos,
    },

    #[error("GHWF-002: {first} and {second} cannot be used together in {section}")]
    MutuallyExclusive {
        section: String,
        first: String,
        second: String,
        pos: Pos,
    },

    #[error("GHWF-003: \"{field}\" is required in {section}")]
    MissingField {
        section: String,
        field: String,
        pos: Pos,
    },

    #[error("GHWF-004: key \"{key}\" is duplicated in {section}; first defined at {first}")]
    DuplicateKey {
        section: String,
        key: String,
        first: Pos,
        pos: Pos,
    },

    #[error("GHWF-005: unexpected key \"{key}\" in {section}; expected one of {expected}")]
    UnexpectedKey {
        section: String,
        key: String,
        expected: String,
        pos: Pos,
    },

    #[error("GHWF-006: could not decode YAML: {message}")]
    Decode { message: String, pos: Pos },
}

impl BuildError {
    pub fn pos(&self) -> Pos {
        match self {
            BuildError::ShapeMismatch { pos, .. }
            | BuildError::MutuallyExclusive { pos, .. }
            | BuildError::MissingField { pos, .. }
            | BuildError::DuplicateKey { pos, .. }
            | BuildError::UnexpectedKey { pos, .. }
            | BuildError::Decode { pos, .. } => *pos,
        }
    }

    /// Stable code, also the prefix of the message
    pub fn code(&self) -> &'static str {
        match self {
            BuildError::ShapeMismatch { .. } => "GHWF-001",
            BuildError::MutuallyExclusive { .. } => "GHWF-002",
            BuildError::MissingField { .. } => "GHWF-003",
            BuildError::DuplicateKey { .. } => "GHWF-004",
            BuildError::UnexpectedKey { .. } => "GHWF-005",
            BuildError::Decode { .. } => "GHWF-006",
        }
    }
}

impl FixSuggestion for BuildError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            BuildError::ShapeMismatch { .. } => {
                Some("Check the value against the workflow syntax reference")
            }
            BuildError::MutuallyExclusive { .. } => Some("Keep only one of the two forms"),
            BuildError::MissingField { .. } => Some("Add the required key"),
            BuildError::DuplicateKey { .. } => Some("Remove or rename one of the entries"),
            BuildError::UnexpectedKey { .. } => Some("Check the key for typos or wrong indentation"),
            BuildError::Decode { .. } => Some("Check YAML syntax: indentation and quoting"),
        }
    }
}

/// All construction errors of one document, sorted by position
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub errors: Vec<BuildError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: BuildError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BuildError> {
        self.errors.iter()
    }

    /// Stable sort by position, keeping detection order for ties
    pub fn sort(&mut self) {
        self.errors.sort_by_key(BuildError::pos);
    }

    pub fn first(&self) -> Option<&BuildError> {
        self.errors.first()
    }
}

impl From<BuildError> for Diagnostics {
    fn from(error: BuildError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = BuildError;
    type IntoIter = std::vec::IntoIter<BuildError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", e.pos(), e)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing(line: usize) -> BuildError {
        BuildError::MissingField {
            section: "job \"build\"".to_string(),
            field: "runs-on".to_string(),
            pos: Pos::new(line, 3),
        }
    }

    #[test]
    fn message_carries_code() {
        let e = missing(4);
        assert_eq!(e.code(), "GHWF-003");
        assert!(e.to_string().starts_with("GHWF-003"));
        assert!(e.to_string().contains("runs-on"));
        assert_eq!(e.pos(), Pos::new(4, 3));
        assert!(e.fix_suggestion().is_some());
    }

    #[test]
    fn duplicate_key_points_at_first_definition() {
        let e = BuildError::DuplicateKey {
            section: "\"jobs\" section".to_string(),
            key: "build".to_string(),
            first: Pos::new(3, 3),
            pos: Pos::new(9, 3),
        };
        assert!(e.to_string().contains("first defined at 3:3"));
        assert_eq!(e.pos(), Pos::new(9, 3));
    }

    #[test]
    fn diagnostics_sort_by_position() {
        let mut d = Diagnostics::new();
        d.push(missing(10));
        d.push(missing(2));
        d.push(BuildError::Decode {
            message: "bad".to_string(),
            pos: Pos::new(2, 1),
        });
        d.sort();
        let lines: Vec<Pos> = d.iter().map(BuildError::pos).collect();
        assert_eq!(lines, [Pos::new(2, 1), Pos::new(2, 3), Pos::new(10, 3)]);
        assert_eq!(d.len(), 3);
        assert!(d.to_string().starts_with("2:1: GHWF-006"));
    }
}
