//! Source positions and position-carrying scalar leaves
//!
//! Every scalar in the tree is a [`Located`] value: the raw value and the
//! line/column it was read from travel together.

use std::fmt;

use serde::Serialize;

/// Position in a workflow file (1-based line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A scalar value paired with its source position
///
/// Equality compares the value only: the same document content at different
/// coordinates is still the same content.
#[derive(Debug, Clone, Serialize)]
pub struct Located<T> {
    pub value: T,
    pub pos: Pos,
}

/// String leaf
pub type Str = Located<String>;
/// Boolean leaf
pub type Bool = Located<bool>;
/// Integer leaf
pub type Int = Located<i64>;
/// Floating-point leaf
pub type Float = Located<f64>;

impl<T> Located<T> {
    pub fn new(value: T, pos: Pos) -> Self {
        Self { value, pos }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Map the value, keeping the position
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Located<U> {
        Located {
            value: f(self.value),
            pos: self.pos,
        }
    }
}

impl Located<String> {
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T: PartialEq> PartialEq for Located<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialEq<str> for Located<String> {
    fn eq(&self, other: &str) -> bool {
        self.value == other
    }
}

impl PartialEq<&str> for Located<String> {
    fn eq(&self, other: &&str) -> bool {
        self.value == *other
    }
}

impl<T: fmt::Display> fmt::Display for Located<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}
