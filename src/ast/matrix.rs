//! `strategy:` and `strategy.matrix:`
//!
//! The matrix is stored as written. Expanding rows into job combinations and
//! applying include/exclude is left to consumers.

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::pos::{Bool, Int, Pos, Str};

/// One matrix axis and its candidate values, in source order
#[derive(Debug, Clone, Serialize)]
pub struct MatrixRow {
    pub name: Str,
    pub values: Vec<Str>,
}

/// One `key: value` assignment of an include/exclude entry
#[derive(Debug, Clone, Serialize)]
pub struct MatrixCombination {
    pub key: Str,
    pub value: Str,
}

/// An include/exclude entry keyed by axis name
///
/// Keys may name axes that have no row.
pub type MatrixCombinations = FxHashMap<String, MatrixCombination>;

#[derive(Debug, Clone, Serialize)]
pub struct Matrix {
    pub rows: FxHashMap<String, MatrixRow>,
    pub include: Vec<MatrixCombinations>,
    pub exclude: Vec<MatrixCombinations>,
    pub pos: Pos,
}

impl Matrix {
    pub fn row(&self, axis: &str) -> Option<&MatrixRow> {
        self.rows.get(axis)
    }

    /// Number of combinations in the cartesian product of rows, before
    /// include/exclude are applied
    ///
    /// Returns `None` when the count does not fit in a `usize`.
    pub fn row_product(&self) -> Option<usize> {
        if self.rows.is_empty() {
            return Some(0);
        }
        self.rows
            .values()
            .try_fold(1usize, |acc, r| acc.checked_mul(r.values.len()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Strategy {
    pub matrix: Option<Matrix>,
    pub fail_fast: Option<Bool>,
    pub max_parallel: Option<Int>,
    pub pos: Pos,
}
