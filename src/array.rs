//! 1-D and 2-D array loading.
//!
//! Both loaders decode into a fresh vector and return it whole. A single bad
//! element aborts the load, so a partial array never reaches an entry.

use crate::decode::{self, DecodeContext};
use crate::error::TdrpError;
use crate::syntax::{Leaf, LeafGroup};
use crate::types::{EnumDef, ScalarKind};
use crate::value::TypedValue;

/// A decoded 2-D array, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub values: Vec<TypedValue>,
    pub rows: usize,
    pub cols: usize,
}

impl Grid {
    pub fn empty() -> Self {
        Self {
            values: Vec::new(),
            rows: 0,
            cols: 0,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&TypedValue> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.values.get(row * self.cols + col)
    }

    pub fn row(&self, row: usize) -> Option<&[TypedValue]> {
        if row >= self.rows {
            return None;
        }
        Some(&self.values[row * self.cols..(row + 1) * self.cols])
    }
}

/// Decode each element in order. An empty slice yields an empty array; the
/// caller compares the length against any fixed length.
pub fn load_array(
    elements: &[Leaf<'_>],
    kind: ScalarKind,
    enum_def: Option<&EnumDef>,
    ctx: &DecodeContext<'_>,
) -> Result<Vec<TypedValue>, TdrpError> {
    elements
        .iter()
        .map(|leaf| decode::decode(leaf, kind, enum_def, ctx))
        .collect()
}

/// Decode a rectangular grid. The first row fixes the column count; the first
/// row of a different length is a cardinality error naming both counts.
pub fn load_2d(
    rows: &[LeafGroup<Leaf<'_>>],
    kind: ScalarKind,
    enum_def: Option<&EnumDef>,
    ctx: &DecodeContext<'_>,
) -> Result<Grid, TdrpError> {
    let Some(first) = rows.first() else {
        return Ok(Grid::empty());
    };
    let cols = first.items.len();
    for (i, row) in rows.iter().enumerate().skip(1) {
        if row.items.len() != cols {
            return Err(TdrpError::cardinality(
                ctx.label,
                format!("row {i}"),
                cols,
                row.items.len(),
                row.open,
            ));
        }
    }

    let mut values = Vec::with_capacity(rows.len() * cols);
    for row in rows {
        for leaf in &row.items {
            values.push(decode::decode(leaf, kind, enum_def, ctx)?);
        }
    }
    Ok(Grid {
        values,
        rows: rows.len(),
        cols,
    })
}
