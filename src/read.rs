//! Entry readers: find an entry's statement in a token stream, decode it for
//! the entry's shape and commit it.
//!
//! Each reader either installs a complete new payload and marks the entry set,
//! or returns an error and leaves the entry exactly as it was.

use crate::array;
use crate::decode::{self, DecodeContext};
use crate::entry::{ParamEntry, Payload};
use crate::error::TdrpError;
use crate::record;
use crate::syntax::{self, Node};
use crate::token::Token;
use crate::types::{ScalarKind, Shape};
use crate::value::TypedValue;

fn require_shape(entry: &ParamEntry, requested: Shape) -> Result<(), TdrpError> {
    let actual = entry.shape();
    if actual == requested {
        Ok(())
    } else {
        Err(TdrpError::WrongShape {
            label: entry.name().to_string(),
            actual,
            requested,
        })
    }
}

fn value_kind(entry: &ParamEntry) -> Result<ScalarKind, TdrpError> {
    entry.kind().ok_or_else(|| TdrpError::WrongShape {
        label: entry.name().to_string(),
        actual: entry.shape(),
        requested: Shape::Scalar,
    })
}

fn check_fixed_length(
    entry: &ParamEntry,
    what: &str,
    found: usize,
    node: &Node<'_>,
) -> Result<(), TdrpError> {
    match entry.get_fixed_length() {
        Some(expected) if expected != found => Err(TdrpError::cardinality(
            entry.name(),
            what,
            expected,
            found,
            node.location(),
        )),
        _ => Ok(()),
    }
}

/// Read and commit a scalar value of the entry's declared kind.
pub fn read_scalar(entry: &mut ParamEntry, tokens: &[Token], expand_env: bool) -> Result<(), TdrpError> {
    require_shape(entry, Shape::Scalar)?;
    let kind = value_kind(entry)?;
    let node = syntax::parse_assignment(tokens, entry.name())?;
    let leaf = node.scalar(entry.name())?;
    let ctx = DecodeContext::new(entry.name(), expand_env);
    let value = decode::decode(&leaf, kind, entry.enum_def(), &ctx)?;
    entry.install(Payload::Scalar(value));
    Ok(())
}

/// Read and commit a 1-D array: a single value or a braced list.
pub fn read_array(entry: &mut ParamEntry, tokens: &[Token], expand_env: bool) -> Result<(), TdrpError> {
    require_shape(entry, Shape::Array)?;
    let kind = value_kind(entry)?;
    let node = syntax::parse_assignment(tokens, entry.name())?;
    let elements = node.elements(entry.name())?;
    let ctx = DecodeContext::new(entry.name(), expand_env);
    let values = array::load_array(&elements, kind, entry.enum_def(), &ctx)?;
    check_fixed_length(entry, "array", values.len(), &node)?;
    entry.install(Payload::Array(values));
    Ok(())
}

/// Read and commit a 2-D array of brace-delimited rows.
pub fn read_array_2d(entry: &mut ParamEntry, tokens: &[Token], expand_env: bool) -> Result<(), TdrpError> {
    require_shape(entry, Shape::Array2D)?;
    let kind = value_kind(entry)?;
    let node = syntax::parse_assignment(tokens, entry.name())?;
    let rows = node.rows(entry.name())?;
    let ctx = DecodeContext::new(entry.name(), expand_env);
    let grid = array::load_2d(&rows, kind, entry.enum_def(), &ctx)?;
    check_fixed_length(entry, "2-D array", grid.values.len(), &node)?;
    entry.install(Payload::Array2D(grid));
    Ok(())
}

/// Read and commit one record or a record array.
pub fn read_records(entry: &mut ParamEntry, tokens: &[Token], expand_env: bool) -> Result<(), TdrpError> {
    let (Shape::Records { array }, Some(def)) = (entry.shape(), entry.record_def()) else {
        return Err(TdrpError::WrongShape {
            label: entry.name().to_string(),
            actual: entry.shape(),
            requested: Shape::Records { array: true },
        });
    };
    let node = syntax::parse_assignment(tokens, entry.name())?;
    let instances = node.instances(entry.name(), array)?;
    let ctx = DecodeContext::new(entry.name(), expand_env);
    let records = record::load_records(&instances, def, &ctx)?;
    if array {
        check_fixed_length(entry, "record array", records.count, &node)?;
    }
    entry.install(Payload::Records(records));
    Ok(())
}

/// Read an entry with the reader matching its shape.
pub fn read_entry(entry: &mut ParamEntry, tokens: &[Token], expand_env: bool) -> Result<(), TdrpError> {
    match entry.shape() {
        Shape::Scalar => read_scalar(entry, tokens, expand_env),
        Shape::Array => read_array(entry, tokens, expand_env),
        Shape::Array2D => read_array_2d(entry, tokens, expand_env),
        Shape::Records { .. } => read_records(entry, tokens, expand_env),
    }
}

fn read_bound(entry: &ParamEntry, tokens: &[Token], which: &str) -> Result<TypedValue, TdrpError> {
    let kind = value_kind(entry)?;
    let node = syntax::parse_assignment(tokens, which)?;
    let leaf = node.scalar(which)?;
    if !kind.is_numeric() {
        return Err(TdrpError::syntax(
            entry.name(),
            format!("'{which}' only applies to numeric params, not {kind}"),
            leaf.location(),
        ));
    }
    // Bounds are part of the schema and never deferred.
    let ctx = DecodeContext::new(entry.name(), true);
    decode::decode(&leaf, kind, None, &ctx)
}

/// Read the `min = value ;` bound from an entry's schema tokens.
pub fn read_min(entry: &mut ParamEntry, tokens: &[Token]) -> Result<(), TdrpError> {
    let value = read_bound(entry, tokens, "min")?;
    entry.bounds_mut().min = Some(value);
    Ok(())
}

/// Read the `max = value ;` bound from an entry's schema tokens.
pub fn read_max(entry: &mut ParamEntry, tokens: &[Token]) -> Result<(), TdrpError> {
    let value = read_bound(entry, tokens, "max")?;
    entry.bounds_mut().max = Some(value);
    Ok(())
}
