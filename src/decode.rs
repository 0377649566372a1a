//! Single-token value decoding.
//!
//! [`decode_text`] is the pure conversion of one token's text into a
//! [`TypedValue`] of a declared kind. [`decode`] wraps it with the entry label
//! and source location so failures render as precise diagnostics.
//!
//! Decoding rules by kind:
//!
//! - **Bool**: looked up in the boolean vocabulary ([`bool_truth`]).
//! - **Enum**: exact match against the symbol table, first match wins.
//! - **Int/Long/Float/Double**: locale-independent numeric parse, then the
//!   `MIN`/`MAX` sentinels.
//! - **String**: copied verbatim. Strings never defer.
//!
//! For every kind except String, unrecognized text containing `$(` is returned
//! as [`TypedValue::Deferred`] when environment expansion is off, because the
//! real value only exists after the reference is expanded.

use crate::error::TdrpError;
use crate::syntax::Leaf;
use crate::types::{EnumDef, ScalarKind};
use crate::value::TypedValue;

/// Marker that opens an environment-variable reference.
pub const ENV_MARKER: &str = "$(";

/// Per-entry decoding context supplied by the caller.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    /// Entry label, quoted in every error.
    pub label: &'a str,
    /// When false, unresolvable text with a `$(` reference is deferred
    /// instead of rejected.
    pub expand_env: bool,
}

impl<'a> DecodeContext<'a> {
    pub fn new(label: &'a str, expand_env: bool) -> Self {
        Self { label, expand_env }
    }
}

/// Why a token could not be decoded; the expected-form description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    pub expected: String,
}

/// Canonical boolean vocabulary, case-insensitive.
pub fn bool_truth(text: &str) -> Option<bool> {
    const TRUE_WORDS: [&str; 5] = ["true", "t", "yes", "y", "1"];
    const FALSE_WORDS: [&str; 5] = ["false", "f", "no", "n", "0"];
    if TRUE_WORDS.iter().any(|w| text.eq_ignore_ascii_case(w)) {
        Some(true)
    } else if FALSE_WORDS.iter().any(|w| text.eq_ignore_ascii_case(w)) {
        Some(false)
    } else {
        None
    }
}

/// Type-specific extremal value for a `MIN`/`MAX` sentinel.
///
/// Float and Double `MIN` are the smallest positive normal values, matching
/// the C `FLT_MIN`/`DBL_MIN` convention parameter files were written against.
pub fn sentinel(kind: ScalarKind, text: &str) -> Option<TypedValue> {
    let max = match text {
        "MIN" => false,
        "MAX" => true,
        _ => return None,
    };
    Some(match (kind, max) {
        (ScalarKind::Int, false) => TypedValue::Int(i32::MIN),
        (ScalarKind::Int, true) => TypedValue::Int(i32::MAX),
        (ScalarKind::Long, false) => TypedValue::Long(i64::MIN),
        (ScalarKind::Long, true) => TypedValue::Long(i64::MAX),
        (ScalarKind::Float, false) => TypedValue::Float(f32::MIN_POSITIVE),
        (ScalarKind::Float, true) => TypedValue::Float(f32::MAX),
        (ScalarKind::Double, false) => TypedValue::Double(f64::MIN_POSITIVE),
        (ScalarKind::Double, true) => TypedValue::Double(f64::MAX),
        _ => return None,
    })
}

fn parse_number(kind: ScalarKind, text: &str) -> Option<TypedValue> {
    match kind {
        ScalarKind::Int => text.parse().ok().map(TypedValue::Int),
        ScalarKind::Long => text.parse().ok().map(TypedValue::Long),
        // Overflow, `inf` and `NaN` are not values a parameter can hold.
        ScalarKind::Float => text
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(TypedValue::Float),
        ScalarKind::Double => text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(TypedValue::Double),
        _ => None,
    }
}

fn defer_or_fail(text: &str, expand_env: bool, expected: String) -> Result<TypedValue, DecodeFailure> {
    if !expand_env && text.contains(ENV_MARKER) {
        Ok(TypedValue::Deferred(text.to_string()))
    } else {
        Err(DecodeFailure { expected })
    }
}

/// Decode raw token text as `kind`.
pub fn decode_text(
    text: &str,
    kind: ScalarKind,
    enum_def: Option<&EnumDef>,
    expand_env: bool,
) -> Result<TypedValue, DecodeFailure> {
    match kind {
        ScalarKind::String => Ok(TypedValue::String(text.to_string())),
        ScalarKind::Bool => match bool_truth(text) {
            Some(b) => Ok(TypedValue::Bool(b)),
            None => defer_or_fail(text, expand_env, "boolean (TRUE or FALSE)".into()),
        },
        ScalarKind::Enum => {
            let symbol = enum_def.and_then(|def| def.lookup(text));
            match symbol {
                Some(sym) => Ok(TypedValue::Enum {
                    name: sym.name.clone(),
                    value: sym.value,
                }),
                None => {
                    let names = enum_def.map(EnumDef::symbol_names).unwrap_or_default();
                    defer_or_fail(text, expand_env, format!("one of: {}", names.join(", ")))
                }
            }
        }
        ScalarKind::Int | ScalarKind::Long | ScalarKind::Float | ScalarKind::Double => {
            if let Some(v) = parse_number(kind, text).or_else(|| sentinel(kind, text)) {
                return Ok(v);
            }
            defer_or_fail(text, expand_env, format!("{kind}, MIN or MAX"))
        }
    }
}

/// Decode one leaf token, attaching label and location to any failure.
pub fn decode(
    leaf: &Leaf<'_>,
    kind: ScalarKind,
    enum_def: Option<&EnumDef>,
    ctx: &DecodeContext<'_>,
) -> Result<TypedValue, TdrpError> {
    decode_text(&leaf.token.text, kind, enum_def, ctx.expand_env).map_err(|failure| {
        TdrpError::Type {
            label: ctx.label.to_string(),
            text: leaf.token.text.clone(),
            expected: failure.expected,
            location: leaf.location(),
        }
    })
}
