//! Decoded runtime values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::ScalarKind;

/// A decoded value. Exactly one form is active.
///
/// `Deferred` holds raw text that still contains an unexpanded `$(VAR)`
/// reference; an entry holding one is provisionally set until a later
/// expansion pass resolves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TypedValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Enum { name: String, value: i32 },
    Deferred(String),
}

impl TypedValue {
    /// The kind this value was decoded as, or `None` while deferred.
    pub fn kind(&self) -> Option<ScalarKind> {
        Some(match self {
            TypedValue::Bool(_) => ScalarKind::Bool,
            TypedValue::Int(_) => ScalarKind::Int,
            TypedValue::Long(_) => ScalarKind::Long,
            TypedValue::Float(_) => ScalarKind::Float,
            TypedValue::Double(_) => ScalarKind::Double,
            TypedValue::String(_) => ScalarKind::String,
            TypedValue::Enum { .. } => ScalarKind::Enum,
            TypedValue::Deferred(_) => return None,
        })
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, TypedValue::Deferred(_))
    }

    /// Numeric value widened to `f64`, for cross-width comparison.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Int(v) => Some(f64::from(*v)),
            TypedValue::Long(v) => Some(*v as f64),
            TypedValue::Float(v) => Some(f64::from(*v)),
            TypedValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Int(v) => Some(i64::from(*v)),
            TypedValue::Long(v) => Some(*v),
            TypedValue::Enum { value, .. } => Some(i64::from(*value)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Raw text of a deferred value.
    pub fn deferred_text(&self) -> Option<&str> {
        match self {
            TypedValue::Deferred(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            TypedValue::Int(v) => write!(f, "{v}"),
            TypedValue::Long(v) => write!(f, "{v}"),
            TypedValue::Float(v) => write!(f, "{v}"),
            TypedValue::Double(v) => write!(f, "{v}"),
            TypedValue::String(s) => write!(f, "\"{s}\""),
            TypedValue::Enum { name, .. } => write!(f, "{name}"),
            TypedValue::Deferred(s) => write!(f, "{s}"),
        }
    }
}
