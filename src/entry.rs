//! The mutable destination for one parameter.
//!
//! A [`ParamEntry`] is created once with its schema (type, shape, bounds,
//! fixed length) and its default payload. Readers only ever replace the whole
//! payload through [`ParamEntry::install`], after a complete successful
//! decode, so a failed read never leaves a partial value behind.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::array::Grid;
use crate::record::Records;
use crate::types::{EntryType, EnumDef, RecordDef, ScalarKind, Shape};
use crate::value::TypedValue;

/// The current value of an entry. The variant always matches the entry's
/// schema shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Scalar(TypedValue),
    Array(Vec<TypedValue>),
    Array2D(Grid),
    Records(Records),
}

impl Payload {
    /// Every value in storage order.
    pub fn values(&self) -> &[TypedValue] {
        match self {
            Payload::Scalar(v) => std::slice::from_ref(v),
            Payload::Array(vs) => vs,
            Payload::Array2D(grid) => &grid.values,
            Payload::Records(recs) => &recs.values,
        }
    }

    pub(crate) fn values_mut(&mut self) -> &mut [TypedValue] {
        match self {
            Payload::Scalar(v) => std::slice::from_mut(v),
            Payload::Array(vs) => vs,
            Payload::Array2D(grid) => &mut grid.values,
            Payload::Records(recs) => &mut recs.values,
        }
    }

    /// Element count for arrays, instance count for records, 1 for scalars.
    pub fn len(&self) -> usize {
        match self {
            Payload::Scalar(_) => 1,
            Payload::Array(vs) => vs.len(),
            Payload::Array2D(grid) => grid.values.len(),
            Payload::Records(recs) => recs.count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_deferred(&self) -> bool {
        self.values().iter().any(TypedValue::is_deferred)
    }
}

/// Optional numeric bounds checked after each load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Option<TypedValue>,
    pub max: Option<TypedValue>,
}

impl Bounds {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamEntry {
    name: String,
    entry_type: EntryType,
    shape: Shape,
    payload: Payload,
    fixed_length: Option<usize>,
    bounds: Bounds,
    is_private: bool,
    is_set: bool,
}

impl ParamEntry {
    fn new(name: &str, entry_type: EntryType, shape: Shape, payload: Payload) -> Self {
        Self {
            name: name.to_string(),
            entry_type,
            shape,
            payload,
            fixed_length: None,
            bounds: Bounds::default(),
            is_private: false,
            is_set: false,
        }
    }

    pub fn scalar(name: &str, kind: ScalarKind, default: TypedValue) -> Self {
        Self::new(name, EntryType::value(kind), Shape::Scalar, Payload::Scalar(default))
    }

    pub fn array(name: &str, kind: ScalarKind, defaults: Vec<TypedValue>) -> Self {
        Self::new(name, EntryType::value(kind), Shape::Array, Payload::Array(defaults))
    }

    pub fn array_2d(name: &str, kind: ScalarKind, default: Grid) -> Self {
        Self::new(
            name,
            EntryType::value(kind),
            Shape::Array2D,
            Payload::Array2D(default),
        )
    }

    /// A single record when `array` is false, otherwise a record array.
    pub fn records(name: &str, def: RecordDef, array: bool, default: Records) -> Self {
        Self::new(
            name,
            EntryType::Record(def),
            Shape::Records { array },
            Payload::Records(default),
        )
    }

    /// Attach the symbol table for an enum-kind entry.
    pub fn with_enum(mut self, def: EnumDef) -> Self {
        if let EntryType::Value { enum_def, .. } = &mut self.entry_type {
            *enum_def = Some(def);
        }
        self
    }

    /// Require every load to produce exactly `len` elements (or instances).
    pub fn fixed_length(mut self, len: usize) -> Self {
        self.fixed_length = Some(len);
        self
    }

    pub fn min(mut self, value: TypedValue) -> Self {
        self.bounds.min = Some(value);
        self
    }

    pub fn max(mut self, value: TypedValue) -> Self {
        self.bounds.max = Some(value);
        self
    }

    /// Private entries keep their default; overrides are ignored with a
    /// warning.
    pub fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_type(&self) -> &EntryType {
        &self.entry_type
    }

    pub fn kind(&self) -> Option<ScalarKind> {
        self.entry_type.scalar_kind()
    }

    pub fn enum_def(&self) -> Option<&EnumDef> {
        match &self.entry_type {
            EntryType::Value { enum_def, .. } => enum_def.as_ref(),
            EntryType::Record(_) => None,
        }
    }

    pub fn record_def(&self) -> Option<&RecordDef> {
        match &self.entry_type {
            EntryType::Record(def) => Some(def),
            EntryType::Value { .. } => None,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn get_fixed_length(&self) -> Option<usize> {
        self.fixed_length
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub(crate) fn bounds_mut(&mut self) -> &mut Bounds {
        &mut self.bounds
    }

    pub fn is_private(&self) -> bool {
        self.is_private
    }

    pub fn is_set(&self) -> bool {
        self.is_set
    }

    /// Set but still holding `Deferred` values awaiting expansion.
    pub fn is_provisional(&self) -> bool {
        self.is_set && self.payload.has_deferred()
    }

    /// Replace the payload in one step and mark the entry set. The old
    /// payload is dropped here, after the new one is complete.
    pub(crate) fn install(&mut self, payload: Payload) {
        debug_assert_eq!(
            std::mem::discriminant(&payload),
            std::mem::discriminant(&self.payload)
        );
        debug!(
            param = %self.name,
            len = payload.len(),
            deferred = payload.has_deferred(),
            "committed value"
        );
        self.payload = payload;
        self.is_set = true;
    }

    pub(crate) fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }
}
