//! Record (struct) loading.
//!
//! Each instance group supplies one value per field, in declaration order.
//! Fields may carry their name (`x = 1`), but position is what counts: a
//! name that disagrees with the declared field at that position is an error.
//!
//! All instances are decoded into one fresh flat buffer of
//! `count * field_count` values. Element `i` is field `i % field_count` of
//! instance `i / field_count`.

use crate::decode::{self, DecodeContext};
use crate::error::TdrpError;
use crate::syntax::{FieldItem, LeafGroup};
use crate::types::{FieldDef, RecordDef};
use crate::value::TypedValue;

/// Decoded record instances, flat.
#[derive(Debug, Clone, PartialEq)]
pub struct Records {
    pub values: Vec<TypedValue>,
    pub count: usize,
}

impl Records {
    pub fn empty() -> Self {
        Self {
            values: Vec::new(),
            count: 0,
        }
    }

    /// Field values of one instance.
    pub fn instance(&self, index: usize, field_count: usize) -> Option<&[TypedValue]> {
        let start = index.checked_mul(field_count)?;
        self.values.get(start..start + field_count)
    }
}

fn check_name(field: &FieldDef, item: &FieldItem<'_>, label: &str) -> Result<(), TdrpError> {
    match item.name {
        Some(name) if name.text() != field.name => Err(TdrpError::syntax(
            label,
            format!("expected field '{}', found '{}'", field.name, name.text()),
            name.location(),
        )),
        _ => Ok(()),
    }
}

/// Decode every instance field by field. Any failure discards everything
/// decoded so far.
pub fn load_records(
    instances: &[LeafGroup<FieldItem<'_>>],
    def: &RecordDef,
    ctx: &DecodeContext<'_>,
) -> Result<Records, TdrpError> {
    let field_count = def.field_count();
    let mut values = Vec::with_capacity(instances.len() * field_count);

    for (i, instance) in instances.iter().enumerate() {
        if instance.items.len() != field_count {
            return Err(TdrpError::cardinality(
                ctx.label,
                format!("record {i}"),
                field_count,
                instance.items.len(),
                instance.open,
            ));
        }
        for (field, item) in def.fields.iter().zip(&instance.items) {
            check_name(field, item, ctx.label)?;
            values.push(decode::decode(
                &item.value,
                field.kind,
                field.enum_def.as_ref(),
                ctx,
            )?);
        }
    }

    Ok(Records {
        values,
        count: instances.len(),
    })
}
