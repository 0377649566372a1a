//! Post-load numeric bound checks.
//!
//! Range checks are advisory: they run after a value is committed and report
//! every out-of-range element. Whether a violation is fatal is the caller's
//! decision.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::array::Grid;
use crate::entry::{ParamEntry, Payload};
use crate::value::TypedValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Below,
    Above,
}

/// One value outside its declared bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub label: String,
    /// Element index for arrays, `None` for scalars.
    pub index: Option<usize>,
    pub value: TypedValue,
    pub bound: TypedValue,
    pub side: Side,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Param '{}'", self.label)?;
        if let Some(i) = self.index {
            write!(f, "[{i}]")?;
        }
        let what = match self.side {
            Side::Below => "below minimum",
            Side::Above => "above maximum",
        };
        write!(f, ": {} is {what} {}", self.value, self.bound)
    }
}

fn check_one(
    entry: &ParamEntry,
    index: Option<usize>,
    value: &TypedValue,
    out: &mut Vec<Violation>,
) {
    // Deferred and non-numeric values have no comparable number yet.
    let Some(v) = value.as_f64() else {
        return;
    };
    let bounds = entry.bounds();
    let checks = [(&bounds.min, Side::Below), (&bounds.max, Side::Above)];
    for (bound, side) in checks {
        let Some(bound) = bound else { continue };
        let Some(b) = bound.as_f64() else { continue };
        // NaN compares false both ways; count it as outside the first bound.
        let outside = v.is_nan()
            || match side {
                Side::Below => v < b,
                Side::Above => v > b,
            };
        if outside {
            out.push(Violation {
                label: entry.name().to_string(),
                index,
                value: value.clone(),
                bound: bound.clone(),
                side,
            });
            if v.is_nan() {
                break;
            }
        }
    }
}

/// Compare the committed value(s) of a numeric entry against its bounds.
///
/// Every operand is widened to `f64`. Returns violations in element order;
/// an empty vector means everything is in range.
pub fn check_value_range(entry: &ParamEntry) -> Vec<Violation> {
    let mut out = Vec::new();
    let numeric = entry.kind().is_some_and(|k| k.is_numeric());
    if !numeric || entry.bounds().is_empty() {
        return out;
    }
    match entry.payload() {
        Payload::Scalar(v) => check_one(entry, None, v, &mut out),
        Payload::Array(values) | Payload::Array2D(Grid { values, .. }) => {
            for (i, v) in values.iter().enumerate() {
                check_one(entry, Some(i), v, &mut out);
            }
        }
        Payload::Records(_) => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScalarKind;

    fn int_array(values: &[i32]) -> ParamEntry {
        let mut e = ParamEntry::array("levels", ScalarKind::Int, vec![])
            .min(TypedValue::Int(0))
            .max(TypedValue::Int(10));
        e.install(Payload::Array(values.iter().copied().map(TypedValue::Int).collect()));
        e
    }

    #[test]
    fn reports_every_violation_in_order() {
        let mut e = ParamEntry::array("n", ScalarKind::Int, vec![])
            .min(TypedValue::Int(-5))
            .max(TypedValue::Int(5));
        e.install(Payload::Array(vec![
            TypedValue::Int(-6),
            TypedValue::Int(-5),
            TypedValue::Int(5),
            TypedValue::Int(6),
        ]));
        let v = check_value_range(&e);
        assert_eq!(v.len(), 2);
        assert_eq!((v[0].index, v[0].side), (Some(0), Side::Below));
        assert_eq!(v[0].value, TypedValue::Int(-6));
        assert_eq!((v[1].index, v[1].side), (Some(3), Side::Above));
        assert_eq!(v[1].value, TypedValue::Int(6));
    }

    #[test]
    fn in_range_values_report_nothing() {
        assert!(check_value_range(&int_array(&[0, 5, 10])).is_empty());
    }

    #[test]
    fn int_value_against_double_bound() {
        let mut e = ParamEntry::scalar("n", ScalarKind::Int, TypedValue::Int(0))
            .max(TypedValue::Double(2.5));
        e.install(Payload::Scalar(TypedValue::Int(3)));
        let v = check_value_range(&e);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].index, None);
        assert_eq!(v[0].side, Side::Above);
    }

    #[test]
    fn deferred_elements_are_skipped() {
        let mut e = int_array(&[]);
        e.install(Payload::Array(vec![
            TypedValue::Deferred("$(N)".into()),
            TypedValue::Int(11),
        ]));
        let v = check_value_range(&e);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].index, Some(1));
    }

    #[test]
    fn only_one_bound_set() {
        let mut e = ParamEntry::scalar("rate", ScalarKind::Float, TypedValue::Float(0.0))
            .min(TypedValue::Float(1.0));
        e.install(Payload::Scalar(TypedValue::Float(1e9)));
        assert!(check_value_range(&e).is_empty());
    }

    #[test]
    fn non_numeric_kinds_are_ignored() {
        let e = ParamEntry::scalar("name", ScalarKind::String, TypedValue::String("z".into()))
            .min(TypedValue::Int(0));
        assert!(check_value_range(&e).is_empty());
    }

    #[test]
    fn nan_is_one_violation() {
        let mut e = ParamEntry::scalar("gain", ScalarKind::Double, TypedValue::Double(0.5))
            .min(TypedValue::Double(0.0))
            .max(TypedValue::Double(1.0));
        e.install(Payload::Scalar(TypedValue::Double(f64::NAN)));
        let v = check_value_range(&e);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].side, Side::Below);

        let mut upper_only = ParamEntry::scalar("gain", ScalarKind::Float, TypedValue::Float(0.5))
            .max(TypedValue::Float(1.0));
        upper_only.install(Payload::Scalar(TypedValue::Float(f32::NAN)));
        let v = check_value_range(&upper_only);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].side, Side::Above);
    }

    #[test]
    fn violation_display() {
        let v = &check_value_range(&int_array(&[3, 12]))[0];
        assert_eq!(v.to_string(), "Param 'levels'[1]: 12 is above maximum 10");
    }
}
