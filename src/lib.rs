//! Typed value loading and validation for TDRP parameter files.
//!
//! A parameter file is a sequence of `label = value ;` statements. A program
//! declares a [`ParamTable`] of [`ParamEntry`] values up front: each entry
//! knows its name, its type, its shape (scalar, 1-D array, 2-D array, single
//! record or record array), optional numeric bounds and an optional fixed
//! length. Loading walks a token stream and fills every entry whose label
//! appears, decoding text into [`TypedValue`]s and checking structure as it
//! goes.
//!
//! ```ignore
//! let mut table = ParamTable::new(vec![
//!     ParamEntry::scalar("nbeams", ScalarKind::Int, TypedValue::Int(360)),
//!     ParamEntry::array("levels", ScalarKind::Int, vec![])
//!         .min(TypedValue::Int(0))
//!         .max(TypedValue::Int(10)),
//! ]);
//! let report = table.load_tokens(&tokens, &LoadOptions::from_env()?)?;
//! ```
//!
//! Lexing is not part of this crate. Callers hand in [`Token`]s carrying the
//! token text, its source line, and whether it was a quoted string.
//!
//! # Value grammar
//!
//! ```text
//! scalar       label = value ;
//! array        label = { v , v , ... } ;       label = v ;  (one element)
//! 2-D array    label = { { v , v } , { v , v } } ;
//! record       label = { field = v , field = v } ;
//! record array label = { { ... } , { ... } } ;
//! ```
//!
//! Record fields may be named or positional, but a name that disagrees with
//! the field at that position is an error. Trailing commas are accepted.
//!
//! When a label appears more than once, the last top-level statement wins.
//! This is how override lists layered after a file take effect.
//!
//! # Decoding
//!
//! - **Booleans** accept `true`/`false`, `t`/`f`, `yes`/`no`, `y`/`n` and
//!   `1`/`0`, in any case.
//! - **Numbers** accept `MIN` and `MAX` as the extremes of their kind. For
//!   `Float` and `Double`, `MIN` is the smallest positive normal value.
//!   Text that overflows the kind, or reads `inf` or `NaN`, is a type error.
//! - **Enums** accept only their declared symbol names.
//! - **Strings** accept any token, quoted or not.
//!
//! # Environment references
//!
//! Text may contain `$(NAME)` references. With
//! [`expand_env`](LoadOptions::expand_env) on (the default) every token is
//! expanded before decoding, and string values are expanded again after
//! loading. With it off, a non-string value whose text still contains a
//! reference is stored as [`TypedValue::Deferred`] instead of failing; call
//! [`ParamTable::resolve_deferred`] once the environment is known.
//!
//! Expansion is a single pass. Text substituted for a reference is not
//! scanned again, so references inside a variable's value stay literal.
//!
//! # Atomicity
//!
//! A reader decodes into a scratch value and installs it into the entry only
//! after every element and every structural check has passed. A failed read
//! leaves the entry exactly as it was, and one failed entry never stops the
//! rest of the table from loading.
//!
//! # Range checks
//!
//! Bounds are advisory. [`check_value_range`] reports every out-of-range
//! element after the value is committed. [`LoadOptions::range_check_fatal`]
//! decides whether the table load turns violations into an error.
//!
//! # Errors
//!
//! Every failure is a [`TdrpError`] carrying the entry label and, where one
//! exists, the [`Location`] of the offending token. [`TdrpError::category`]
//! sorts them into syntax, type, cardinality and range failures.

pub mod array;
pub mod decode;
pub mod entry;
pub mod env;
pub mod error;
pub mod options;
pub mod range;
pub mod read;
pub mod record;
pub mod syntax;
pub mod table;
pub mod token;
pub mod types;
pub mod value;

#[cfg(test)]
mod fixtures;

pub use array::Grid;
pub use entry::{Bounds, ParamEntry, Payload};
pub use error::{ErrorCategory, TdrpError};
pub use options::LoadOptions;
pub use range::{Side, Violation, check_value_range};
pub use read::{read_array, read_array_2d, read_entry, read_max, read_min, read_records, read_scalar};
pub use record::Records;
pub use table::{LoadReport, ParamTable};
pub use token::{Location, Token};
pub use types::{EntryType, EnumDef, EnumSymbol, FieldDef, RecordDef, ScalarKind, Shape};
pub use value::TypedValue;
