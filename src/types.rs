//! Schema vocabulary: scalar kinds, enum symbol tables, record layouts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The declared type of a scalar value or record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Bool,
    Int,
    Long,
    Float,
    Double,
    String,
    Enum,
}

impl ScalarKind {
    /// Int, Long, Float and Double: the kinds that take MIN/MAX sentinels and
    /// range checks.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ScalarKind::Int | ScalarKind::Long | ScalarKind::Float | ScalarKind::Double
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "boolean",
            ScalarKind::Int => "int",
            ScalarKind::Long => "long",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::String => "string",
            ScalarKind::Enum => "enum",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumSymbol {
    pub name: String,
    pub value: i32,
}

/// An ordered enum symbol table. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    symbols: Vec<EnumSymbol>,
}

impl EnumDef {
    /// Build a symbol table. Later duplicates of a name are dropped so the
    /// table keeps its first declaration.
    pub fn new<N: Into<String>>(name: &str, symbols: impl IntoIterator<Item = (N, i32)>) -> Self {
        let mut out: Vec<EnumSymbol> = Vec::new();
        for (sym, value) in symbols {
            let sym = sym.into();
            if out.iter().all(|s| s.name != sym) {
                out.push(EnumSymbol { name: sym, value });
            }
        }
        Self {
            name: name.to_string(),
            symbols: out,
        }
    }

    pub fn symbols(&self) -> &[EnumSymbol] {
        &self.symbols
    }

    /// Exact-match lookup in declaration order.
    pub fn lookup(&self, text: &str) -> Option<&EnumSymbol> {
        self.symbols.iter().find(|s| s.name == text)
    }

    /// Symbol name for an integer value (first declared wins).
    pub fn name_of(&self, value: i32) -> Option<&str> {
        self.symbols
            .iter()
            .find(|s| s.value == value)
            .map(|s| s.name.as_str())
    }

    pub fn symbol_names(&self) -> Vec<String> {
        self.symbols.iter().map(|s| s.name.clone()).collect()
    }
}

/// One field of a record layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: ScalarKind,
    pub enum_def: Option<EnumDef>,
}

impl FieldDef {
    pub fn new(name: &str, kind: ScalarKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            enum_def: None,
        }
    }

    pub fn with_enum(name: &str, def: EnumDef) -> Self {
        Self {
            name: name.to_string(),
            kind: ScalarKind::Enum,
            enum_def: Some(def),
        }
    }
}

/// Fields of a record in declaration order. Fields are positional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl RecordDef {
    pub fn new(name: &str, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.to_string(),
            fields,
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// What an entry stores: plain values of one kind, or records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntryType {
    Value {
        kind: ScalarKind,
        enum_def: Option<EnumDef>,
    },
    Record(RecordDef),
}

impl EntryType {
    pub fn value(kind: ScalarKind) -> Self {
        EntryType::Value {
            kind,
            enum_def: None,
        }
    }

    pub fn enumeration(def: EnumDef) -> Self {
        EntryType::Value {
            kind: ScalarKind::Enum,
            enum_def: Some(def),
        }
    }

    /// The scalar kind, or `None` for records.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            EntryType::Value { kind, .. } => Some(*kind),
            EntryType::Record(_) => None,
        }
    }
}

/// Schema shape of an entry. Fixed at construction, never changed by data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Scalar,
    Array,
    Array2D,
    /// One record (`array = false`) or an array of records.
    Records { array: bool },
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar => write!(f, "scalar"),
            Shape::Array => write!(f, "array"),
            Shape::Array2D => write!(f, "2-D array"),
            Shape::Records { array: false } => write!(f, "record"),
            Shape::Records { array: true } => write!(f, "record array"),
        }
    }
}
