//! # Type Tags
//!
//! A `TypeTag` is a schema that matches values by kind rather than by
//! content. Each concrete [`Kind`] has a tag of its own; `Number` and `Any`
//! are abstract tags that accept several kinds.
//!
//! Booleans are never numbers. `Number` lists the numeric kinds explicitly
//! and `Bool` is not among them, so `Int`, `Float` and `Number` all reject
//! `true`/`false`, and `Bool` rejects `1`.

use serde::{Deserialize, Serialize};

use crate::value::{Kind, Value};

/// A type schema: accepts any value whose kind it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    /// Only the `None` sentinel.
    None,
    /// Booleans.
    Bool,
    /// Integers.
    Int,
    /// Floats.
    Float,
    /// Integers or floats, never booleans.
    Number,
    /// Text strings.
    Str,
    /// Byte strings.
    Bytes,
    /// Lists.
    List,
    /// Tuples.
    Tuple,
    /// Sets.
    Set,
    /// Frozen sets.
    FrozenSet,
    /// Dictionaries.
    Dict,
    /// Any value at all.
    Any,
}

impl TypeTag {
    /// Subtype/instance check for a concrete kind.
    pub fn accepts(self, kind: Kind) -> bool {
        match self {
            Self::Any => true,
            Self::Number => matches!(kind, Kind::Int | Kind::Float),
            exact => Self::from(kind) == exact,
        }
    }

    /// Instance check for a value.
    pub fn matches(self, value: &Value) -> bool {
        self.accepts(value.kind())
    }

    /// The tag that matches exactly the kind of `value`.
    pub fn of(value: &Value) -> Self {
        Self::from(value.kind())
    }
}

impl From<Kind> for TypeTag {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::None => Self::None,
            Kind::Bool => Self::Bool,
            Kind::Int => Self::Int,
            Kind::Float => Self::Float,
            Kind::Str => Self::Str,
            Kind::Bytes => Self::Bytes,
            Kind::List => Self::List,
            Kind::Tuple => Self::Tuple,
            Kind::Set => Self::Set,
            Kind::FrozenSet => Self::FrozenSet,
            Kind::Dict => Self::Dict,
        }
    }
}
