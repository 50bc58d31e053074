//! # Value Model — Dynamic Structured Data
//!
//! Defines `Value`, the in-memory representation of every input a schema
//! validates and every sanitized output it produces.
//!
//! ## Equality
//!
//! Equality is exact: `Int(1)`, `Float(1.0)` and `Bool(true)` are distinct
//! values of distinct kinds. Literal schemas depend on this to keep
//! booleans, integers and floats mutually exclusive.
//!
//! Floats compare with `f64::total_cmp` and hash by bit pattern, so `Value`
//! is `Eq + Ord + Hash` and can key dictionaries and populate sets. As a
//! consequence `NaN == NaN` and `0.0 != -0.0`.
//!
//! ## Conversions
//!
//! JSON documents convert losslessly into `Value` (integers that fit `i64`
//! stay integers, everything else becomes a float). YAML documents convert
//! the same way; tags are ignored and any scalar or container is accepted
//! as a mapping key.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Insertion-ordered dictionary of values.
pub type Map = IndexMap<Value, Value>;

/// Ordered set of values, used by both `Set` and `FrozenSet`.
pub type ValueSet = BTreeSet<Value>;

// ─── Kind ────────────────────────────────────────────────────────────

/// The concrete runtime kind of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// The absent-value sentinel.
    None,
    /// `true` / `false`.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// UTF-8 text.
    Str,
    /// Raw bytes.
    Bytes,
    /// Mutable ordered sequence.
    List,
    /// Immutable ordered sequence.
    Tuple,
    /// Mutable unordered collection of unique values.
    Set,
    /// Immutable unordered collection of unique values.
    FrozenSet,
    /// Key/value mapping.
    Dict,
}

impl Kind {
    /// Whether values of this kind hold other values.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Self::List | Self::Tuple | Self::Set | Self::FrozenSet | Self::Dict
        )
    }

    /// Whether values of this kind are scalars usable as literal schemas.
    pub fn is_scalar(self) -> bool {
        !self.is_container()
    }
}

// ─── Value ───────────────────────────────────────────────────────────

/// A dynamically typed structured value.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent-value sentinel.
    None,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// Text string.
    Str(String),
    /// Byte string.
    Bytes(Vec<u8>),
    /// Ordered, mutable sequence.
    List(Vec<Value>),
    /// Ordered, immutable sequence.
    Tuple(Vec<Value>),
    /// Unordered set.
    Set(ValueSet),
    /// Unordered, immutable set.
    FrozenSet(ValueSet),
    /// Insertion-ordered mapping.
    Dict(Map),
}

impl Value {
    /// Returns the concrete kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Self::None => Kind::None,
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::Str(_) => Kind::Str,
            Self::Bytes(_) => Kind::Bytes,
            Self::List(_) => Kind::List,
            Self::Tuple(_) => Kind::Tuple,
            Self::Set(_) => Kind::Set,
            Self::FrozenSet(_) => Kind::FrozenSet,
            Self::Dict(_) => Kind::Dict,
        }
    }

    /// Build a byte string.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Build a list from anything convertible into values.
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a tuple from anything convertible into values.
    pub fn tuple<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Build a set from anything convertible into values.
    pub fn set<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::Set(items.into_iter().map(Into::into).collect())
    }

    /// Build a frozen set from anything convertible into values.
    pub fn frozenset<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::FrozenSet(items.into_iter().map(Into::into).collect())
    }

    /// Build a dictionary from key/value pairs, preserving their order.
    pub fn dict<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::Dict(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns true for the `None` sentinel.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the boolean, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float, if this is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the text, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the mapping, if this is a `Dict`.
    pub fn as_dict(&self) -> Option<&Map> {
        match self {
            Self::Dict(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the elements of a `List` or `Tuple`.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) | Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Convert into a JSON value.
    ///
    /// Sets and tuples become arrays, bytes become arrays of integers, and
    /// non-string mapping keys are rendered with their literal name.
    /// Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn write_repr(&self, f: &mut fmt::Formatter<'_>, nested: bool) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) if nested => write!(f, "'{s}'"),
            Self::Str(s) => f.write_str(s),
            Self::Bytes(bytes) => {
                f.write_str("b'")?;
                for &b in bytes {
                    match b {
                        b'\'' => f.write_str("\\'")?,
                        b'\\' => f.write_str("\\\\")?,
                        b'\n' => f.write_str("\\n")?,
                        b'\t' => f.write_str("\\t")?,
                        0x20..=0x7e => write!(f, "{}", b as char)?,
                        _ => write!(f, "\\x{b:02x}")?,
                    }
                }
                f.write_str("'")
            }
            Self::List(items) => write_items(f, "[", "]", items.iter()),
            Self::Tuple(items) if items.len() == 1 => {
                f.write_str("(")?;
                items[0].write_repr(f, true)?;
                f.write_str(",)")
            }
            Self::Tuple(items) => write_items(f, "(", ")", items.iter()),
            Self::Set(items) if items.is_empty() => f.write_str("set()"),
            Self::Set(items) => write_items(f, "{", "}", items.iter()),
            Self::FrozenSet(items) if items.is_empty() => f.write_str("frozenset()"),
            Self::FrozenSet(items) => write_items(f, "frozenset({", "})", items.iter()),
            Self::Dict(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    k.write_repr(f, true)?;
                    f.write_str(": ")?;
                    v.write_repr(f, true)?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_items<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    close: &str,
    items: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item.write_repr(f, true)?;
    }
    f.write_str(close)
}

/// Renders the literal name of the value: bare text for top-level strings,
/// quoted text inside containers.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_repr(f, false)
    }
}

// ─── Equality, ordering, hashing ─────────────────────────────────────

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::None, Self::None) => Ordering::Equal,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (Self::Bytes(a), Self::Bytes(b)) => a.cmp(b),
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => a.cmp(b),
            (Self::Set(a), Self::Set(b)) | (Self::FrozenSet(a), Self::FrozenSet(b)) => a.cmp(b),
            (Self::Dict(a), Self::Dict(b)) => sorted_entries(a).cmp(&sorted_entries(b)),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Self::None => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            Self::Float(x) => x.to_bits().hash(state),
            Self::Str(s) => s.hash(state),
            Self::Bytes(b) => b.hash(state),
            Self::List(items) | Self::Tuple(items) => items.hash(state),
            Self::Set(items) | Self::FrozenSet(items) => {
                items.len().hash(state);
                for item in items {
                    item.hash(state);
                }
            }
            Self::Dict(map) => {
                // Order-insensitive, to agree with `Eq`.
                let mut combined: u64 = 0;
                for entry in map {
                    let mut h = DefaultHasher::new();
                    entry.hash(&mut h);
                    combined = combined.wrapping_add(h.finish());
                }
                map.len().hash(state);
                combined.hash(state);
            }
        }
    }
}

fn sorted_entries(map: &Map) -> Vec<(&Value, &Value)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort();
    entries
}

// ─── Conversions from Rust scalars ───────────────────────────────────

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Dict(map)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::None
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::None, Into::into)
    }
}

// ─── JSON / YAML ─────────────────────────────────────────────────────

/// Error converting an external document into a [`Value`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// A number that is neither an integer nor a float.
    #[error("unsupported number: {0}")]
    UnsupportedNumber(String),
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::None,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Dict(
                map.into_iter()
                    .map(|(k, v)| (Self::Str(k), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<serde_yaml::Value> for Value {
    type Error = ConversionError;

    fn try_from(yaml: serde_yaml::Value) -> Result<Self, Self::Error> {
        match yaml {
            serde_yaml::Value::Null => Ok(Self::None),
            serde_yaml::Value::Bool(b) => Ok(Self::Bool(b)),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(ConversionError::UnsupportedNumber(n.to_string()))
                }
            }
            serde_yaml::Value::String(s) => Ok(Self::Str(s)),
            serde_yaml::Value::Sequence(seq) => {
                let items: Result<Vec<Value>, _> = seq.into_iter().map(Self::try_from).collect();
                Ok(Self::List(items?))
            }
            serde_yaml::Value::Mapping(mapping) => {
                let mut map = Map::with_capacity(mapping.len());
                for (k, v) in mapping {
                    map.insert(Self::try_from(k)?, Self::try_from(v)?);
                }
                Ok(Self::Dict(map))
            }
            serde_yaml::Value::Tagged(tagged) => Self::try_from(tagged.value),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::None => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Bytes(b) => serializer.serialize_bytes(b),
            Self::List(items) | Self::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Set(items) | Self::FrozenSet(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Dict(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(&k.to_string(), v)?;
                }
                out.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kinds_are_exact() {
        assert_ne!(Value::Int(1), Value::Bool(true));
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::from("1"), Value::bytes("1"));
        assert_ne!(Value::list([1]), Value::tuple([1]));
        assert_eq!(Value::Int(1).kind(), Kind::Int);
        assert_eq!(Value::None.kind(), Kind::None);
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
        assert!(Kind::Bytes.is_scalar());
        assert!(!Kind::Dict.is_scalar());
    }

    #[test]
    fn test_dict_equality_ignores_order() {
        let a = Value::dict([("a", 1), ("b", 2)]);
        let b = Value::dict([("b", 2), ("a", 1)]);
        assert_eq!(a, b);

        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_values_usable_as_keys() {
        let mut map = Map::new();
        map.insert(Value::Int(1), Value::from("int"));
        map.insert(Value::Bool(true), Value::from("bool"));
        map.insert(Value::Float(1.0), Value::from("float"));
        map.insert(Value::tuple([1, 2]), Value::from("tuple"));
        assert_eq!(map.len(), 4);
        assert_eq!(map.get(&Value::Int(1)), Some(&Value::from("int")));
    }

    #[test]
    fn test_literal_names() {
        assert_eq!(Value::None.to_string(), "None");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::bytes("1").to_string(), "b'1'");
        assert_eq!(Value::bytes(vec![0u8, b'a']).to_string(), "b'\\x00a'");
        assert_eq!(Value::list([Value::Int(1), Value::from("a")]).to_string(), "[1, 'a']");
        assert_eq!(Value::tuple([1]).to_string(), "(1,)");
        assert_eq!(Value::Set(ValueSet::new()).to_string(), "set()");
        assert_eq!(Value::frozenset([2, 1]).to_string(), "frozenset({1, 2})");
        assert_eq!(Value::dict([("a", 1)]).to_string(), "{'a': 1}");
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({
            "name": "A",
            "age": 18,
            "ratio": 0.5,
            "tags": ["x", null, true]
        }));
        let map = value.as_dict().unwrap();
        assert_eq!(map[&Value::from("name")], Value::from("A"));
        assert_eq!(map[&Value::from("age")], Value::Int(18));
        assert_eq!(map[&Value::from("ratio")], Value::Float(0.5));
        assert_eq!(
            map[&Value::from("tags")],
            Value::list([Value::from("x"), Value::None, Value::Bool(true)])
        );
    }

    #[test]
    fn test_from_yaml_allows_non_string_keys() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            r#"
1: one
name: A
items:
  - 1
  - 2.5
"#,
        )
        .unwrap();
        let value = Value::try_from(yaml).unwrap();
        let map = value.as_dict().unwrap();
        assert_eq!(map[&Value::Int(1)], Value::from("one"));
        assert_eq!(
            map[&Value::from("items")],
            Value::list([Value::Int(1), Value::Float(2.5)])
        );
    }

    #[test]
    fn test_to_json() {
        let value = Value::dict([
            (Value::from("a"), Value::tuple([1, 2])),
            (Value::Int(7), Value::None),
        ]);
        assert_eq!(value.to_json(), json!({"a": [1, 2], "7": null}));
    }
}
