//! # Schema Definitions
//!
//! The raw, declarative input to the compiler. A [`Definition`] is a tree of
//! literals, type tags, callables, iterables and mappings; mapping keys are
//! [`Key`]s, optionally wrapped in a marker that controls how they match.
//!
//! ```
//! use sieve_schema::{Definition, Key, MappingDef, TypeTag};
//!
//! let person: Definition = MappingDef::new()
//!     .entry(Key::required("name"), TypeTag::Str)
//!     .entry("age", TypeTag::Int)
//!     .entry(Key::extra(), Definition::remove())
//!     .into();
//! # let _ = person;
//! ```

use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sieve_core::{Invalid, Kind, TypeTag, ValidationError, Value};
use thiserror::Error;

use crate::error::BoxError;
use crate::markers::MarkerKind;
use crate::options::ExtraKeys;
use crate::schema::Schema;

// ─── Definition ──────────────────────────────────────────────────────

/// A raw schema definition.
#[derive(Debug, Clone)]
pub enum Definition {
    /// Matches by exact kind and equality.
    Literal(Value),
    /// Matches by kind.
    Type(TypeTag),
    /// Invokes a predicate that sanitizes or rejects the value.
    Callable(Callable),
    /// Matches a container of exactly this kind whose every element matches
    /// at least one member.
    Iterable(SeqKind, Vec<Definition>),
    /// Matches a dictionary.
    Mapping(MappingDef),
    /// A marker in value position, e.g. `{Extra: Reject}`.
    Marker(MarkerKind),
    /// An already-compiled schema.
    Schema(Schema),
}

impl Definition {
    /// The `None` literal.
    pub fn none() -> Self {
        Self::Literal(Value::None)
    }

    /// A byte-string literal.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Literal(Value::bytes(bytes))
    }

    /// A list schema.
    pub fn list<D: Into<Definition>>(members: impl IntoIterator<Item = D>) -> Self {
        Self::Iterable(SeqKind::List, members.into_iter().map(Into::into).collect())
    }

    /// A tuple schema.
    pub fn tuple<D: Into<Definition>>(members: impl IntoIterator<Item = D>) -> Self {
        Self::Iterable(SeqKind::Tuple, members.into_iter().map(Into::into).collect())
    }

    /// A set schema.
    pub fn set<D: Into<Definition>>(members: impl IntoIterator<Item = D>) -> Self {
        Self::Iterable(SeqKind::Set, members.into_iter().map(Into::into).collect())
    }

    /// A frozen-set schema.
    pub fn frozenset<D: Into<Definition>>(members: impl IntoIterator<Item = D>) -> Self {
        Self::Iterable(SeqKind::FrozenSet, members.into_iter().map(Into::into).collect())
    }

    /// A mapping schema from key/value pairs.
    pub fn mapping<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Key>,
        V: Into<Definition>,
    {
        Self::Mapping(MappingDef::from_entries(entries))
    }

    /// A callable schema.
    pub fn callable<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, Fault> + Send + Sync + 'static,
    {
        Self::Callable(Callable::new(name, func))
    }

    /// Value-position `Reject`: every matching key is an error.
    pub fn reject() -> Self {
        Self::Marker(MarkerKind::Reject)
    }

    /// Value-position `Remove`: every matching key is dropped.
    pub fn remove() -> Self {
        Self::Marker(MarkerKind::Remove)
    }

    /// Value-position `Allow`: every matching key is kept as-is.
    pub fn allow() -> Self {
        Self::Marker(MarkerKind::Allow)
    }
}

macro_rules! literal_definition {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Definition {
                fn from(v: $t) -> Self {
                    Self::Literal(Value::from(v))
                }
            }

            impl From<$t> for Key {
                fn from(v: $t) -> Self {
                    Self::bare(Definition::from(v))
                }
            }
        )*
    };
}

literal_definition!(bool, i32, i64, u32, f64, &str, String, ());

impl From<Value> for Definition {
    fn from(v: Value) -> Self {
        Self::Literal(v)
    }
}

impl From<TypeTag> for Definition {
    fn from(tag: TypeTag) -> Self {
        Self::Type(tag)
    }
}

impl From<Callable> for Definition {
    fn from(callable: Callable) -> Self {
        Self::Callable(callable)
    }
}

impl From<MappingDef> for Definition {
    fn from(mapping: MappingDef) -> Self {
        Self::Mapping(mapping)
    }
}

impl From<Schema> for Definition {
    fn from(schema: Schema) -> Self {
        Self::Schema(schema)
    }
}

impl From<MarkerKind> for Definition {
    fn from(kind: MarkerKind) -> Self {
        Self::Marker(kind)
    }
}

// ─── Iterable kinds ──────────────────────────────────────────────────

/// The container kind an iterable schema enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeqKind {
    /// `Value::List`.
    List,
    /// `Value::Tuple`.
    Tuple,
    /// `Value::Set`.
    Set,
    /// `Value::FrozenSet`.
    FrozenSet,
}

impl SeqKind {
    /// The value kind this schema accepts.
    pub fn kind(self) -> Kind {
        match self {
            Self::List => Kind::List,
            Self::Tuple => Kind::Tuple,
            Self::Set => Kind::Set,
            Self::FrozenSet => Kind::FrozenSet,
        }
    }

    /// Borrow the elements of `value` if it is exactly this kind.
    pub(crate) fn elements(self, value: &Value) -> Option<Vec<&Value>> {
        match (self, value) {
            (Self::List, Value::List(items)) | (Self::Tuple, Value::Tuple(items)) => {
                Some(items.iter().collect())
            }
            (Self::Set, Value::Set(items)) | (Self::FrozenSet, Value::FrozenSet(items)) => {
                Some(items.iter().collect())
            }
            _ => None,
        }
    }

    /// Build a container of this kind.
    pub(crate) fn build(self, items: Vec<Value>) -> Value {
        match self {
            Self::List => Value::List(items),
            Self::Tuple => Value::Tuple(items),
            Self::Set => Value::Set(items.into_iter().collect()),
            Self::FrozenSet => Value::FrozenSet(items.into_iter().collect()),
        }
    }
}

// ─── Keys and mappings ───────────────────────────────────────────────

/// A mapping key: a key schema, optionally wrapped in a marker.
#[derive(Debug, Clone)]
pub struct Key {
    marker: Option<MarkerKind>,
    schema: Definition,
}

impl Key {
    /// A key with no explicit marker; the mapping's default applies.
    pub fn bare(schema: impl Into<Definition>) -> Self {
        Self {
            marker: None,
            schema: schema.into(),
        }
    }

    /// A key wrapped in the given marker.
    pub fn marked(marker: MarkerKind, schema: impl Into<Definition>) -> Self {
        Self {
            marker: Some(marker),
            schema: schema.into(),
        }
    }

    /// The key must match at least one input key.
    pub fn required(schema: impl Into<Definition>) -> Self {
        Self::marked(MarkerKind::Required, schema)
    }

    /// The key may be absent.
    pub fn optional(schema: impl Into<Definition>) -> Self {
        Self::marked(MarkerKind::Optional, schema)
    }

    /// Matching input keys are deleted before anything else runs.
    pub fn remove(schema: impl Into<Definition>) -> Self {
        Self::marked(MarkerKind::Remove, schema)
    }

    /// Matching input keys are errors.
    pub fn reject(schema: impl Into<Definition>) -> Self {
        Self::marked(MarkerKind::Reject, schema)
    }

    /// Matching input keys are allowed; behaves like `optional`.
    pub fn allow(schema: impl Into<Definition>) -> Self {
        Self::marked(MarkerKind::Allow, schema)
    }

    /// Catch-all for input keys no other key claims.
    pub fn extra() -> Self {
        Self::marked(MarkerKind::Extra, TypeTag::Any)
    }

    /// The explicit marker, if any.
    pub fn marker(&self) -> Option<MarkerKind> {
        self.marker
    }

    /// The key schema.
    pub fn schema(&self) -> &Definition {
        &self.schema
    }
}

impl From<Definition> for Key {
    fn from(schema: Definition) -> Self {
        Self::bare(schema)
    }
}

impl From<Value> for Key {
    fn from(v: Value) -> Self {
        Self::bare(Definition::Literal(v))
    }
}

impl From<TypeTag> for Key {
    fn from(tag: TypeTag) -> Self {
        Self::bare(Definition::Type(tag))
    }
}

impl From<Callable> for Key {
    fn from(callable: Callable) -> Self {
        Self::bare(Definition::Callable(callable))
    }
}

/// A mapping definition: ordered entries plus an optional extra-keys policy.
#[derive(Debug, Clone, Default)]
pub struct MappingDef {
    /// Key/value schema pairs, in definition order.
    pub entries: Vec<(Key, Definition)>,
    /// Overrides the schema-wide extra-keys policy for this mapping.
    pub extra_keys: Option<ExtraKeys>,
}

impl MappingDef {
    /// An empty mapping definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from key/value pairs.
    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Key>,
        V: Into<Definition>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            extra_keys: None,
        }
    }

    /// Append an entry.
    #[must_use]
    pub fn entry(mut self, key: impl Into<Key>, value: impl Into<Definition>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Set the extra-keys policy for this mapping.
    #[must_use]
    pub fn extra_keys(mut self, policy: ExtraKeys) -> Self {
        self.extra_keys = Some(policy);
        self
    }
}

// ─── Callables ───────────────────────────────────────────────────────

type PredicateFn = dyn Fn(&Value) -> Result<Value, Fault> + Send + Sync;

/// A user predicate: returns the sanitized value or a [`Fault`].
#[derive(Clone)]
pub struct Callable {
    name: String,
    label: Option<String>,
    func: Arc<PredicateFn>,
}

impl Callable {
    /// Wrap a function. `name` is rendered as `name()` in diagnostics.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, Fault> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            label: None,
            func: Arc::new(func),
        }
    }

    /// Use `label` verbatim as the diagnostic name.
    #[must_use]
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The display label, if one was set.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Invoke the predicate.
    pub fn call(&self, value: &Value) -> Result<Value, Fault> {
        (self.func)(value)
    }

    /// Identity of the wrapped function; clones share it.
    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.func) as *const () as usize
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

// ─── Faults ──────────────────────────────────────────────────────────

/// Why a callable refused a value.
#[derive(Error, Debug)]
pub enum Fault {
    /// A precondition did not hold.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// The value has a type the callable cannot handle.
    #[error("type error: {0}")]
    Type(String),

    /// The value has the right type but unusable content.
    #[error("value error: {0}")]
    Value(String),

    /// The callable authored its own precise diagnostics.
    #[error(transparent)]
    Invalid(ValidationError),

    /// Anything else. Fatal unless listed in the converted allow-list.
    #[error(transparent)]
    Other(BoxError),
}

/// Category of a [`Fault`], used by the converted allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// [`Fault::Assertion`].
    Assertion,
    /// [`Fault::Type`].
    Type,
    /// [`Fault::Value`].
    Value,
    /// [`Fault::Other`].
    Other,
}

impl Fault {
    /// `Ok(())` if `condition` holds, an assertion fault otherwise.
    pub fn ensure(condition: bool, message: impl Into<String>) -> Result<(), Fault> {
        if condition {
            Ok(())
        } else {
            Err(Self::Assertion(message.into()))
        }
    }

    /// Wrap an arbitrary error.
    pub fn other(error: impl Into<BoxError>) -> Self {
        Self::Other(error.into())
    }

    /// The category, or `None` for callable-authored `Invalid`s.
    pub fn kind(&self) -> Option<FaultKind> {
        match self {
            Self::Assertion(_) => Some(FaultKind::Assertion),
            Self::Type(_) => Some(FaultKind::Type),
            Self::Value(_) => Some(FaultKind::Value),
            Self::Invalid(_) => None,
            Self::Other(_) => Some(FaultKind::Other),
        }
    }

    pub(crate) fn into_source(self) -> BoxError {
        match self {
            Self::Other(source) => source,
            other => Box::new(other),
        }
    }
}

impl From<ValidationError> for Fault {
    fn from(e: ValidationError) -> Self {
        Self::Invalid(e)
    }
}

impl From<Invalid> for Fault {
    fn from(e: Invalid) -> Self {
        Self::Invalid(ValidationError::Single(e))
    }
}

impl From<ParseIntError> for Fault {
    fn from(e: ParseIntError) -> Self {
        Self::Value(e.to_string())
    }
}

impl From<ParseFloatError> for Fault {
    fn from(e: ParseFloatError) -> Self {
        Self::Value(e.to_string())
    }
}
