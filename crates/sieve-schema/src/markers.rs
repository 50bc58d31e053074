//! # Markers
//!
//! A marker wraps a mapping key and decides what happens to the input keys
//! its key schema matches.
//!
//! | Marker     | Priority | On execute                                         |
//! |------------|----------|----------------------------------------------------|
//! | `Remove`   | 1000     | deletes every match from the live input             |
//! | `Required` | 0        | fails if nothing matched                           |
//! | `Optional` | 0        | no-op                                              |
//! | `Allow`    | 0        | no-op                                              |
//! | `Reject`   | 0        | one "value rejected" failure per match             |
//! | `Extra`    | -1000    | delegates to its value, if the value is a marker   |
//!
//! Markers run in descending priority, so removals happen before any other
//! marker looks at the input. After its own action, a marker whose value
//! schema is itself a marker (`Key::extra()` mapped to `Definition::reject()`)
//! hands the surviving matches to that marker.

use std::fmt;
use std::sync::OnceLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sieve_core::{ErrorCollector, Invalid, PathSegment, ValidationError, Value};

use crate::compiler::{Compiled, Context};
use crate::definition::Definition;
use crate::error::Error;
use crate::messages;

/// The live view of a mapping input during one validation call.
pub(crate) type Live<'a> = IndexMap<&'a Value, &'a Value>;

/// Marker variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Key must be present.
    Required,
    /// Key may be absent.
    Optional,
    /// Matching keys are deleted first.
    Remove,
    /// Matching keys are errors.
    Reject,
    /// Matching keys are allowed.
    Allow,
    /// Catch-all for keys nothing else claimed.
    Extra,
}

impl MarkerKind {
    /// Execution priority; higher runs first.
    pub const fn priority(self) -> i32 {
        match self {
            Self::Remove => 1000,
            Self::Extra => -1000,
            Self::Required | Self::Optional | Self::Reject | Self::Allow => 0,
        }
    }

    /// Whether the marker may stand in value position.
    pub const fn is_value_marker(self) -> bool {
        matches!(self, Self::Remove | Self::Reject | Self::Allow)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Required => "Required",
            Self::Optional => "Optional",
            Self::Remove => "Remove",
            Self::Reject => "Reject",
            Self::Allow => "Allow",
            Self::Extra => "Extra",
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An input key matched by a marker.
#[derive(Debug, Clone)]
pub(crate) struct Match<'a> {
    /// The key as it appears in the input.
    pub(crate) key: &'a Value,
    /// The key as sanitized by the key schema.
    pub(crate) normalized: Value,
    pub(crate) value: &'a Value,
}

/// A compiled marker.
///
/// `name`, `key_schema` and `value_schema` are each filled at most once;
/// later fills are ignored.
#[derive(Debug)]
pub(crate) struct Marker {
    kind: MarkerKind,
    /// The raw key; `None` for markers in value position.
    key: Option<Definition>,
    name: OnceLock<String>,
    key_schema: OnceLock<Compiled>,
    value_schema: OnceLock<Compiled>,
}

impl Marker {
    pub(crate) fn new(kind: MarkerKind, key: Option<Definition>) -> Self {
        Self {
            kind,
            key,
            name: OnceLock::new(),
            key_schema: OnceLock::new(),
            value_schema: OnceLock::new(),
        }
    }

    /// Record compilation results. Fields already set are left untouched.
    pub(crate) fn on_compiled(
        &self,
        name: Option<String>,
        key_schema: Option<Compiled>,
        value_schema: Option<Compiled>,
    ) -> &Self {
        if let Some(name) = name {
            let _ = self.name.set(name);
        }
        if let Some(schema) = key_schema {
            let _ = self.key_schema.set(schema);
        }
        if let Some(schema) = value_schema {
            let _ = self.value_schema.set(schema);
        }
        self
    }

    pub(crate) fn kind(&self) -> MarkerKind {
        self.kind
    }

    pub(crate) fn priority(&self) -> i32 {
        self.kind.priority()
    }

    pub(crate) fn name(&self) -> &str {
        self.name.get().map_or(self.kind.as_str(), String::as_str)
    }

    pub(crate) fn key_schema(&self) -> Option<&Compiled> {
        self.key_schema.get()
    }

    pub(crate) fn value_schema(&self) -> Option<&Compiled> {
        self.value_schema.get()
    }

    /// `Required(a)`, `Extra`, `Reject`.
    pub(crate) fn repr(&self) -> String {
        if self.kind == MarkerKind::Extra || self.key.is_none() {
            self.kind.to_string()
        } else {
            format!("{}({})", self.kind, self.name())
        }
    }

    pub(crate) fn category_rank(&self) -> i32 {
        self.key_schema().map_or(0, Compiled::category_rank)
    }

    /// The literal this marker's key schema matches, if it is a literal.
    pub(crate) fn literal_key(&self) -> Option<&Value> {
        if self.kind == MarkerKind::Extra {
            return None;
        }
        self.key_schema().and_then(Compiled::as_literal)
    }

    fn value_marker(&self) -> Option<&Marker> {
        self.value_schema().and_then(Compiled::as_marker)
    }

    /// Test an input key against the key schema.
    ///
    /// `Ok(Some(normalized))` on a match, `Ok(None)` if the key schema
    /// rejects the key. Fatal callable faults propagate.
    pub(crate) fn match_key(&self, key: &Value, ctx: &Context<'_>) -> Result<Option<Value>, Error> {
        let Some(schema) = self.key_schema() else {
            return Ok(None);
        };
        match schema.validate(key, ctx) {
            Ok(normalized) => Ok(Some(normalized)),
            Err(Error::Invalid(_)) => Ok(None),
            Err(fatal) => Err(fatal),
        }
    }

    /// Run the marker against the live input and its matches.
    pub(crate) fn execute<'a>(
        &self,
        live: &mut Live<'a>,
        matches: Vec<Match<'a>>,
        ctx: &Context<'_>,
    ) -> Result<Vec<Match<'a>>, ValidationError> {
        tracing::trace!(marker = %self.repr(), matches = matches.len(), "executing marker");

        match self.kind {
            MarkerKind::Required if matches.is_empty() => {
                return Err(self.missing().into());
            }
            MarkerKind::Remove => {
                for m in &matches {
                    live.shift_remove(&m.key);
                }
            }
            MarkerKind::Reject if !matches.is_empty() => {
                let mut errors = ErrorCollector::new();
                for m in &matches {
                    errors.push(self.rejected(m.key, m.value, ctx));
                }
                errors.finish(())?;
            }
            _ => {}
        }

        // Only keys still present in the live view are handed on.
        let matches: Vec<Match<'a>> = matches
            .into_iter()
            .filter(|m| live.contains_key(m.key))
            .collect();
        match self.value_marker() {
            Some(inner) => inner.execute(live, matches, ctx),
            None => Ok(matches),
        }
    }

    /// Validate a value against a marker in value position.
    pub(crate) fn validate_value(&self, input: &Value, ctx: &Context<'_>) -> Result<Value, Invalid> {
        match self.kind {
            MarkerKind::Reject => Err(Invalid::new(messages::VALUE_REJECTED)
                .with_provided(ctx.names.literal_name(input))
                .with_validator(self.repr())),
            _ => Ok(input.clone()),
        }
    }

    fn missing(&self) -> Invalid {
        let path = match &self.key {
            Some(Definition::Literal(key)) => vec![PathSegment::Key(key.clone())],
            _ => Vec::new(),
        };
        Invalid::new(messages::REQUIRED_KEY)
            .with_expected(self.name())
            .with_path(path)
            .with_validator(self.repr())
    }

    fn rejected(&self, key: &Value, value: &Value, ctx: &Context<'_>) -> Invalid {
        Invalid::new(messages::VALUE_REJECTED)
            .with_provided(ctx.names.literal_name(value))
            .with_path([PathSegment::Key(key.clone())])
            .with_validator(self.repr())
    }
}
