//! # Error Types — Path-Annotated Validation Failures
//!
//! Defines the failure values produced by schema validation.
//!
//! ## Design
//!
//! - An [`Invalid`] is one failure: message, expected and provided
//!   descriptions, the path from the input root to the failure site, and
//!   the name of the responsible validator.
//! - A [`MultipleInvalid`] is an ordered collection of `Invalid`. Nested
//!   collections are flattened on construction.
//! - A [`ValidationError`] is what callers see: exactly one failure surfaces
//!   as `Single`, more than one as `Multiple`. [`ValidationError::collapse`]
//!   is the only place that decides between the two.
//! - Errors bubble up through mappings and iterables by prepending path
//!   segments ([`Invalid::prefixed`]) and filling in fields a child left
//!   unset ([`Invalid::enrich`]).

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::value::Value;

// ─── Path ────────────────────────────────────────────────────────────

/// One step on the path from the input root to a failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A mapping key.
    Key(Value),
    /// A position within a sequence or set.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl From<Value> for PathSegment {
    fn from(key: Value) -> Self {
        Self::Key(key)
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(Value::from(key))
    }
}

// ─── Invalid ─────────────────────────────────────────────────────────

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invalid {
    /// What went wrong.
    pub message: String,
    /// Description of the expected value, if known.
    pub expected: Option<String>,
    /// Description of the provided value, if known.
    pub provided: Option<String>,
    /// Path from the input root to the failure site.
    pub path: Vec<PathSegment>,
    /// Name of the validator that rejected the value.
    pub validator: Option<String>,
    /// Free-form structured details.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub info: BTreeMap<String, serde_json::Value>,
}

impl Invalid {
    /// A failure with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expected: None,
            provided: None,
            path: Vec::new(),
            validator: None,
            info: BTreeMap::new(),
        }
    }

    /// Set the expected description.
    #[must_use]
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Set the provided description.
    #[must_use]
    pub fn with_provided(mut self, provided: impl Into<String>) -> Self {
        self.provided = Some(provided.into());
        self
    }

    /// Replace the path.
    #[must_use]
    pub fn with_path<S: Into<PathSegment>>(mut self, path: impl IntoIterator<Item = S>) -> Self {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }

    /// Set the responsible validator.
    #[must_use]
    pub fn with_validator(mut self, validator: impl Into<String>) -> Self {
        self.validator = Some(validator.into());
        self
    }

    /// Attach a structured detail.
    #[must_use]
    pub fn with_info(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.info.insert(key.into(), value);
        self
    }

    /// Prepend a path segment.
    #[must_use]
    pub fn prefixed(mut self, segment: impl Into<PathSegment>) -> Self {
        self.path.insert(0, segment.into());
        self
    }

    /// Prepend `prefix` to the path and fill in whichever of `expected`,
    /// `provided` and `validator` are still unset.
    #[must_use]
    pub fn enrich(
        mut self,
        expected: Option<&str>,
        provided: Option<&str>,
        prefix: &[PathSegment],
        validator: Option<&str>,
    ) -> Self {
        if self.expected.is_none() {
            self.expected = expected.map(str::to_string);
        }
        if self.provided.is_none() {
            self.provided = provided.map(str::to_string);
        }
        if self.validator.is_none() {
            self.validator = validator.map(str::to_string);
        }
        if !prefix.is_empty() {
            self.path.splice(0..0, prefix.iter().cloned());
        }
        self
    }

    /// The path rendered as `[a, 0, b]`.
    pub fn path_display(&self) -> String {
        let segments: Vec<String> = self.path.iter().map(ToString::to_string).collect();
        format!("[{}]", segments.join(", "))
    }
}

impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if !self.path.is_empty() {
            write!(f, " @ {}", self.path_display())?;
        }
        match (&self.expected, &self.provided) {
            (Some(e), Some(p)) => write!(f, ": expected {e}, got {p}"),
            (Some(e), None) => write!(f, ": expected {e}"),
            (None, Some(p)) => write!(f, ": got {p}"),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for Invalid {}

// ─── MultipleInvalid ─────────────────────────────────────────────────

/// Several independent failures reported together.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MultipleInvalid {
    errors: Vec<Invalid>,
}

impl MultipleInvalid {
    /// Collect failures, flattening nested collections one level.
    pub fn new<E: Into<ValidationError>>(errors: impl IntoIterator<Item = E>) -> Self {
        Self {
            errors: errors
                .into_iter()
                .flat_map(|e| e.into().into_errors())
                .collect(),
        }
    }

    /// Returns the number of failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if there are no failures.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate the failures.
    pub fn iter(&self) -> std::slice::Iter<'_, Invalid> {
        self.errors.iter()
    }

    /// Returns a slice of all failures.
    pub fn errors(&self) -> &[Invalid] {
        &self.errors
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Invalid> {
        self.errors
    }
}

impl fmt::Display for MultipleInvalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation errors:", self.errors.len())?;
        for e in &self.errors {
            write!(f, "\n  {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MultipleInvalid {}

impl IntoIterator for MultipleInvalid {
    type Item = Invalid;
    type IntoIter = std::vec::IntoIter<Invalid>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a MultipleInvalid {
    type Item = &'a Invalid;
    type IntoIter = std::slice::Iter<'a, Invalid>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

// ─── ValidationError ─────────────────────────────────────────────────

/// The outcome of a failed validation.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValidationError {
    /// Exactly one failure.
    #[error(transparent)]
    Single(Invalid),
    /// Two or more failures, each with its own path.
    #[error("{0}")]
    Multiple(MultipleInvalid),
}

impl ValidationError {
    /// `None` for no failures, `Single` for one, `Multiple` otherwise.
    pub fn collapse(mut errors: Vec<Invalid>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop().map(Self::Single),
            _ => Some(Self::Multiple(MultipleInvalid { errors })),
        }
    }

    /// Returns the underlying failures.
    pub fn errors(&self) -> &[Invalid] {
        match self {
            Self::Single(e) => std::slice::from_ref(e),
            Self::Multiple(m) => m.errors(),
        }
    }

    /// Returns the number of failures.
    pub fn len(&self) -> usize {
        self.errors().len()
    }

    /// Always false; an empty error collapses to success.
    pub fn is_empty(&self) -> bool {
        self.errors().is_empty()
    }

    /// Consumes self and returns the failures.
    pub fn into_errors(self) -> Vec<Invalid> {
        match self {
            Self::Single(e) => vec![e],
            Self::Multiple(m) => m.into_inner(),
        }
    }

    /// Apply [`Invalid::prefixed`] to every failure.
    #[must_use]
    pub fn prefixed(self, segment: impl Into<PathSegment>) -> Self {
        let segment = segment.into();
        self.map(|e| e.prefixed(segment.clone()))
    }

    /// Apply [`Invalid::enrich`] to every failure.
    #[must_use]
    pub fn enrich(
        self,
        expected: Option<&str>,
        provided: Option<&str>,
        prefix: &[PathSegment],
        validator: Option<&str>,
    ) -> Self {
        self.map(|e| e.enrich(expected, provided, prefix, validator))
    }

    fn map(self, f: impl Fn(Invalid) -> Invalid) -> Self {
        match self {
            Self::Single(e) => Self::Single(f(e)),
            Self::Multiple(m) => Self::Multiple(MultipleInvalid {
                errors: m.errors.into_iter().map(f).collect(),
            }),
        }
    }
}

impl From<Invalid> for ValidationError {
    fn from(e: Invalid) -> Self {
        Self::Single(e)
    }
}

impl From<MultipleInvalid> for ValidationError {
    fn from(m: MultipleInvalid) -> Self {
        let mut errors = m.errors;
        if errors.len() == 1 {
            if let Some(e) = errors.pop() {
                return Self::Single(e);
            }
        }
        Self::Multiple(MultipleInvalid { errors })
    }
}

impl IntoIterator for ValidationError {
    type Item = Invalid;
    type IntoIter = std::vec::IntoIter<Invalid>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_errors().into_iter()
    }
}

// ─── Collector ───────────────────────────────────────────────────────

/// Accumulates failures across one mapping or iterable level.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<Invalid>,
}

impl ErrorCollector {
    /// An empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure (single or multiple).
    pub fn push(&mut self, error: impl Into<ValidationError>) {
        self.errors.extend(error.into().into_errors());
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of recorded failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// `Ok(value)` if nothing was recorded, the collapsed error otherwise.
    pub fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        match ValidationError::collapse(self.errors) {
            None => Ok(value),
            Some(e) => Err(e),
        }
    }
}
