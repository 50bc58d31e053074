//! # Diagnostic Names
//!
//! Human-readable names for types, literals and callables, used only to
//! build the `expected`/`provided`/`validator` strings of validation errors.
//! Names never influence validation outcomes.
//!
//! The formatter is injected: every compiled schema owns an
//! `Arc<dyn NameFormatter>`. [`default_names`] returns a shared, immutable
//! [`DefaultNames`]; custom type names are registered through
//! [`DefaultNames::builder`] before the formatter is frozen.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::types::TypeTag;
use crate::value::{Kind, Value};

/// Produces human-readable names for diagnostics.
pub trait NameFormatter: fmt::Debug + Send + Sync {
    /// Name of a type tag, e.g. `Integer number`.
    fn type_name(&self, tag: TypeTag) -> String;

    /// Name of a concrete kind.
    fn kind_name(&self, kind: Kind) -> String {
        self.type_name(TypeTag::from(kind))
    }

    /// Name of a literal value.
    fn literal_name(&self, value: &Value) -> String {
        value.to_string()
    }

    /// Name of a callable: its label if it has one, `name()` otherwise.
    fn callable_name(&self, name: &str, label: Option<&str>) -> String {
        match label {
            Some(label) => label.to_string(),
            None => format!("{name}()"),
        }
    }
}

/// The stock formatter, with optional per-tag overrides.
#[derive(Debug, Clone, Default)]
pub struct DefaultNames {
    overrides: HashMap<TypeTag, String>,
}

impl DefaultNames {
    /// A formatter with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start registering type name overrides.
    pub fn builder() -> DefaultNamesBuilder {
        DefaultNamesBuilder::default()
    }

    fn stock_name(tag: TypeTag) -> &'static str {
        match tag {
            TypeTag::None => "None",
            TypeTag::Bool => "Boolean",
            TypeTag::Int => "Integer number",
            TypeTag::Float => "Fractional number",
            TypeTag::Number => "Number",
            TypeTag::Str => "String",
            TypeTag::Bytes => "Binary String",
            TypeTag::List => "List",
            TypeTag::Tuple => "Tuple",
            TypeTag::Set => "Set",
            TypeTag::FrozenSet => "Frozen Set",
            TypeTag::Dict => "Dictionary",
            TypeTag::Any => "Any",
        }
    }
}

impl NameFormatter for DefaultNames {
    fn type_name(&self, tag: TypeTag) -> String {
        self.overrides
            .get(&tag)
            .cloned()
            .unwrap_or_else(|| Self::stock_name(tag).to_string())
    }
}

/// Collects type name overrides, then freezes them into a [`DefaultNames`].
#[derive(Debug, Default)]
pub struct DefaultNamesBuilder {
    overrides: HashMap<TypeTag, String>,
}

impl DefaultNamesBuilder {
    /// Register a human-friendly name for a type tag.
    #[must_use]
    pub fn type_name(mut self, tag: TypeTag, name: impl Into<String>) -> Self {
        self.overrides.insert(tag, name.into());
        self
    }

    /// Freeze the overrides.
    pub fn build(self) -> DefaultNames {
        DefaultNames {
            overrides: self.overrides,
        }
    }
}

/// The shared default formatter.
pub fn default_names() -> Arc<dyn NameFormatter> {
    static DEFAULT: OnceLock<Arc<DefaultNames>> = OnceLock::new();
    DEFAULT.get_or_init(|| Arc::new(DefaultNames::new())).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_type_names() {
        let names = DefaultNames::new();
        assert_eq!(names.type_name(TypeTag::None), "None");
        assert_eq!(names.type_name(TypeTag::Bool), "Boolean");
        assert_eq!(names.type_name(TypeTag::Int), "Integer number");
        assert_eq!(names.type_name(TypeTag::Float), "Fractional number");
        assert_eq!(names.type_name(TypeTag::Bytes), "Binary String");
        assert_eq!(names.kind_name(Kind::FrozenSet), "Frozen Set");
        assert_eq!(names.kind_name(Kind::Dict), "Dictionary");
    }

    #[test]
    fn test_overrides() {
        let names = DefaultNames::builder()
            .type_name(TypeTag::Int, "Whole number")
            .build();
        assert_eq!(names.type_name(TypeTag::Int), "Whole number");
        assert_eq!(names.type_name(TypeTag::Str), "String");
    }

    #[test]
    fn test_literal_and_callable_names() {
        let names = default_names();
        assert_eq!(names.literal_name(&Value::Bool(false)), "False");
        assert_eq!(names.callable_name("intify", None), "intify()");
        assert_eq!(names.callable_name("intify", Some("Integer")), "Integer");
    }
}
