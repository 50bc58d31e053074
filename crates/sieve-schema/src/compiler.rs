//! # Compiler
//!
//! One recursive pass from a [`Definition`] to an immutable tree of
//! [`Compiled`] nodes. Validation pattern-matches on the precomputed
//! [`Node`] tag; nothing about a definition's category is re-inspected per
//! call.
//!
//! Mapping entries become [`Marker`]s: the key is compiled as the marker's
//! key schema, the value as its value schema, and each marker is filled
//! exactly once. Malformed definitions are reported here, as a
//! [`SchemaError`], and never at validation time.

use std::collections::HashSet;

use sieve_core::{Kind, NameFormatter, TypeTag, Value};

use crate::definition::{Callable, Definition, MappingDef, SeqKind};
use crate::error::{Error, SchemaError};
use crate::mapping::MappingNode;
use crate::markers::{Marker, MarkerKind};
use crate::matchers;
use crate::options::SchemaOptions;
use crate::schema::Schema;

/// Read-only state shared by one validation call.
pub(crate) struct Context<'a> {
    pub(crate) names: &'a dyn NameFormatter,
    pub(crate) options: &'a SchemaOptions,
}

/// A compiled schema node.
#[derive(Debug)]
pub(crate) struct Compiled {
    /// Human-readable name, used in diagnostics.
    pub(crate) name: String,
    pub(crate) node: Node,
}

#[derive(Debug)]
pub(crate) enum Node {
    Literal(Value),
    Type(TypeTag),
    Callable(Callable),
    Iterable { kind: SeqKind, members: Vec<Compiled> },
    Mapping(MappingNode),
    MarkerRef(Box<Marker>),
    Nested(Schema),
}

impl Compiled {
    /// Validate `input`, returning its sanitized form.
    pub(crate) fn validate(&self, input: &Value, ctx: &Context<'_>) -> Result<Value, Error> {
        match &self.node {
            Node::Literal(expected) => Ok(matchers::literal(expected, &self.name, input, ctx)?),
            Node::Type(tag) => Ok(matchers::type_tag(*tag, &self.name, input, ctx)?),
            Node::Callable(callable) => matchers::callable(callable, &self.name, input, ctx),
            Node::Iterable { kind, members } => {
                matchers::iterable(*kind, members, &self.name, input, ctx)
            }
            Node::Mapping(mapping) => mapping.validate(&self.name, input, ctx),
            Node::MarkerRef(marker) => Ok(marker.validate_value(input, ctx)?),
            Node::Nested(schema) => schema.validate(input),
        }
    }

    /// Tie-break among markers of equal priority: literal keys first, then
    /// type keys, then everything else.
    pub(crate) fn category_rank(&self) -> i32 {
        match self.node {
            Node::Literal(_) => 100,
            Node::Type(_) => 50,
            _ => 0,
        }
    }

    pub(crate) fn as_literal(&self) -> Option<&Value> {
        match &self.node {
            Node::Literal(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn as_marker(&self) -> Option<&Marker> {
        match &self.node {
            Node::MarkerRef(marker) => Some(marker),
            _ => None,
        }
    }
}

/// Identity of a mapping key, for duplicate detection.
#[derive(Debug, PartialEq, Eq, Hash)]
enum KeyIdentity {
    Literal(Value),
    Type(TypeTag),
    Callable(usize),
    Extra,
}

impl KeyIdentity {
    fn of(kind: MarkerKind, schema: &Definition) -> Option<Self> {
        if kind == MarkerKind::Extra {
            return Some(Self::Extra);
        }
        match schema {
            Definition::Literal(v) => Some(Self::Literal(v.clone())),
            Definition::Type(tag) => Some(Self::Type(*tag)),
            Definition::Callable(c) => Some(Self::Callable(c.identity())),
            _ => None,
        }
    }
}

pub(crate) struct Compiler<'a> {
    options: &'a SchemaOptions,
    names: &'a dyn NameFormatter,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(options: &'a SchemaOptions, names: &'a dyn NameFormatter) -> Self {
        Self { options, names }
    }

    pub(crate) fn compile(&self, definition: &Definition) -> Result<Compiled, SchemaError> {
        let (name, node) = match definition {
            Definition::Literal(value) => {
                if !value.kind().is_scalar() {
                    return Err(SchemaError::UnsupportedLiteral(value.to_string()));
                }
                (self.names.literal_name(value), Node::Literal(value.clone()))
            }
            Definition::Type(tag) => (self.names.type_name(*tag), Node::Type(*tag)),
            Definition::Callable(callable) => (
                self.names.callable_name(callable.name(), callable.label()),
                Node::Callable(callable.clone()),
            ),
            Definition::Iterable(kind, items) => {
                let members = items
                    .iter()
                    .map(|item| self.compile(item))
                    .collect::<Result<Vec<_>, _>>()?;
                let alternatives: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
                let name = format!(
                    "{}[{}]",
                    self.names.kind_name(kind.kind()),
                    alternatives.join("|")
                );
                (name, Node::Iterable { kind: *kind, members })
            }
            Definition::Mapping(mapping) => (
                format!("{}[...]", self.names.kind_name(Kind::Dict)),
                Node::Mapping(self.compile_mapping(mapping)?),
            ),
            Definition::Marker(kind) => {
                if !kind.is_value_marker() {
                    return Err(SchemaError::ValueMarker(kind.to_string()));
                }
                let marker = Marker::new(*kind, None);
                marker.on_compiled(Some(kind.to_string()), None, None);
                (kind.to_string(), Node::MarkerRef(Box::new(marker)))
            }
            Definition::Schema(schema) => (schema.name().to_string(), Node::Nested(schema.clone())),
        };
        Ok(Compiled { name, node })
    }

    fn compile_mapping(&self, mapping: &MappingDef) -> Result<MappingNode, SchemaError> {
        let mut markers = Vec::with_capacity(mapping.entries.len());
        let mut seen = HashSet::new();

        for (key, value) in &mapping.entries {
            let kind = key
                .marker()
                .unwrap_or_else(|| self.options.default_keys.marker());
            if let Definition::Marker(inner) = key.schema() {
                return Err(SchemaError::MarkerAsKey(inner.to_string()));
            }

            let key_schema = self.compile(key.schema())?;
            if let Some(identity) = KeyIdentity::of(kind, key.schema()) {
                if !seen.insert(identity) {
                    return Err(SchemaError::DuplicateKey(key_schema.name));
                }
            }
            let value_schema = self.compile(value)?;

            let name = if kind == MarkerKind::Extra {
                kind.to_string()
            } else {
                key_schema.name.clone()
            };
            let marker = Marker::new(kind, Some(key.schema().clone()));
            marker.on_compiled(Some(name), Some(key_schema), Some(value_schema));
            markers.push(marker);
        }

        let extra_keys = mapping.extra_keys.unwrap_or(self.options.extra_keys);
        Ok(MappingNode::new(markers, extra_keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Key, MappingDef};
    use sieve_core::DefaultNames;

    fn compile(definition: impl Into<Definition>) -> Result<Compiled, SchemaError> {
        let options = SchemaOptions::default();
        let names = DefaultNames::new();
        Compiler::new(&options, &names).compile(&definition.into())
    }

    #[test]
    fn test_node_tags() {
        assert!(matches!(compile(1).unwrap().node, Node::Literal(Value::Int(1))));
        assert!(matches!(compile(TypeTag::Str).unwrap().node, Node::Type(TypeTag::Str)));
        assert!(matches!(
            compile(Definition::list([1])).unwrap().node,
            Node::Iterable { kind: SeqKind::List, .. }
        ));
        assert!(matches!(
            compile(Definition::reject()).unwrap().node,
            Node::MarkerRef(_)
        ));
    }

    #[test]
    fn test_names() {
        assert_eq!(compile(true).unwrap().name, "True");
        assert_eq!(compile(TypeTag::Int).unwrap().name, "Integer number");
        assert_eq!(
            compile(Definition::list([Definition::from(1), 2.into(), TypeTag::Str.into()]))
                .unwrap()
                .name,
            "List[1|2|String]"
        );
        assert_eq!(
            compile(Definition::callable("intify", |v| Ok(v.clone()))).unwrap().name,
            "intify()"
        );
        assert_eq!(
            compile(MappingDef::new().entry("a", 1)).unwrap().name,
            "Dictionary[...]"
        );
    }

    #[test]
    fn test_container_literal_rejected() {
        let err = compile(Value::list([1, 2])).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedLiteral(_)));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let err = compile(
            MappingDef::new()
                .entry(Key::required("a"), 1)
                .entry(Key::remove("a"), 2),
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateKey("a".to_string()));

        let err = compile(
            MappingDef::new()
                .entry(Key::extra(), TypeTag::Int)
                .entry(Key::extra(), Definition::reject()),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateKey(_)));

        // Same text, different kinds: not duplicates.
        assert!(compile(
            MappingDef::new()
                .entry("1", 1)
                .entry(1, 1)
                .entry(Definition::bytes("1"), 1)
        )
        .is_ok());
    }

    #[test]
    fn test_marker_misuse_rejected() {
        let err = compile(MappingDef::new().entry(Definition::reject(), 1)).unwrap_err();
        assert!(matches!(err, SchemaError::MarkerAsKey(_)));

        let err = compile(Definition::Marker(MarkerKind::Required)).unwrap_err();
        assert!(matches!(err, SchemaError::ValueMarker(_)));
    }

    #[test]
    fn test_bare_keys_take_default_marker() {
        let options = SchemaOptions::default().with_default_keys(crate::options::DefaultKeys::Required);
        let names = DefaultNames::new();
        let compiled = Compiler::new(&options, &names)
            .compile(&MappingDef::new().entry("a", 1).entry(Key::optional("b"), 2).into())
            .unwrap();
        let Node::Mapping(mapping) = compiled.node else {
            panic!("expected a mapping node");
        };
        let kinds: Vec<MarkerKind> = mapping.markers().iter().map(Marker::kind).collect();
        assert_eq!(kinds, [MarkerKind::Required, MarkerKind::Optional]);
    }
}
