//! # Mapping Validation Engine
//!
//! Validates dictionary input against a compiled mapping node.
//!
//! ## Algorithm
//!
//! 1. Non-dictionary input fails with "wrong value type".
//! 2. Markers were sorted once, at construction: descending priority, then
//!    literal keys, type keys, everything else. The sort is stable, so
//!    definition order breaks the remaining ties.
//! 3. Every input key is tested against every marker. Literal keys are
//!    looked up in a side index instead of being run through a matcher.
//!    A key may match several markers; the `Extra` marker only sees keys
//!    nothing else matched.
//! 4. Markers execute in order against a live view of the input. `Remove`
//!    deletes from the view, so later markers only see surviving keys.
//! 5. Keys matched by no marker are resolved by the extra-keys policy.
//! 6. Each surviving match has its value validated by its marker's value
//!    schema. A key matched by several markers is validated by all of
//!    them; the first success (in marker order) supplies the output.
//! 7. Failures from steps 4 to 6 are reported together.
//!
//! The caller's value is never modified; the live view borrows from it.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use sieve_core::{ErrorCollector, Invalid, Kind, Map, PathSegment, Value};

use crate::compiler::Context;
use crate::error::Error;
use crate::markers::{Live, Marker, MarkerKind, Match};
use crate::messages;
use crate::options::ExtraKeys;

/// Compiled form of a mapping definition.
#[derive(Debug)]
pub(crate) struct MappingNode {
    /// Markers in execution order.
    markers: Vec<Marker>,
    /// Literal key to its marker's position in `markers`.
    literal_index: HashMap<Value, usize>,
    /// Position of the `Extra` marker, if the mapping has one.
    extra: Option<usize>,
    extra_keys: ExtraKeys,
}

/// Per-marker matches, indexed like `MappingNode::markers`.
type Matches<'a> = Vec<Vec<Match<'a>>>;

impl MappingNode {
    pub(crate) fn new(mut markers: Vec<Marker>, extra_keys: ExtraKeys) -> Self {
        markers.sort_by_key(|m| Reverse((m.priority(), m.category_rank())));

        let literal_index = markers
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.literal_key().map(|key| (key.clone(), i)))
            .collect();
        let extra = markers.iter().position(|m| m.kind() == MarkerKind::Extra);

        Self {
            markers,
            literal_index,
            extra,
            extra_keys,
        }
    }

    pub(crate) fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub(crate) fn validate(&self, name: &str, input: &Value, ctx: &Context<'_>) -> Result<Value, Error> {
        let Value::Dict(map) = input else {
            return Err(Invalid::new(messages::WRONG_VALUE_TYPE)
                .with_expected(ctx.names.kind_name(Kind::Dict))
                .with_provided(ctx.names.kind_name(input.kind()))
                .with_validator(name)
                .into());
        };
        tracing::trace!(mapping = name, keys = map.len(), "validating mapping");

        let mut live: Live<'_> = map.iter().collect();
        let (matches, claimed) = self.record_matches(&live, ctx)?;
        let mut errors = ErrorCollector::new();

        // ─── Marker execution ────────────────────────────────────────
        let mut accepted: Matches<'_> = Vec::with_capacity(self.markers.len());
        for (marker, found) in self.markers.iter().zip(matches) {
            let found: Vec<Match<'_>> = found
                .into_iter()
                .filter(|m| live.contains_key(m.key))
                .collect();
            match marker.execute(&mut live, found, ctx) {
                Ok(kept) => accepted.push(kept),
                Err(e) => {
                    errors.push(e);
                    accepted.push(Vec::new());
                }
            }
        }

        // ─── Extra keys ──────────────────────────────────────────────
        let extra: Vec<&Value> = live
            .keys()
            .copied()
            .filter(|key| !claimed.contains(key))
            .collect();
        if !extra.is_empty() {
            tracing::trace!(mapping = name, count = extra.len(), policy = ?self.extra_keys, "resolving extra keys");
        }
        for key in extra {
            match self.extra_keys {
                ExtraKeys::Reject => errors.push(
                    Invalid::new(messages::EXTRA_KEYS)
                        .with_provided(ctx.names.literal_name(key))
                        .with_path([PathSegment::Key(key.clone())])
                        .with_validator(MarkerKind::Extra.to_string()),
                ),
                ExtraKeys::Remove => {
                    live.shift_remove(key);
                }
                ExtraKeys::Allow => {}
            }
        }

        // ─── Values ──────────────────────────────────────────────────
        let mut sanitized: HashMap<&Value, (Value, Value)> = HashMap::new();
        for (marker, kept) in self.markers.iter().zip(accepted) {
            let Some(schema) = marker.value_schema() else {
                continue;
            };
            for m in kept {
                if !live.contains_key(m.key) {
                    continue;
                }
                // Value-position markers already ran during execution.
                let result = if schema.as_marker().is_some() {
                    Ok(m.value.clone())
                } else {
                    schema.validate(m.value, ctx)
                };
                match result {
                    Ok(value) => {
                        sanitized.entry(m.key).or_insert((m.normalized, value));
                    }
                    Err(Error::Invalid(e)) => errors.push(e.prefixed(PathSegment::Key(m.key.clone()))),
                    Err(fatal) => return Err(fatal),
                }
            }
        }

        errors.finish(())?;

        let output: Map = live
            .into_iter()
            .map(|(key, value)| {
                sanitized
                    .remove(key)
                    .unwrap_or_else(|| (key.clone(), value.clone()))
            })
            .collect();
        Ok(Value::Dict(output))
    }

    /// Test every live key against the markers' key schemas.
    ///
    /// Returns the matches per marker and the set of keys at least one
    /// marker matched.
    fn record_matches<'a>(
        &self,
        live: &Live<'a>,
        ctx: &Context<'_>,
    ) -> Result<(Matches<'a>, HashSet<&'a Value>), Error> {
        let mut matches: Matches<'a> = self.markers.iter().map(|_| Vec::new()).collect();
        let mut claimed = HashSet::new();

        for (&key, &value) in live {
            let mut hit = false;

            if let Some(&i) = self.literal_index.get(key) {
                matches[i].push(Match {
                    key,
                    normalized: key.clone(),
                    value,
                });
                hit = true;
            }

            for (i, marker) in self.markers.iter().enumerate() {
                if marker.kind() == MarkerKind::Extra || marker.literal_key().is_some() {
                    continue;
                }
                if let Some(normalized) = marker.match_key(key, ctx)? {
                    matches[i].push(Match {
                        key,
                        normalized,
                        value,
                    });
                    hit = true;
                }
            }

            if !hit {
                if let Some(i) = self.extra {
                    if let Some(normalized) = self.markers[i].match_key(key, ctx)? {
                        matches[i].push(Match {
                            key,
                            normalized,
                            value,
                        });
                        hit = true;
                    }
                }
            }

            if hit {
                claimed.insert(key);
            }
        }

        Ok((matches, claimed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Compiled, Compiler, Node};
    use crate::definition::{Definition, Fault, Key, MappingDef};
    use crate::options::SchemaOptions;
    use sieve_core::{DefaultNames, TypeTag, ValidationError};

    fn compile(mapping: MappingDef) -> Compiled {
        let options = SchemaOptions::default();
        let names = DefaultNames::new();
        Compiler::new(&options, &names).compile(&mapping.into()).unwrap()
    }

    fn run(compiled: &Compiled, input: &Value) -> Result<Value, Error> {
        let options = SchemaOptions::default();
        let names = DefaultNames::new();
        let ctx = Context {
            names: &names,
            options: &options,
        };
        compiled.validate(input, &ctx)
    }

    fn invalid(result: Result<Value, Error>) -> ValidationError {
        match result {
            Err(Error::Invalid(e)) => e,
            other => panic!("expected a validation failure, got {other:?}"),
        }
    }

    fn mapping_node(compiled: &Compiled) -> &MappingNode {
        match &compiled.node {
            Node::Mapping(node) => node,
            other => panic!("expected a mapping node, got {other:?}"),
        }
    }

    #[test]
    fn test_marker_order() {
        let compiled = compile(
            MappingDef::new()
                .entry(Key::extra(), TypeTag::Int)
                .entry(Definition::callable("any", |v| Ok(v.clone())), TypeTag::Int)
                .entry(TypeTag::Int, TypeTag::Int)
                .entry("a", TypeTag::Int)
                .entry(Key::remove("b"), TypeTag::Int),
        );
        let names: Vec<String> = mapping_node(&compiled)
            .markers()
            .iter()
            .map(Marker::repr)
            .collect();
        assert_eq!(
            names,
            [
                "Remove(b)",
                "Optional(a)",
                "Optional(Integer number)",
                "Optional(any())",
                "Extra"
            ]
        );
    }

    #[test]
    fn test_literal_index() {
        let compiled = compile(MappingDef::new().entry("a", 1).entry(TypeTag::Int, 2).entry(Key::extra(), 3));
        let node = mapping_node(&compiled);
        assert_eq!(node.literal_index.len(), 1);
        assert_eq!(node.literal_index.get(&Value::from("a")), Some(&0));
        assert_eq!(node.extra, Some(2));
    }

    #[test]
    fn test_wrong_value_type() {
        let compiled = compile(MappingDef::new().entry("a", 1));
        let err = invalid(run(&compiled, &Value::list([1])));
        let e = &err.errors()[0];
        assert_eq!(e.message, messages::WRONG_VALUE_TYPE);
        assert_eq!(e.expected.as_deref(), Some("Dictionary"));
        assert_eq!(e.provided.as_deref(), Some("List"));
        assert!(e.path.is_empty());
    }

    #[test]
    fn test_output_keeps_input_order() {
        let compiled = compile(
            MappingDef::new()
                .entry("b", TypeTag::Int)
                .entry("a", TypeTag::Int)
                .entry(TypeTag::Str, TypeTag::Any),
        );
        let input = Value::dict([("z", 0), ("a", 1), ("b", 2)]);
        assert_eq!(run(&compiled, &input).unwrap(), input);
    }

    #[test]
    fn test_overlapping_matches_all_validate() {
        let compiled = compile(MappingDef::new().entry("a", TypeTag::Int).entry(TypeTag::Str, TypeTag::Str));

        let err = invalid(run(&compiled, &Value::dict([("a", 1)])));
        assert_eq!(err.len(), 1);
        assert_eq!(err.errors()[0].message, messages::WRONG_TYPE);
        assert_eq!(err.errors()[0].path, vec![PathSegment::from("a")]);

        let compiled = compile(MappingDef::new().entry("a", TypeTag::Int).entry(TypeTag::Str, TypeTag::Any));
        let input = Value::dict([("a", 1)]);
        assert_eq!(run(&compiled, &input).unwrap(), input);
    }

    #[test]
    fn test_overlap_keeps_highest_ordered_sanitized_value() {
        let exclaim = Definition::callable("exclaim", |v| match v.as_str() {
            Some(s) => Ok(Value::from(format!("{s}!"))),
            None => Err(Fault::Type("not a string".to_string())),
        });
        let compiled = compile(
            MappingDef::new()
                .entry(TypeTag::Str, exclaim)
                .entry("a", TypeTag::Any),
        );
        let input = Value::dict([("a", "x"), ("b", "y")]);
        assert_eq!(
            run(&compiled, &input).unwrap(),
            Value::dict([("a", "x"), ("b", "y!")])
        );
    }

    #[test]
    fn test_extra_only_sees_unclaimed_keys() {
        let compiled = compile(
            MappingDef::new()
                .entry("a", TypeTag::Int)
                .entry(Key::extra(), Definition::reject()),
        );
        assert!(run(&compiled, &Value::dict([("a", 1)])).is_ok());

        let err = invalid(run(&compiled, &Value::dict([("a", 1), ("b", 2)])));
        let e = &err.errors()[0];
        assert_eq!(e.message, messages::VALUE_REJECTED);
        assert_eq!(e.path, vec![PathSegment::from("b")]);
    }

    #[test]
    fn test_caller_input_untouched_by_remove() {
        let compiled = compile(MappingDef::new().entry(Key::remove("a"), TypeTag::Any));
        let input = Value::dict([("a", 1)]);
        assert_eq!(run(&compiled, &input).unwrap(), Value::dict(Vec::<(Value, Value)>::new()));
        assert_eq!(input, Value::dict([("a", 1)]));
    }
}
