//! # Primitive Matchers
//!
//! Leaf evaluators for literal, type, callable and iterable nodes. Each
//! returns the sanitized value or the failure describing why the input was
//! refused; `name` is the compiled node's diagnostic name and doubles as the
//! failure's validator.

use sieve_core::{ErrorCollector, Invalid, TypeTag, Value};

use crate::compiler::{Compiled, Context};
use crate::definition::{Callable, Fault, SeqKind};
use crate::error::Error;
use crate::messages;

/// Exact kind, then equality.
pub(crate) fn literal(
    expected: &Value,
    name: &str,
    input: &Value,
    ctx: &Context<'_>,
) -> Result<Value, Invalid> {
    if input.kind() != expected.kind() {
        return Err(Invalid::new(messages::WRONG_VALUE_TYPE)
            .with_expected(ctx.names.kind_name(expected.kind()))
            .with_provided(ctx.names.kind_name(input.kind()))
            .with_validator(name));
    }
    if input != expected {
        return Err(Invalid::new(messages::INVALID_VALUE)
            .with_expected(ctx.names.literal_name(expected))
            .with_provided(ctx.names.literal_name(input))
            .with_validator(name));
    }
    Ok(input.clone())
}

pub(crate) fn type_tag(
    tag: TypeTag,
    name: &str,
    input: &Value,
    ctx: &Context<'_>,
) -> Result<Value, Invalid> {
    if tag.matches(input) {
        return Ok(input.clone());
    }
    Err(Invalid::new(messages::WRONG_TYPE)
        .with_expected(name)
        .with_provided(ctx.names.kind_name(input.kind()))
        .with_validator(name))
}

/// Invoke a user predicate.
///
/// Failures the callable authored itself are enriched with whatever they
/// left unset. Faults on the converted allow-list become a failure carrying
/// the fault's message. Anything else is fatal.
pub(crate) fn callable(
    callable: &Callable,
    name: &str,
    input: &Value,
    ctx: &Context<'_>,
) -> Result<Value, Error> {
    let fault = match callable.call(input) {
        Ok(value) => return Ok(value),
        Err(fault) => fault,
    };
    let provided = ctx.names.literal_name(input);

    match fault {
        Fault::Invalid(e) => Err(e.enrich(Some(name), Some(&provided), &[], Some(name)).into()),
        fault => match fault.kind() {
            Some(kind) if ctx.options.converts(kind) => Err(Invalid::new(fault.to_string())
                .with_expected(name)
                .with_provided(provided)
                .with_validator(name)
                .into()),
            _ => {
                tracing::warn!(callable = %name, fault = %fault, "callable raised a fatal fault");
                Err(Error::Fatal {
                    callable: name.to_string(),
                    source: fault.into_source(),
                })
            }
        },
    }
}

/// Exact container kind, then every element against any member.
pub(crate) fn iterable(
    kind: SeqKind,
    members: &[Compiled],
    name: &str,
    input: &Value,
    ctx: &Context<'_>,
) -> Result<Value, Error> {
    let Some(elements) = kind.elements(input) else {
        return Err(Invalid::new(messages::WRONG_VALUE_TYPE)
            .with_expected(ctx.names.kind_name(kind.kind()))
            .with_provided(ctx.names.kind_name(input.kind()))
            .with_validator(name)
            .into());
    };

    let mut errors = ErrorCollector::new();
    let mut output = Vec::with_capacity(elements.len());
    for (i, element) in elements.into_iter().enumerate() {
        match any_member(members, name, element, ctx) {
            Ok(value) => output.push(value),
            Err(Error::Invalid(e)) => errors.push(e.prefixed(i)),
            Err(fatal) => return Err(fatal),
        }
    }
    errors.finish(())?;

    Ok(kind.build(output))
}

/// First member that accepts `element` wins. A lone member reports its own
/// failure; with several, the failure names the whole iterable.
fn any_member(
    members: &[Compiled],
    name: &str,
    element: &Value,
    ctx: &Context<'_>,
) -> Result<Value, Error> {
    if let [only] = members {
        return only.validate(element, ctx);
    }
    for member in members {
        match member.validate(element, ctx) {
            Ok(value) => return Ok(value),
            Err(Error::Invalid(_)) => {}
            Err(fatal) => return Err(fatal),
        }
    }
    Err(Invalid::new(messages::INVALID_VALUE)
        .with_expected(name)
        .with_provided(ctx.names.literal_name(element))
        .with_validator(name)
        .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Compiler;
    use crate::definition::{Definition, FaultKind, MappingDef};
    use crate::options::SchemaOptions;
    use sieve_core::{DefaultNames, MultipleInvalid, PathSegment, ValidationError};

    fn check(definition: impl Into<Definition>, input: Value) -> Result<Value, Error> {
        check_with(SchemaOptions::default(), definition, input)
    }

    fn check_with(
        options: SchemaOptions,
        definition: impl Into<Definition>,
        input: Value,
    ) -> Result<Value, Error> {
        let names = DefaultNames::new();
        let compiled = Compiler::new(&options, &names)
            .compile(&definition.into())
            .unwrap();
        let ctx = Context {
            names: &names,
            options: &options,
        };
        compiled.validate(&input, &ctx)
    }

    fn single(result: Result<Value, Error>) -> Invalid {
        match result {
            Err(Error::Invalid(ValidationError::Single(e))) => e,
            other => panic!("expected a single failure, got {other:?}"),
        }
    }

    fn intify() -> Definition {
        Definition::callable("intify", |v| match v {
            Value::Int(i) => Ok(Value::Int(*i)),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::Str(s) => Ok(Value::Int(s.trim().parse::<i64>()?)),
            other => Err(Fault::Type(format!("cannot convert {other} to an integer"))),
        })
    }

    #[test]
    fn test_literal_kinds_are_exclusive() {
        assert_eq!(check(1, Value::Int(1)).unwrap(), Value::Int(1));

        let e = single(check(1, Value::Bool(true)));
        assert_eq!(e.message, messages::WRONG_VALUE_TYPE);
        assert_eq!(e.expected.as_deref(), Some("Integer number"));
        assert_eq!(e.provided.as_deref(), Some("Boolean"));

        let e = single(check(1, Value::Float(1.0)));
        assert_eq!(e.provided.as_deref(), Some("Fractional number"));

        let e = single(check(1.0, Value::Int(1)));
        assert_eq!(e.expected.as_deref(), Some("Fractional number"));
    }

    #[test]
    fn test_literal_value_mismatch() {
        let e = single(check(1, Value::Int(2)));
        assert_eq!(e.message, messages::INVALID_VALUE);
        assert_eq!(e.expected.as_deref(), Some("1"));
        assert_eq!(e.provided.as_deref(), Some("2"));
        assert_eq!(e.validator.as_deref(), Some("1"));

        let e = single(check(Definition::bytes("1"), Value::from("1")));
        assert_eq!(e.expected.as_deref(), Some("Binary String"));
        assert_eq!(e.provided.as_deref(), Some("String"));
    }

    #[test]
    fn test_literal_float_zero_is_sign_exact() {
        assert_eq!(check(0.0, Value::Float(0.0)).unwrap(), Value::Float(0.0));

        let e = single(check(0.0, Value::Float(-0.0)));
        assert_eq!(e.message, messages::INVALID_VALUE);
        assert_eq!(e.expected.as_deref(), Some("0.0"));
        assert_eq!(e.provided.as_deref(), Some("-0.0"));
    }

    #[test]
    fn test_type_excludes_bool_from_numbers() {
        assert!(check(TypeTag::Int, Value::Int(1)).is_ok());
        assert!(check(TypeTag::Number, Value::Float(1.5)).is_ok());
        for tag in [TypeTag::Int, TypeTag::Float, TypeTag::Number] {
            let e = single(check(tag, Value::Bool(true)));
            assert_eq!(e.message, messages::WRONG_TYPE);
            assert_eq!(e.provided.as_deref(), Some("Boolean"));
        }
        let e = single(check(TypeTag::Bool, Value::Int(1)));
        assert_eq!(e.expected.as_deref(), Some("Boolean"));
        assert_eq!(e.provided.as_deref(), Some("Integer number"));
    }

    #[test]
    fn test_callable_sanitizes() {
        assert_eq!(check(intify(), Value::Bool(true)).unwrap(), Value::Int(1));
        assert_eq!(check(intify(), Value::from(" 7")).unwrap(), Value::Int(7));
    }

    #[test]
    fn test_callable_converted_fault() {
        let e = single(check(intify(), Value::from("a")));
        assert!(e.message.starts_with("value error:"));
        assert_eq!(e.expected.as_deref(), Some("intify()"));
        assert_eq!(e.provided.as_deref(), Some("a"));
        assert_eq!(e.validator.as_deref(), Some("intify()"));

        let e = single(check(intify(), Value::None));
        assert!(e.message.starts_with("type error:"));
        assert_eq!(e.provided.as_deref(), Some("None"));
    }

    #[test]
    fn test_callable_authored_failure_is_enriched() {
        let number = Definition::callable("intify_ex", |v| {
            v.as_str()
                .and_then(|s| s.parse::<i64>().ok())
                .map(Value::Int)
                .ok_or_else(|| Invalid::new("Must be a number").with_expected("Number").into())
        });
        let e = single(check(number, Value::from("a")));
        assert_eq!(e.message, "Must be a number");
        assert_eq!(e.expected.as_deref(), Some("Number"));
        assert_eq!(e.provided.as_deref(), Some("a"));
        assert_eq!(e.validator.as_deref(), Some("intify_ex()"));

        let multi = Definition::callable("multi", |_| {
            let errors = MultipleInvalid::new([
                Invalid::new("first").with_path(["x"]),
                Invalid::new("second").with_expected("Even number"),
            ]);
            Err(ValidationError::from(errors).into())
        });
        let err = match check(MappingDef::new().entry("k", multi), Value::dict([("k", 3)])) {
            Err(Error::Invalid(e)) => e,
            other => panic!("expected a validation failure, got {other:?}"),
        };
        assert_eq!(err.len(), 2);
        let (first, second) = (&err.errors()[0], &err.errors()[1]);
        assert_eq!(first.message, "first");
        assert_eq!(first.expected.as_deref(), Some("multi()"));
        assert_eq!(first.provided.as_deref(), Some("3"));
        assert_eq!(first.validator.as_deref(), Some("multi()"));
        assert_eq!(first.path, vec![PathSegment::from("k"), PathSegment::from("x")]);
        assert_eq!(second.expected.as_deref(), Some("Even number"));
        assert_eq!(second.provided.as_deref(), Some("3"));
        assert_eq!(second.path, vec![PathSegment::from("k")]);
    }

    #[test]
    fn test_callable_fault_outside_allow_list_is_fatal() {
        let boom = Definition::callable("boom", |_| Err(Fault::other("disk on fire")));
        let err = check(boom.clone(), Value::None).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("boom()"));

        let options = SchemaOptions::default().with_converted_faults([FaultKind::Other]);
        let e = single(check_with(options, boom, Value::None));
        assert_eq!(e.message, "disk on fire");

        let options = SchemaOptions::default().with_converted_faults(Vec::new());
        assert!(check_with(options, intify(), Value::from("a")).unwrap_err().is_fatal());
    }

    #[test]
    fn test_iterable_kind_is_exact() {
        let schema = Definition::list([Definition::from(1), 2.into(), TypeTag::Str.into()]);
        let e = single(check(schema, Value::tuple(Vec::<Value>::new())));
        assert_eq!(e.message, messages::WRONG_VALUE_TYPE);
        assert_eq!(e.expected.as_deref(), Some("List"));
        assert_eq!(e.provided.as_deref(), Some("Tuple"));
    }

    #[test]
    fn test_iterable_element_failures() {
        let schema = Definition::list([Definition::from(1), 2.into(), TypeTag::Str.into()]);

        let e = single(check(schema.clone(), Value::list([Value::Bool(true)])));
        assert_eq!(e.message, messages::INVALID_VALUE);
        assert_eq!(e.expected.as_deref(), Some("List[1|2|String]"));
        assert_eq!(e.provided.as_deref(), Some("True"));
        assert_eq!(e.path, vec![PathSegment::Index(0)]);

        let err = check(schema, Value::list([4, 1, 5])).unwrap_err();
        let paths: Vec<_> = err.as_invalid().unwrap().errors().iter().map(|e| e.path.clone()).collect();
        assert_eq!(paths, [vec![PathSegment::Index(0)], vec![PathSegment::Index(2)]]);
    }

    #[test]
    fn test_iterable_single_member_reports_own_failure() {
        let e = single(check(Definition::list([TypeTag::Int]), Value::list([Value::Int(1), Value::None])));
        assert_eq!(e.message, messages::WRONG_TYPE);
        assert_eq!(e.expected.as_deref(), Some("Integer number"));
        assert_eq!(e.path, vec![PathSegment::Index(1)]);
    }

    #[test]
    fn test_iterable_sanitizes_elements() {
        let schema = Definition::list([intify(), TypeTag::Str.into()]);
        assert_eq!(
            check(schema.clone(), Value::list([Value::from("1"), Value::Int(1)])).unwrap(),
            Value::list([1, 1])
        );
        // Sanitizing can merge set members.
        let schema = Definition::set([intify()]);
        assert_eq!(
            check(schema, Value::set([Value::from("1"), Value::Int(1)])).unwrap(),
            Value::set([1])
        );
    }
}
