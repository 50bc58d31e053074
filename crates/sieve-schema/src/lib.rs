//! # sieve-schema — Schema Compiler & Validation Engine
//!
//! Compiles declarative schema definitions into reusable validators. A
//! validator either returns a sanitized copy of its input or a report of
//! every failure found, each carrying the path from the input root.
//!
//! ```
//! use sieve_schema::{Definition, Key, MappingDef, Schema, TypeTag, Value};
//!
//! let schema = Schema::compile(
//!     MappingDef::new()
//!         .entry(Key::required("a"), TypeTag::Int)
//!         .entry("b", TypeTag::Str)
//!         .entry(Key::extra(), Definition::remove()),
//! )
//! .unwrap();
//!
//! let input = Value::dict([("a", Value::from(1)), ("b", "x".into()), ("c", 9.into())]);
//! let output = schema.validate(&input).unwrap();
//! assert_eq!(output, Value::dict([("a", Value::from(1)), ("b", "x".into())]));
//! ```
//!
//! ## Pipeline
//!
//! - [`Definition`]: the raw, declarative schema.
//! - `compiler`: one pass from a definition to an immutable tagged tree.
//!   Malformed definitions fail here with a [`SchemaError`].
//! - `matchers`: literal, type, callable and iterable leaves.
//! - [`markers`]: `Required`, `Optional`, `Remove`, `Reject`, `Allow`,
//!   `Extra`.
//! - `mapping`: priority-ordered key matching, extra-key policy, and
//!   aggregation of failures across one mapping level.
//! - [`Schema`]: the compiled result, shared read-only across validations.
//!
//! ## Crate Policy
//!
//! - Depends only on `sieve-core` internally.
//! - Validation never mutates its input; removals act on a borrowed view.
//! - A callable fault outside the converted allow-list is returned as
//!   [`Error::Fatal`], never reported as a validation failure.
//! - No `panic!()` or `.unwrap()` outside tests.

mod compiler;
pub mod definition;
pub mod error;
mod mapping;
pub mod markers;
mod matchers;
pub mod messages;
pub mod options;
pub mod schema;

pub use definition::{Callable, Definition, Fault, FaultKind, Key, MappingDef, SeqKind};
pub use error::{BoxError, Error, SchemaError};
pub use markers::MarkerKind;
pub use options::{DefaultKeys, ExtraKeys, SchemaOptions};
pub use schema::Schema;

// Re-export the core types every caller needs.
pub use sieve_core::{
    default_names, DefaultNames, Invalid, Kind, Map, MultipleInvalid, NameFormatter, PathSegment,
    TypeTag, ValidationError, Value,
};
