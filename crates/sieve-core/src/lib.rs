//! # sieve-core — Foundational Types for sieve
//!
//! The leaf crate of the workspace. It defines the data every schema
//! operates on and the failures every validation produces; it knows
//! nothing about how schemas are compiled or executed.
//!
//! ## Key Design Principles
//!
//! 1. **One closed value model.** Structured input of any origin (JSON,
//!    YAML, hand-built) is a [`Value`]. Kinds are exact: booleans,
//!    integers and floats never compare equal to each other.
//!
//! 2. **Type tags are explicit.** [`TypeTag`] lists the kinds each tag
//!    accepts. Booleans are never numeric.
//!
//! 3. **Errors aggregate.** [`ValidationError`] is either a single
//!    [`Invalid`] or a flattened [`MultipleInvalid`], each failure carrying
//!    its own path from the input root.
//!
//! 4. **Names are injected.** Diagnostic strings come from a
//!    [`NameFormatter`]; swapping it never changes validation outcomes.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sieve-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod names;
pub mod types;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use error::{ErrorCollector, Invalid, MultipleInvalid, PathSegment, ValidationError};
pub use names::{default_names, DefaultNames, DefaultNamesBuilder, NameFormatter};
pub use types::TypeTag;
pub use value::{ConversionError, Kind, Map, Value, ValueSet};
