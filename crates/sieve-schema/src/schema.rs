//! # Schema
//!
//! The public entry point: compile a [`Definition`] once, validate any
//! number of inputs against it.
//!
//! A `Schema` is an `Arc` around an immutable compiled tree. Cloning is
//! cheap, and one schema may validate independent inputs from several
//! threads at once.

use std::fmt;
use std::sync::Arc;

use sieve_core::{default_names, NameFormatter, Value};

use crate::compiler::{Compiled, Compiler, Context, Node};
use crate::definition::Definition;
use crate::error::{Error, SchemaError};
use crate::options::SchemaOptions;

/// A compiled, reusable validator.
#[derive(Clone)]
pub struct Schema {
    root: Arc<Compiled>,
    definition: Arc<Definition>,
    names: Arc<dyn NameFormatter>,
    options: Arc<SchemaOptions>,
}

impl Schema {
    /// Compile with default options and the default name formatter.
    pub fn compile(definition: impl Into<Definition>) -> Result<Self, SchemaError> {
        Self::compile_with(definition, SchemaOptions::default())
    }

    /// Compile with the given options.
    pub fn compile_with(
        definition: impl Into<Definition>,
        options: SchemaOptions,
    ) -> Result<Self, SchemaError> {
        Self::with_names(definition, options, default_names())
    }

    /// Compile with the given options and name formatter.
    pub fn with_names(
        definition: impl Into<Definition>,
        options: SchemaOptions,
        names: Arc<dyn NameFormatter>,
    ) -> Result<Self, SchemaError> {
        let definition = definition.into();
        let root = Compiler::new(&options, names.as_ref()).compile(&definition)?;

        let markers = match &root.node {
            Node::Mapping(mapping) => mapping.markers().len(),
            _ => 0,
        };
        tracing::debug!(schema = %root.name, markers, "compiled schema");

        Ok(Self {
            root: Arc::new(root),
            definition: Arc::new(definition),
            names,
            options: Arc::new(options),
        })
    }

    /// Validate `input`, returning its sanitized copy.
    ///
    /// The input is never modified.
    pub fn validate(&self, input: &Value) -> Result<Value, Error> {
        let ctx = Context {
            names: self.names.as_ref(),
            options: &self.options,
        };
        self.root.validate(input, &ctx)
    }

    /// Human-readable name of the root definition.
    pub fn name(&self) -> &str {
        &self.root.name
    }

    /// The definition this schema was compiled from.
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// The options this schema was compiled with.
    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.root.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root.name)
    }
}
