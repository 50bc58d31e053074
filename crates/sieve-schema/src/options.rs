//! # Schema Options
//!
//! Compile-time configuration for a schema. Options are plain data and can
//! be loaded from a JSON or YAML document; every field has a default, so an
//! empty document yields [`SchemaOptions::default`].
//!
//! ```yaml
//! extra_keys: remove        # reject | allow | remove
//! default_keys: required    # optional | required
//! converted_faults: [assertion, type, value]
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::definition::FaultKind;
use crate::error::SchemaError;
use crate::markers::MarkerKind;

/// What happens to input keys no key schema matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraKeys {
    /// Each unmatched key is an error.
    #[default]
    Reject,
    /// Unmatched keys are kept, unsanitized.
    Allow,
    /// Unmatched keys are dropped silently.
    Remove,
}

impl FromStr for ExtraKeys {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reject" => Ok(Self::Reject),
            "allow" => Ok(Self::Allow),
            "remove" => Ok(Self::Remove),
            other => Err(SchemaError::UnknownPolicy {
                option: "extra_keys",
                value: other.to_string(),
            }),
        }
    }
}

/// The marker applied to mapping keys that carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultKeys {
    /// Bare keys may be absent.
    #[default]
    Optional,
    /// Bare keys must be present.
    Required,
}

impl DefaultKeys {
    pub(crate) fn marker(self) -> MarkerKind {
        match self {
            Self::Optional => MarkerKind::Optional,
            Self::Required => MarkerKind::Required,
        }
    }
}

impl FromStr for DefaultKeys {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "optional" => Ok(Self::Optional),
            "required" => Ok(Self::Required),
            other => Err(SchemaError::UnknownPolicy {
                option: "default_keys",
                value: other.to_string(),
            }),
        }
    }
}

/// Configuration applied when compiling a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    /// Extra-keys policy for every mapping that does not set its own.
    pub extra_keys: ExtraKeys,
    /// Marker for bare mapping keys.
    pub default_keys: DefaultKeys,
    /// Callable fault kinds converted into validation failures. Any other
    /// fault aborts validation.
    pub converted_faults: Vec<FaultKind>,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            extra_keys: ExtraKeys::default(),
            default_keys: DefaultKeys::default(),
            converted_faults: vec![FaultKind::Assertion, FaultKind::Type, FaultKind::Value],
        }
    }
}

impl SchemaOptions {
    /// Set the extra-keys policy.
    #[must_use]
    pub fn with_extra_keys(mut self, policy: ExtraKeys) -> Self {
        self.extra_keys = policy;
        self
    }

    /// Set the default key marker.
    #[must_use]
    pub fn with_default_keys(mut self, default: DefaultKeys) -> Self {
        self.default_keys = default;
        self
    }

    /// Replace the converted fault allow-list.
    #[must_use]
    pub fn with_converted_faults(mut self, kinds: impl IntoIterator<Item = FaultKind>) -> Self {
        self.converted_faults = kinds.into_iter().collect();
        self
    }

    /// Whether a fault of this kind becomes a validation failure.
    pub fn converts(&self, kind: FaultKind) -> bool {
        self.converted_faults.contains(&kind)
    }

    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json).map_err(|e| SchemaError::OptionsLoad(format!("invalid JSON: {e}")))
    }

    /// Parse options from a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(yaml).map_err(|e| SchemaError::OptionsLoad(format!("invalid YAML: {e}")))
    }
}
