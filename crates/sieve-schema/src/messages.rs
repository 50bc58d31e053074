//! Failure messages produced by the engine.

/// A value's kind differs from a literal's or container schema's kind.
pub const WRONG_VALUE_TYPE: &str = "Wrong value type";

/// A value is not accepted by a type schema.
pub const WRONG_TYPE: &str = "Wrong type";

/// A value has the right kind but the wrong content.
pub const INVALID_VALUE: &str = "Invalid value";

/// A `Required` key matched nothing.
pub const REQUIRED_KEY: &str = "Required key not provided";

/// A `Reject` marker matched a key.
pub const VALUE_REJECTED: &str = "Value rejected";

/// An input key matched no key schema under the `reject` policy.
pub const EXTRA_KEYS: &str = "Extra keys not allowed";
