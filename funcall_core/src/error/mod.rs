//! Error types for parameter trees, registries and dispatch

use serde_json::Error as JsonError;
use thiserror::Error;

use crate::models::ParamType;

/*───────────────────────────────────────────────────────────────────────────*/

/// A parameter tree could not be turned into a function-calling schema.
///
/// Paths are rooted at `$`: `$.quality.pros` names the `pros` property of
/// `quality`, and `$.ingredients[]` names the item type of `ingredients`.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A `string`, `number` or `boolean` node with nested children.
    #[error("parameter '{path}' has type {ty} and cannot carry nested items")]
    ScalarWithItems { path: String, ty: ParamType },

    /// An `array` node without an item type.
    #[error("array parameter '{path}' has no item type")]
    MissingArrayItems { path: String },

    /// An `array` node with several unnamed children, or named and unnamed
    /// children mixed together.
    #[error("array parameter '{path}' needs a single unnamed item type or only named fields")]
    AmbiguousArrayItems { path: String },

    /// A property with an empty name.
    #[error("unnamed property under '{parent}'")]
    UnnamedProperty { parent: String },

    /// Two siblings share a name.
    #[error("property '{name}' is declared twice under '{parent}'")]
    DuplicateProperty { parent: String, name: String },

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] JsonError),
}

/// Encoded JSON did not fit the requested target shape.
#[derive(Debug, Error)]
#[error("cannot decode into {target} at '{path}': {source} (value: {value})")]
pub struct DecodeError {
    /// Rust type name of the target shape.
    pub target: &'static str,
    /// Path inside the JSON document where decoding stopped.
    pub path: String,
    /// The JSON text that was being decoded.
    pub value: String,
    #[source]
    pub source: JsonError,
}

/// Failure of the encode-then-decode round trip.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Registry bookkeeping errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("function '{name}' is already registered")]
    AlreadyRegistered { name: String },

    #[error("function '{name}' not found")]
    FunctionNotFound { name: String },
}

/// All the ways a dispatched call can fail.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CallError {
    /// Tried to call a function that was never registered.
    #[error("function '{name}' not found")]
    FunctionNotFound { name: String },

    /// The function is registered for its schema only.
    #[error("function '{name}' has no handler attached")]
    Detached { name: String },

    /// Arguments were not JSON or did not fit the handler's argument type.
    #[error("invalid arguments: {0}")]
    Arguments(#[from] JsonError),

    /// The handler returned an error or its output could not be serialized.
    #[error("runtime error: {0}")]
    Runtime(String),
}
