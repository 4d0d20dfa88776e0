//! Describe functions once, hand them to a function-calling model API.
//!
//! The building blocks live in [`funcall_core`]; the API error boundary in
//! `funcall_api` is re-exported as [`api`] when the `api` feature is on.

pub mod prelude;

pub use funcall_core::{
    as_shape, from_bytes, to_bytes, CallError, Callable, DecodeError, Dispatcher, EncodeError,
    EncodeOptions, ExtractError, Func, FunctionCall, FunctionDecl, Funcs, Param, ParamSchema,
    ParamType, Params, RegistryError, ToolDecl, ToolFunc,
};

#[cfg(feature = "api")]
pub use funcall_api as api;
