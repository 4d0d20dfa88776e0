//! Convenient re-exports for common usage patterns.
//!
//! ```rust
//! use funcall_rs::prelude::*;
//! ```

// Describing functions
pub use crate::{Callable, Func, Funcs, Param, ParamType, Params};

// Encoding and extraction
pub use crate::{as_shape, EncodeOptions, FunctionDecl};

// Dispatching model calls
pub use crate::{Dispatcher, FunctionCall};

// Errors
pub use crate::{CallError, DecodeError, EncodeError, ExtractError, RegistryError};

#[cfg(feature = "api")]
pub use crate::api::{ClientError, RateLimit};
