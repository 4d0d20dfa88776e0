#![deny(unsafe_code)]

//! Parameter trees, function registries and the JSON Schema subset used by
//! function-calling model APIs.
//!
//! ```
//! use funcall_core::{Func, Funcs, Param};
//!
//! let mut funcs = Funcs::new();
//! funcs
//!     .insert(
//!         "repeat",
//!         Func::new(
//!             "Repeat given string N times",
//!             vec![
//!                 Param::string("word").required(),
//!                 Param::number("count").required(),
//!             ],
//!         ),
//!     )
//!     .unwrap();
//!
//! let wire = funcs.encode().unwrap();
//! assert_eq!(wire[0]["parameters"]["required"][1], "count");
//! ```

pub mod dispatch;
pub mod error;
pub mod extract;
pub mod models;
pub mod registry;
pub mod schema;

pub use dispatch::Dispatcher;
pub use error::{CallError, DecodeError, EncodeError, ExtractError, RegistryError};
pub use extract::{as_shape, from_bytes, to_bytes};
pub use models::{EncodeOptions, FunctionCall, Param, ParamSchema, ParamType, Params};
pub use registry::{Callable, Func, Funcs, ToolFunc};
pub use schema::{FunctionDecl, ToolDecl};
