//! Function descriptors and the name-keyed registry

use std::{collections::HashMap, convert::Infallible, fmt, future::Future, sync::Arc};

use futures::{FutureExt, future::BoxFuture};
use serde::{Serialize, Serializer, de::DeserializeOwned, ser::SerializeSeq};
use serde_json::Value;

use crate::error::{CallError, EncodeError, RegistryError};
use crate::models::{EncodeOptions, Params};
use crate::schema::{FunctionDecl, ToolDecl};

/// Type-erased async handler: JSON arguments in, JSON result out.
pub type ToolFunc = dyn Fn(Value) -> BoxFuture<'static, Result<Value, CallError>> + Send + Sync;

// ============================================================================
// CALLABLES
// ============================================================================

/// What a registered function can be invoked as.
///
/// The registry only carries this value; [`crate::Dispatcher`] is the one
/// that calls it.
#[derive(Clone, Default)]
pub enum Callable {
    /// Declared for its schema only.
    #[default]
    Detached,
    Handler(Arc<ToolFunc>),
}

impl Callable {
    /// Wrap an async function taking a typed argument object.
    pub fn new<I, O, F, Fut>(func: F) -> Self
    where
        I: 'static + DeserializeOwned + Send,
        O: 'static + Serialize + Send,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = O> + Send + 'static,
    {
        Self::try_new(move |input: I| func(input).map(Ok::<O, Infallible>))
    }

    /// Like [`Callable::new`] for functions that can fail; the error's
    /// message becomes [`CallError::Runtime`].
    pub fn try_new<I, O, E, F, Fut>(func: F) -> Self
    where
        I: 'static + DeserializeOwned + Send,
        O: 'static + Serialize + Send,
        E: fmt::Display,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
    {
        let func_arc: Arc<F> = Arc::new(func);
        Callable::Handler(Arc::new(
            move |raw: Value| -> BoxFuture<'static, Result<Value, CallError>> {
                let func = Arc::clone(&func_arc);
                async move {
                    let input: I = serde_json::from_value(raw)?;
                    let output = (func)(input)
                        .await
                        .map_err(|e| CallError::Runtime(e.to_string()))?;
                    serde_json::to_value(output).map_err(|e| CallError::Runtime(e.to_string()))
                }
                .boxed()
            },
        ))
    }

    /// Wrap a plain synchronous function.
    pub fn sync<I, O, F>(func: F) -> Self
    where
        I: 'static + DeserializeOwned + Send,
        O: 'static + Serialize + Send,
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        Self::new(move |input: I| futures::future::ready(func(input)))
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, Callable::Detached)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Detached => f.write_str("Detached"),
            Callable::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

// ============================================================================
// DESCRIPTORS
// ============================================================================

/// A function description. Its name is the key it is registered under.
#[derive(Debug, Clone, Default)]
pub struct Func {
    pub description: String,
    pub parameters: Params,
    pub value: Callable,
}

impl Func {
    pub fn new(description: impl Into<String>, parameters: impl Into<Params>) -> Self {
        Self {
            description: description.into(),
            parameters: parameters.into(),
            value: Callable::Detached,
        }
    }

    pub fn with_value(mut self, value: Callable) -> Self {
        self.value = value;
        self
    }

    pub fn declaration(&self, name: &str) -> FunctionDecl {
        FunctionDecl::new(name, self.description.clone(), self.parameters.clone())
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Functions keyed by unique name.
///
/// Encoding always lists functions in ascending name order, whatever the
/// insertion order was.
#[derive(Debug, Clone, Default)]
pub struct Funcs {
    funcs: HashMap<String, Func>,
}

impl Funcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, func: Func) -> Result<&mut Self, RegistryError> {
        let name = name.into();
        if self.funcs.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered { name });
        }
        self.funcs.insert(name, func);
        Ok(self)
    }

    pub fn remove(&mut self, name: &str) -> Result<Func, RegistryError> {
        self.funcs
            .remove(name)
            .ok_or_else(|| RegistryError::FunctionNotFound {
                name: name.to_owned(),
            })
    }

    pub fn get(&self, name: &str) -> Option<&Func> {
        self.funcs.get(name)
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Func)> + '_ {
        let mut entries: Vec<(&str, &Func)> =
            self.funcs.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|(name, _)| name).collect()
    }

    pub fn declarations(&self) -> Vec<FunctionDecl> {
        self.iter().map(|(name, func)| func.declaration(name)).collect()
    }

    /// The `functions` request array.
    pub fn encode(&self) -> Result<Value, EncodeError> {
        self.encode_with(&EncodeOptions::default())
    }

    pub fn encode_with(&self, opts: &EncodeOptions) -> Result<Value, EncodeError> {
        tracing::debug!(functions = self.len(), "encoding function registry");
        self.iter()
            .map(|(name, func)| func.declaration(name).encode_with(opts))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    /// The `tools` request array: each function wrapped as
    /// `{"type":"function","function":{..}}`.
    pub fn tools(&self) -> Result<Value, EncodeError> {
        self.tools_with(&EncodeOptions::default())
    }

    pub fn tools_with(&self, opts: &EncodeOptions) -> Result<Value, EncodeError> {
        self.iter()
            .map(|(name, func)| {
                Ok(serde_json::json!({
                    "type": ToolDecl::FUNCTION,
                    "function": func.declaration(name).encode_with(opts)?,
                }))
            })
            .collect::<Result<Vec<_>, EncodeError>>()
            .map(Value::Array)
    }
}

impl Serialize for Funcs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for (name, func) in self.iter() {
            seq.serialize_element(&func.declaration(name))?;
        }
        seq.end()
    }
}
