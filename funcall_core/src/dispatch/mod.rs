//! Invoking registered functions by name

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use serde_json::Value;

use crate::error::CallError;
use crate::models::FunctionCall;
use crate::registry::{Callable, Funcs, ToolFunc};

/// Invocation table built from a [`Funcs`] registry.
///
/// Holds its own handles, so the registry can be dropped or rebuilt while
/// the dispatcher is in use.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<String, Arc<ToolFunc>>,
    detached: HashSet<String>,
}

impl Dispatcher {
    pub fn new(funcs: &Funcs) -> Self {
        let mut dispatcher = Self::default();
        for (name, func) in funcs.iter() {
            match &func.value {
                Callable::Handler(handler) => {
                    dispatcher
                        .handlers
                        .insert(name.to_owned(), Arc::clone(handler));
                }
                Callable::Detached => {
                    dispatcher.detached.insert(name.to_owned());
                }
            }
        }
        dispatcher
    }

    /// Callable names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub async fn call(&self, call: FunctionCall) -> Result<Value, CallError> {
        let FunctionCall { name, arguments } = call;
        tracing::debug!(%name, "dispatching function call");

        let handler = match self.handlers.get(name.as_str()) {
            Some(handler) => handler,
            None if self.detached.contains(&name) => return Err(CallError::Detached { name }),
            None => return Err(CallError::FunctionNotFound { name }),
        };

        let raw = if arguments.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&arguments)?
        };
        handler(raw).await
    }
}
