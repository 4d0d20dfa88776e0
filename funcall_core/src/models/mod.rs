//! Core data models for funcall-rs
//!
//! A function's parameters are described by a tree of [`Param`] nodes held
//! in a [`Params`] list. The list always encodes to an object schema; see
//! [`crate::schema`] for the encoding rules.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// PARAMETER TYPES
// ============================================================================

/// The JSON Schema types accepted by function-calling APIs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "array",
        }
    }

    /// `string`, `number` and `boolean` never have children.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            ParamType::String | ParamType::Number | ParamType::Boolean
        )
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PARAMETER NODES
// ============================================================================

/// One typed parameter, possibly with nested children.
///
/// For `object` nodes every child is a property. For `array` nodes the
/// children describe the item type: a single child with an empty name *is*
/// the item type, while named children are the fields of an object item.
///
/// Equality follows the encoded schema: `required` is ignored on array item
/// types, and named array children equal an unnamed object item with the
/// same fields.
#[derive(Debug, Clone, Default, Eq)]
pub struct Param {
    /// Property name; empty for array item types.
    pub name: String,
    pub ty: ParamType,
    /// Omitted from the schema when empty.
    pub description: String,
    /// Whether the parent lists `name` under `required`.
    pub required: bool,
    pub items: Vec<Param>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            ..Self::default()
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Boolean)
    }

    pub fn object(name: impl Into<String>, fields: impl IntoIterator<Item = Param>) -> Self {
        Self {
            items: fields.into_iter().collect(),
            ..Self::new(name, ParamType::Object)
        }
    }

    /// An array whose item type is `item`. The item's name is cleared.
    pub fn array(name: impl Into<String>, item: Param) -> Self {
        Self {
            items: vec![Param {
                name: String::new(),
                required: false,
                ..item
            }],
            ..Self::new(name, ParamType::Array)
        }
    }

    /// An unnamed node, used as an array item type.
    pub fn item(ty: ParamType) -> Self {
        Self::new("", ty)
    }

    /// Parameter described by a Rust type, see [`ParamSchema`].
    pub fn of<T: ParamSchema + ?Sized>(name: impl Into<String>) -> Self {
        T::param(name.into())
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        same_node(self, other, false)
    }
}

fn same_node(a: &Param, b: &Param, is_item: bool) -> bool {
    a.name == b.name
        && a.ty == b.ty
        && a.description == b.description
        && (is_item || a.required == b.required)
        && match a.ty {
            ParamType::Array => same_array_items(a, b),
            _ => same_fields(&a.items, &b.items),
        }
}

fn same_fields(a: &[Param], b: &[Param]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_node(x, y, false))
}

fn same_array_items(a: &Param, b: &Param) -> bool {
    match (object_item_fields(a), object_item_fields(b)) {
        (Some(x), Some(y)) => same_fields(x, y),
        (None, None) => {
            a.items.len() == b.items.len()
                && a.items.iter().zip(&b.items).all(|(x, y)| same_node(x, y, true))
        }
        _ => false,
    }
}

/// Fields of an array's object item, whichever way it was written.
fn object_item_fields(array: &Param) -> Option<&[Param]> {
    match array.items.as_slice() {
        [] => None,
        [item] if item.name.is_empty() => {
            (item.ty == ParamType::Object && item.description.is_empty())
                .then_some(item.items.as_slice())
        }
        fields if fields.iter().all(|f| !f.name.is_empty()) => Some(fields),
        _ => None,
    }
}

/// An ordered list of top-level parameters. Always an object schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(pub Vec<Param>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, param: Param) -> &mut Self {
        self.0.push(param);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.0.iter()
    }
}

impl From<Vec<Param>> for Params {
    fn from(params: Vec<Param>) -> Self {
        Self(params)
    }
}

impl FromIterator<Param> for Params {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// RUST TYPE MAPPING
// ============================================================================

/// Rust types that map onto a parameter node.
pub trait ParamSchema {
    fn param(name: String) -> Param;
}

macro_rules! prim {
    ($ty:ty, $kind:ident) => {
        impl ParamSchema for $ty {
            fn param(name: String) -> Param {
                Param::new(name, ParamType::$kind)
            }
        }
    };
}

prim!(bool, Boolean);
prim!(i8, Number);
prim!(i16, Number);
prim!(i32, Number);
prim!(i64, Number);
prim!(isize, Number);
prim!(u8, Number);
prim!(u16, Number);
prim!(u32, Number);
prim!(u64, Number);
prim!(usize, Number);
prim!(f32, Number);
prim!(f64, Number);
prim!(char, String);
prim!(String, String);
prim!(str, String);

impl<T: ParamSchema + ?Sized> ParamSchema for &T {
    fn param(name: String) -> Param {
        T::param(name)
    }
}

impl<T: ParamSchema> ParamSchema for Vec<T> {
    fn param(name: String) -> Param {
        Param::array(name, T::param(String::new()))
    }
}

impl<T: ParamSchema> ParamSchema for [T] {
    fn param(name: String) -> Param {
        Param::array(name, T::param(String::new()))
    }
}

/// `Option<T>` describes the same node as `T`; leave it out of `required`.
impl<T: ParamSchema> ParamSchema for Option<T> {
    fn param(name: String) -> Param {
        T::param(name)
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Encoder settings, embeddable in a caller's configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Reject scalar nodes that carry children. When false the children are
    /// dropped and a warning is logged.
    pub strict: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl EncodeOptions {
    pub fn lenient() -> Self {
        Self { strict: false }
    }
}

// ============================================================================
// FUNCTION CALLS
// ============================================================================

/// A function call as produced by the model: `arguments` is raw JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}
