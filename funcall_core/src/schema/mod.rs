//! Function-calling JSON Schema encoding and decoding
//!
//! A [`Params`] tree encodes to the subset of JSON Schema accepted by
//! function-calling APIs:
//!
//! ```text
//! {"type":"object","properties":{..},"required":[..]}
//! ```
//!
//! * An empty tree is just `{"type":"object"}`.
//! * `required` lists required children in declaration order and is left
//!   out when nothing is required.
//! * Arrays carry their item type under `items`; named array children are
//!   folded into an object item.
//! * Empty descriptions are never written.
//!
//! The same shape decodes back into a [`Params`] tree with
//! [`Params::from_schema`].

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser};
use serde_json::Value;

use crate::error::{DecodeError, EncodeError};
use crate::extract::decode_value;
use crate::models::{EncodeOptions, Param, ParamType, Params};

const ROOT: &str = "$";

/// One schema object in the encoded tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SchemaNode {
    #[serde(rename = "type")]
    ty: ParamType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<IndexMap<String, SchemaNode>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    items: Option<Box<SchemaNode>>,
}

impl SchemaNode {
    fn leaf(ty: ParamType, description: &str) -> Self {
        Self {
            ty,
            description: description.to_owned(),
            properties: None,
            required: Vec::new(),
            items: None,
        }
    }
}

// ============================================================================
// ENCODING
// ============================================================================

struct Encoder<'o> {
    opts: &'o EncodeOptions,
}

impl Encoder<'_> {
    fn root(&self, params: &Params) -> Result<SchemaNode, EncodeError> {
        let mut node = SchemaNode::leaf(ParamType::Object, "");
        if !params.is_empty() {
            let (properties, required) = self.fields(&params.0, ROOT)?;
            node.properties = Some(properties);
            node.required = required;
        }
        Ok(node)
    }

    /// Properties and `required` list for a run of named siblings.
    fn fields(
        &self,
        children: &[Param],
        parent: &str,
    ) -> Result<(IndexMap<String, SchemaNode>, Vec<String>), EncodeError> {
        let mut properties = IndexMap::with_capacity(children.len());
        let mut required = Vec::new();

        for child in children {
            if child.name.is_empty() {
                return Err(EncodeError::UnnamedProperty {
                    parent: parent.to_owned(),
                });
            }
            if properties.contains_key(&child.name) {
                return Err(EncodeError::DuplicateProperty {
                    parent: parent.to_owned(),
                    name: child.name.clone(),
                });
            }

            let path = format!("{parent}.{}", child.name);
            properties.insert(child.name.clone(), self.node(child, &path)?);
            if child.required {
                required.push(child.name.clone());
            }
        }

        Ok((properties, required))
    }

    fn node(&self, param: &Param, path: &str) -> Result<SchemaNode, EncodeError> {
        let mut node = SchemaNode::leaf(param.ty, &param.description);

        match param.ty {
            ParamType::String | ParamType::Number | ParamType::Boolean => {
                if !param.items.is_empty() {
                    if self.opts.strict {
                        return Err(EncodeError::ScalarWithItems {
                            path: path.to_owned(),
                            ty: param.ty,
                        });
                    }
                    tracing::warn!(
                        path,
                        ty = %param.ty,
                        dropped = param.items.len(),
                        "ignoring nested items on scalar parameter"
                    );
                }
            }
            ParamType::Object => {
                let (properties, required) = self.fields(&param.items, path)?;
                node.properties = Some(properties);
                node.required = required;
            }
            ParamType::Array => {
                node.items = Some(Box::new(self.array_item(param, path)?));
            }
        }

        Ok(node)
    }

    fn array_item(&self, param: &Param, path: &str) -> Result<SchemaNode, EncodeError> {
        let item_path = format!("{path}[]");
        match param.items.as_slice() {
            [] => Err(EncodeError::MissingArrayItems {
                path: path.to_owned(),
            }),
            [item] if item.name.is_empty() => self.node(item, &item_path),
            fields if fields.iter().all(|f| !f.name.is_empty()) => {
                let (properties, required) = self.fields(fields, &item_path)?;
                Ok(SchemaNode {
                    properties: Some(properties),
                    required,
                    ..SchemaNode::leaf(ParamType::Object, "")
                })
            }
            _ => Err(EncodeError::AmbiguousArrayItems {
                path: path.to_owned(),
            }),
        }
    }
}

impl Params {
    /// Encode with the default (strict) options.
    pub fn encode(&self) -> Result<Value, EncodeError> {
        self.encode_with(&EncodeOptions::default())
    }

    pub fn encode_with(&self, opts: &EncodeOptions) -> Result<Value, EncodeError> {
        let node = Encoder { opts }.root(self)?;
        Ok(serde_json::to_value(node)?)
    }

    /// Parse a function-calling schema back into a parameter tree.
    ///
    /// The root must be an object schema. Array item types come back as a
    /// single unnamed child, which compares equal to named array fields
    /// with the same schema.
    pub fn from_schema(schema: &Value) -> Result<Self, DecodeError> {
        decode_value(schema)
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Encoder {
            opts: &EncodeOptions::default(),
        }
        .root(self)
        .map_err(<S::Error as ser::Error>::custom)?
        .serialize(serializer)
    }
}

// ============================================================================
// DECODING
// ============================================================================

fn fields_from_node<E: de::Error>(node: SchemaNode) -> Result<Vec<Param>, E> {
    let SchemaNode {
        properties,
        required,
        ..
    } = node;
    let properties = properties.unwrap_or_default();

    if let Some(unknown) = required.iter().find(|name| !properties.contains_key(*name)) {
        return Err(E::custom(format_args!(
            "required property '{unknown}' is not declared"
        )));
    }

    properties
        .into_iter()
        .map(|(name, child)| {
            let is_required = required.contains(&name);
            param_from_node(name, is_required, child)
        })
        .collect()
}

fn param_from_node<E: de::Error>(
    name: String,
    required: bool,
    node: SchemaNode,
) -> Result<Param, E> {
    let ty = node.ty;
    let description = node.description.clone();
    let items = match ty {
        ParamType::Object => fields_from_node(node)?,
        ParamType::Array => match node.items {
            Some(item) => vec![param_from_node(String::new(), false, *item)?],
            None => return Err(E::custom(format_args!("array '{name}' has no items"))),
        },
        ParamType::String | ParamType::Number | ParamType::Boolean => Vec::new(),
    };

    Ok(Param {
        name,
        ty,
        description,
        required,
        items,
    })
}

impl<'de> Deserialize<'de> for Params {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let root = SchemaNode::deserialize(deserializer)?;
        if root.ty != ParamType::Object {
            return Err(de::Error::custom(format_args!(
                "parameters must be an object schema, found {}",
                root.ty
            )));
        }
        fields_from_node(root).map(Params)
    }
}

// ============================================================================
// FUNCTION DECLARATIONS
// ============================================================================

/// Wire form of one registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub description: String,
    pub parameters: Params,
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Params) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    pub fn encode_with(&self, opts: &EncodeOptions) -> Result<Value, EncodeError> {
        Ok(serde_json::json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.parameters.encode_with(opts)?,
        }))
    }
}

/// `{"type":"function","function":{..}}` as used by the `tools` request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDecl {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDecl,
}

impl ToolDecl {
    pub const FUNCTION: &'static str = "function";
}

impl From<FunctionDecl> for ToolDecl {
    fn from(function: FunctionDecl) -> Self {
        Self {
            tool_type: Self::FUNCTION.to_owned(),
            function,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recipe() -> Params {
        Params(vec![
            Param::array(
                "ingredients",
                Param::object(
                    "",
                    [
                        Param::string("name").required(),
                        Param::string("unit").required(),
                        Param::number("amount").required(),
                    ],
                ),
            )
            .required(),
            Param::array("instructions", Param::item(ParamType::String))
                .description("Steps to prepare the recipe (no numbering)")
                .required(),
            Param::number("time_to_cook")
                .description("Total time to prepare the recipe in minutes")
                .required(),
        ])
    }

    #[test]
    fn test_empty_tree() {
        let schema = Params::new().encode().unwrap();
        assert_eq!(schema, json!({ "type": "object" }));
        assert!(schema.get("properties").is_none());
        assert!(schema.get("required").is_none());
    }

    #[test]
    fn test_scalar_descriptions_are_optional() {
        let params = Params(vec![
            Param::string("word").description("String to be repeated"),
            Param::boolean("loud"),
        ]);
        assert_eq!(
            params.encode().unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "word": { "type": "string", "description": "String to be repeated" },
                    "loud": { "type": "boolean" }
                }
            })
        );
    }

    #[test]
    fn test_required_keeps_declaration_order() {
        let params = Params(vec![
            Param::string("c").required(),
            Param::string("a"),
            Param::string("b").required(),
        ]);
        let schema = params.encode().unwrap();
        assert_eq!(schema["required"], json!(["c", "b"]));
    }

    #[test]
    fn test_properties_keep_declaration_order() {
        let schema = recipe().encode().unwrap();
        let keys: Vec<&str> = schema["properties"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["ingredients", "instructions", "time_to_cook"]);
    }

    #[test]
    fn test_object_without_fields() {
        let params = Params(vec![Param::object("meta", []).description("Free-form")]);
        assert_eq!(
            params.encode().unwrap()["properties"]["meta"],
            json!({ "type": "object", "description": "Free-form", "properties": {} })
        );
    }

    #[test]
    fn test_named_array_children_become_object_item() {
        let mut point = Param::new("points", ParamType::Array);
        point.items = vec![Param::number("x").required(), Param::number("y")];

        let schema = Params(vec![point]).encode().unwrap();
        assert_eq!(
            schema["properties"]["points"],
            json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": { "x": { "type": "number" }, "y": { "type": "number" } },
                    "required": ["x"]
                }
            })
        );
    }

    #[test]
    fn test_description_written_once() {
        let params = Params(vec![Param::object(
            "quality",
            [Param::string("summary")],
        )
        .description("Overall quality")]);
        let text = serde_json::to_string(&params).unwrap();
        assert_eq!(text.matches("description").count(), 1);
    }

    #[test]
    fn test_scalar_with_items_is_rejected() {
        let mut count = Param::number("count");
        count.items.push(Param::item(ParamType::String));
        let params = Params(vec![Param::object("outer", [count])]);

        match params.encode().unwrap_err() {
            EncodeError::ScalarWithItems { path, ty } => {
                assert_eq!(path, "$.outer.count");
                assert_eq!(ty, ParamType::Number);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(serde_json::to_value(&params).is_err());
    }

    #[test]
    fn test_lenient_drops_scalar_items() {
        let mut count = Param::number("count");
        count.items.push(Param::item(ParamType::String));
        let params = Params(vec![count]);

        let schema = params.encode_with(&EncodeOptions::lenient()).unwrap();
        assert_eq!(schema["properties"]["count"], json!({ "type": "number" }));
    }

    #[test]
    fn test_array_shape_errors() {
        let bare = Params(vec![Param::new("tags", ParamType::Array)]);
        assert!(matches!(
            bare.encode().unwrap_err(),
            EncodeError::MissingArrayItems { path } if path == "$.tags"
        ));

        let mut mixed = Param::new("tags", ParamType::Array);
        mixed.items = vec![Param::item(ParamType::String), Param::string("label")];
        assert!(matches!(
            Params(vec![mixed]).encode().unwrap_err(),
            EncodeError::AmbiguousArrayItems { path } if path == "$.tags"
        ));
    }

    #[test]
    fn test_property_name_errors() {
        let unnamed = Params(vec![Param::item(ParamType::String)]);
        assert!(matches!(
            unnamed.encode().unwrap_err(),
            EncodeError::UnnamedProperty { parent } if parent == "$"
        ));

        let twice = Params(vec![Param::string("a"), Param::number("a")]);
        assert!(matches!(
            twice.encode().unwrap_err(),
            EncodeError::DuplicateProperty { name, .. } if name == "a"
        ));
    }

    #[test]
    fn test_nested_item_paths() {
        let bad = Param::object("", [Param::string("")]);
        let params = Params(vec![Param::array("rows", bad)]);
        assert!(matches!(
            params.encode().unwrap_err(),
            EncodeError::UnnamedProperty { parent } if parent == "$.rows[]"
        ));
    }

    #[test]
    fn test_from_schema_inverts_encode() {
        let params = recipe();
        let schema = params.encode().unwrap();
        assert_eq!(Params::from_schema(&schema).unwrap(), params);
        assert_eq!(Params::from_schema(&json!({ "type": "object" })).unwrap(), Params::new());
    }

    #[test]
    fn test_nested_object_with_array_golden() {
        let params = Params(vec![Param::object(
            "quality",
            [Param::array("pros", Param::item(ParamType::String))
                .description("Write 3 points why this text is well written")
                .required()],
        )
        .required()]);

        let expected: Value = serde_json::from_str(
            r#"{"properties":{"quality":{"properties":{"pros":{"description":"Write 3 points why this text is well written","items":{"type":"string"},"type":"array"}},"required":["pros"],"type":"object"}},"required":["quality"],"type":"object"}"#,
        )
        .unwrap();
        assert_eq!(params.encode().unwrap(), expected);
    }

    #[test]
    fn test_from_schema_named_array_fields() {
        let mut points = Param::new("points", ParamType::Array);
        points.items = vec![Param::number("x").required(), Param::number("y")];
        let params = Params(vec![points]);

        let back = Params::from_schema(&params.encode().unwrap()).unwrap();
        assert_eq!(back, params);
        assert_eq!(back.0[0].items.len(), 1);
        assert_eq!(back.0[0].items[0].ty, ParamType::Object);
    }

    #[test]
    fn test_from_schema_ignores_item_required_flag() {
        let mut tags = Param::array("tags", Param::string(""));
        tags.items[0].required = true;
        let params = Params(vec![tags.required()]);

        let back = Params::from_schema(&params.encode().unwrap()).unwrap();
        assert_eq!(back, params);
        assert!(!back.0[0].items[0].required);
    }

    #[test]
    fn test_from_schema_rejects_foreign_shapes() {
        let scalar_root = json!({ "type": "string" });
        assert!(Params::from_schema(&scalar_root).is_err());

        let integer = json!({
            "type": "object",
            "properties": { "n": { "type": "integer" } }
        });
        let err = Params::from_schema(&integer).unwrap_err();
        assert_eq!(err.path, "properties.n.type");

        let dangling = json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "required": ["b"]
        });
        assert!(Params::from_schema(&dangling).is_err());
    }

    #[test]
    fn test_tool_decl_shape() {
        let decl = FunctionDecl::new("noop", "Does nothing", Params::new());
        assert_eq!(
            serde_json::to_value(ToolDecl::from(decl)).unwrap(),
            json!({
                "type": "function",
                "function": {
                    "name": "noop",
                    "description": "Does nothing",
                    "parameters": { "type": "object" }
                }
            })
        );
    }
}
