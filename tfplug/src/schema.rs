//! Schema types and builders for tfplug
//!
//! This module provides the schema system for defining provider, resource and
//! data source schemas, including attribute types, nested attributes, and the
//! hooks (validators and plan modifiers) attached to individual attributes.

use crate::types::{AttributePath, Diagnostic, Dynamic};
use std::collections::BTreeMap;
use std::sync::Arc;

/// AttributeType defines the type system for Terraform attributes
/// This must match Terraform's type system exactly
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>),                // Ordered, allows duplicates
    Set(Box<AttributeType>),                 // Unordered, no duplicates
    Map(Box<AttributeType>),                 // String keys only
    Object(BTreeMap<String, AttributeType>), // Fixed structure
}

impl AttributeType {
    /// JSON type constraint as sent in `Schema.Attribute.type`
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{json, Value};

        match self {
            AttributeType::String => json!("string"),
            AttributeType::Number => json!("number"),
            AttributeType::Bool => json!("bool"),
            AttributeType::List(elem) => json!(["list", elem.to_json()]),
            AttributeType::Set(elem) => json!(["set", elem.to_json()]),
            AttributeType::Map(elem) => json!(["map", elem.to_json()]),
            AttributeType::Object(attrs) => {
                let attrs: serde_json::Map<String, Value> = attrs
                    .iter()
                    .map(|(name, ty)| (name.clone(), ty.to_json()))
                    .collect();
                json!(["object", attrs])
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_json().to_string().into_bytes()
    }
}

/// Schema is returned by providers/resources/data sources
/// Version is used for state migration
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64, // Increment when schema changes require migration
    pub block: Block, // Root block containing all attributes
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attributes.iter().find(|a| a.name == name)
    }
}

/// Block represents a configuration block
#[derive(Debug, Clone)]
pub struct Block {
    pub version: i64,
    pub attributes: Vec<Attribute>,
    pub description: String,
    pub description_kind: StringKind,
    pub deprecated: bool,
}

/// Attribute represents a single configuration attribute
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub validators: Vec<Arc<dyn Validator>>,
    pub plan_modifiers: Vec<Arc<dyn PlanModifier>>,
    pub nested_type: Option<NestedType>,
    pub deprecated: bool,
}

// Manual Debug implementation since validators/modifiers don't implement Debug
impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field("validators", &self.validators.len())
            .field("plan_modifiers", &self.plan_modifiers.len())
            .field("nested_type", &self.nested_type)
            .finish()
    }
}

/// NestedType for attributes with nested structures
#[derive(Debug, Clone)]
pub struct NestedType {
    pub attributes: Vec<Attribute>,
    pub nesting: ObjectNestingMode,
}

impl NestedType {
    pub fn single(attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            nesting: ObjectNestingMode::Single,
        }
    }

    pub fn set(attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            nesting: ObjectNestingMode::Set,
        }
    }
}

/// ObjectNestingMode for nested attribute objects
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectNestingMode {
    Single,
    List,
    Set,
    Map,
}

/// StringKind represents the format of string values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StringKind {
    Plain,
    Markdown,
}

/// Validator checks a configured attribute value
/// Only invoked for known, non-null values
pub trait Validator: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Perform validation
    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse;
}

/// Request for validators
pub struct ValidatorRequest {
    pub config_value: Dynamic,
    pub path: AttributePath,
}

/// Response from validators
#[derive(Default)]
pub struct ValidatorResponse {
    pub diagnostics: Vec<Diagnostic>,
}

/// PlanModifier modifies planned values during planning
/// Common uses: RequiresReplace, UseStateForUnknown
pub trait PlanModifier: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Modify the planned value
    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse;
}

/// Request for plan modifiers
pub struct PlanModifierRequest {
    pub config_value: Dynamic,
    pub state_value: Dynamic,
    pub plan_value: Dynamic,
    pub path: AttributePath,
}

/// Response from plan modifiers
pub struct PlanModifierResponse {
    pub plan_value: Dynamic,
    pub requires_replace: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// AttributeBuilder provides fluent API for building attributes
/// ALWAYS use this instead of constructing Attribute directly
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    /// Create a new attribute builder
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                validators: Vec::new(),
                plan_modifiers: Vec::new(),
                nested_type: None,
                deprecated: false,
            },
        }
    }

    /// Attribute whose type is given by its nested attributes
    pub fn nested(name: &str, nested: NestedType) -> Self {
        let mut builder = Self::new(name, AttributeType::String);
        builder.attribute.r#type = nested.object_type();
        builder.attribute.nested_type = Some(nested);
        builder
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    /// Mark as sensitive (hidden)
    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.attribute.deprecated = true;
        self
    }

    pub fn validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.attribute.validators.push(Arc::from(validator));
        self
    }

    pub fn plan_modifier(mut self, modifier: Box<dyn PlanModifier>) -> Self {
        self.attribute.plan_modifiers.push(Arc::from(modifier));
        self
    }

    /// Finalize the attribute
    pub fn build(self) -> Attribute {
        self.attribute
    }
}

impl NestedType {
    /// Equivalent cty type, used for value conversion only
    pub fn object_type(&self) -> AttributeType {
        let object = AttributeType::Object(
            self.attributes
                .iter()
                .map(|a| (a.name.clone(), a.r#type.clone()))
                .collect(),
        );
        match self.nesting {
            ObjectNestingMode::Single => object,
            ObjectNestingMode::List => AttributeType::List(Box::new(object)),
            ObjectNestingMode::Set => AttributeType::Set(Box::new(object)),
            ObjectNestingMode::Map => AttributeType::Map(Box::new(object)),
        }
    }
}

/// SchemaBuilder provides fluent API for building schemas
/// ALWAYS use this for consistency
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block {
                    version: 0,
                    attributes: Vec::new(),
                    description: String::new(),
                    description_kind: StringKind::Markdown,
                    deprecated: false,
                },
            },
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self.schema.block.version = version;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    pub fn attributes(mut self, attrs: impl IntoIterator<Item = Attribute>) -> Self {
        self.schema.block.attributes.extend(attrs);
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    pub fn description_kind(mut self, kind: StringKind) -> Self {
        self.schema.block.description_kind = kind;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.schema.block.deprecated = true;
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_builder_creates_required_string() {
        let attr = AttributeBuilder::new("label", AttributeType::String)
            .description("Tag label")
            .required()
            .build();

        assert_eq!(attr.name, "label");
        assert!(matches!(attr.r#type, AttributeType::String));
        assert!(attr.required);
        assert!(!attr.optional);
        assert_eq!(attr.description, "Tag label");
    }

    #[test]
    fn schema_builder_collects_attributes() {
        let schema = SchemaBuilder::new()
            .version(1)
            .description("Tag resource")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("label", AttributeType::String)
                    .required()
                    .build(),
            )
            .build();

        assert_eq!(schema.version, 1);
        assert_eq!(schema.block.attributes.len(), 2);
        assert!(schema.attribute("label").is_some());
        assert!(schema.attribute("missing").is_none());
    }

    #[test]
    fn type_constraints_serialize_as_terraform_json() {
        let tags = AttributeType::Set(Box::new(AttributeType::Number));
        assert_eq!(tags.to_bytes(), br#"["set","number"]"#.to_vec());

        let category = AttributeType::Object(BTreeMap::from([
            ("name".to_string(), AttributeType::String),
            (
                "categories".to_string(),
                AttributeType::Set(Box::new(AttributeType::Number)),
            ),
        ]));
        assert_eq!(
            String::from_utf8(category.to_bytes()).unwrap(),
            r#"["object",{"categories":["set","number"],"name":"string"}]"#
        );
    }

    #[test]
    fn nested_attribute_derives_object_type() {
        let attr = AttributeBuilder::nested(
            "authentication",
            NestedType::single(vec![
                AttributeBuilder::new("method", AttributeType::String)
                    .optional()
                    .build(),
                AttributeBuilder::new("required", AttributeType::String)
                    .optional()
                    .build(),
            ]),
        )
        .optional()
        .computed()
        .build();

        match &attr.r#type {
            AttributeType::Object(fields) => assert_eq!(fields.len(), 2),
            other => panic!("expected object type, got {:?}", other),
        }
        assert!(attr.nested_type.is_some());
    }
}
