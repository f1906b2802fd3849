//! Attribute definitions shared by resources and data sources

use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, NestedType};
use tfplug::types::{AttributePath, DynamicValue};

pub fn id_attribute(description: &str) -> Attribute {
    AttributeBuilder::new("id", AttributeType::Number)
        .description(description)
        .computed()
        .plan_modifier(Box::new(UseStateForUnknown))
        .build()
}

pub fn name_attribute(description: &str) -> Attribute {
    AttributeBuilder::new("name", AttributeType::String)
        .description(description)
        .required()
        .build()
}

pub fn tags_attribute() -> Attribute {
    AttributeBuilder::new("tags", AttributeType::Set(Box::new(AttributeType::Number)))
        .description("List of associated tags.")
        .optional()
        .computed()
        .build()
}

/// Rewrites a resource attribute for a data source: computed, no validators
/// and no plan modifiers, recursively for nested attributes
pub fn computed_only(mut attribute: Attribute) -> Attribute {
    attribute.required = false;
    attribute.optional = false;
    attribute.computed = true;
    attribute.validators.clear();
    attribute.plan_modifiers.clear();
    if let Some(nested) = attribute.nested_type.take() {
        attribute.nested_type = Some(NestedType {
            attributes: nested.attributes.into_iter().map(computed_only).collect(),
            nesting: nested.nesting,
        });
    }
    attribute
}

/// Computed set of objects, used by the list data sources
pub fn computed_set(name: &str, description: &str, attributes: Vec<Attribute>) -> Attribute {
    AttributeBuilder::nested(name, NestedType::set(attributes))
        .description(description)
        .computed()
        .build()
}

/// String attribute from state, `None` when null, unknown or missing
pub fn string_value(state: &DynamicValue, name: &str) -> Option<String> {
    state.get_string(&AttributePath::new(name)).ok()
}

pub fn i64_value(state: &DynamicValue, name: &str) -> Option<i64> {
    state.get_i64(&AttributePath::new(name)).ok()
}

pub fn bool_value(state: &DynamicValue, name: &str) -> Option<bool> {
    state.get_bool(&AttributePath::new(name)).ok()
}
