//! Translation between the API `fields` list and typed Terraform attributes
//!
//! Each entity family declares a static table of [`FieldSpec`]s naming the
//! API field, the attribute it maps to and its value kind. Reading and
//! writing is then a table walk.

use serde_json::Value;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::{AttributePath, Dynamic, DynamicValue};

use crate::api::common::field_value;
use crate::api::Field;

/// Placeholder the API returns instead of stored secrets
pub const MASKED_VALUE: &str = "********";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    String,
    IntSet,
    StringSet,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub api_name: &'static str,
    pub attribute: &'static str,
    pub kind: FieldKind,
    pub sensitive: bool,
}

impl FieldSpec {
    const fn new(api_name: &'static str, attribute: &'static str, kind: FieldKind) -> Self {
        Self {
            api_name,
            attribute,
            kind,
            sensitive: false,
        }
    }

    pub const fn bool(api_name: &'static str, attribute: &'static str) -> Self {
        Self::new(api_name, attribute, FieldKind::Bool)
    }

    pub const fn int(api_name: &'static str, attribute: &'static str) -> Self {
        Self::new(api_name, attribute, FieldKind::Int)
    }

    pub const fn string(api_name: &'static str, attribute: &'static str) -> Self {
        Self::new(api_name, attribute, FieldKind::String)
    }

    pub const fn int_set(api_name: &'static str, attribute: &'static str) -> Self {
        Self::new(api_name, attribute, FieldKind::IntSet)
    }

    pub const fn string_set(api_name: &'static str, attribute: &'static str) -> Self {
        Self::new(api_name, attribute, FieldKind::StringSet)
    }

    pub const fn sensitive(self) -> Self {
        Self {
            sensitive: true,
            ..self
        }
    }

    pub fn attribute_type(&self) -> AttributeType {
        match self.kind {
            FieldKind::Bool => AttributeType::Bool,
            FieldKind::Int => AttributeType::Number,
            FieldKind::String => AttributeType::String,
            FieldKind::IntSet => AttributeType::Set(Box::new(AttributeType::Number)),
            FieldKind::StringSet => AttributeType::Set(Box::new(AttributeType::String)),
        }
    }

    /// Schema builder for this field, without optional/required flags
    pub fn builder(&self) -> AttributeBuilder {
        let builder = AttributeBuilder::new(self.attribute, self.attribute_type())
            .description(&describe(self.attribute));
        if self.sensitive {
            builder.sensitive()
        } else {
            builder
        }
    }

    /// Optional and computed attribute, the default for field attributes
    pub fn attribute(&self) -> Attribute {
        self.builder().optional().computed().build()
    }

    fn path(&self) -> AttributePath {
        AttributePath::new(self.attribute)
    }
}

/// "api_key" -> "Api key."
fn describe(attribute: &str) -> String {
    let text = attribute.replace('_', " ");
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

/// Converts an API field value to a Terraform value of the given kind
pub fn json_to_dynamic(kind: FieldKind, value: &Value) -> Dynamic {
    match (kind, value) {
        (FieldKind::Bool, Value::Bool(b)) => Dynamic::Bool(*b),
        (FieldKind::Int, Value::Number(n)) => n
            .as_i64()
            .map(Dynamic::from)
            .or_else(|| n.as_f64().map(Dynamic::Number))
            .unwrap_or(Dynamic::Null),
        (FieldKind::String, Value::String(s)) => Dynamic::String(s.clone()),
        (FieldKind::String, Value::Number(n)) => Dynamic::String(n.to_string()),
        (FieldKind::String, Value::Bool(b)) => Dynamic::String(b.to_string()),
        (FieldKind::IntSet, Value::Array(items)) => Dynamic::List(
            items
                .iter()
                .filter_map(Value::as_i64)
                .map(Dynamic::from)
                .collect(),
        ),
        (FieldKind::StringSet, Value::Array(items)) => Dynamic::List(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(Dynamic::String(s.clone())),
                    Value::Number(n) => Some(Dynamic::String(n.to_string())),
                    _ => None,
                })
                .collect(),
        ),
        _ => Dynamic::Null,
    }
}

/// Converts a known, non-null Terraform value to its API representation
pub fn dynamic_to_json(kind: FieldKind, value: &Dynamic) -> Option<Value> {
    match kind {
        FieldKind::Bool => value.as_bool().map(Value::Bool),
        FieldKind::Int => value.as_i64().map(Value::from),
        FieldKind::String => value.as_str().map(|s| Value::String(s.to_string())),
        FieldKind::IntSet => value
            .as_list()
            .map(|items| Value::Array(items.iter().filter_map(Dynamic::as_i64).map(Value::from).collect())),
        FieldKind::StringSet => value.as_list().map(|items| {
            Value::Array(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(|s| Value::String(s.to_string())))
                    .collect(),
            )
        }),
    }
}

/// Builds the API fields list from every known, non-null field attribute
pub fn state_to_fields<'a>(
    specs: impl IntoIterator<Item = &'a FieldSpec>,
    state: &DynamicValue,
) -> Vec<Field> {
    specs
        .into_iter()
        .filter_map(|spec| {
            let value = state.get(&spec.path())?;
            if !value.is_set() {
                return None;
            }
            dynamic_to_json(spec.kind, value).map(|json| Field::new(spec.api_name, json))
        })
        .collect()
}

/// Sets every field attribute from the API response, null when absent
///
/// A sensitive value masked by the API keeps the value from `prior`, the
/// planned or previously stored state.
pub fn fields_to_state<'a>(
    specs: impl IntoIterator<Item = &'a FieldSpec>,
    fields: &[Field],
    prior: &DynamicValue,
    state: &mut DynamicValue,
) -> tfplug::Result<()> {
    for spec in specs {
        let path = spec.path();
        let mut value = field_value(fields, spec.api_name)
            .map(|v| json_to_dynamic(spec.kind, v))
            .unwrap_or(Dynamic::Null);

        if spec.sensitive && value.as_str() == Some(MASKED_VALUE) {
            value = prior
                .get(&path)
                .filter(|v| !v.is_unknown())
                .cloned()
                .unwrap_or(Dynamic::Null);
        }

        state.set_value(&path, value)?;
    }
    Ok(())
}

/// Integer set attribute as a list of ids; null and unknown read as empty
pub fn int_set(state: &DynamicValue, attribute: &str) -> Vec<i64> {
    state
        .get(&AttributePath::new(attribute))
        .and_then(Dynamic::as_list)
        .map(|items| items.iter().filter_map(Dynamic::as_i64).collect())
        .unwrap_or_default()
}

pub fn int_set_value(values: &[i64]) -> Dynamic {
    Dynamic::List(values.iter().copied().map(Dynamic::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TABLE: &[FieldSpec] = &[
        FieldSpec::string("host", "host"),
        FieldSpec::int("port", "port"),
        FieldSpec::bool("useSsl", "use_ssl"),
        FieldSpec::string("apiKey", "api_key").sensitive(),
        FieldSpec::int_set("syncCategories", "sync_categories"),
        FieldSpec::string_set("tags", "field_tags"),
    ];

    fn state(pairs: &[(&str, Dynamic)]) -> DynamicValue {
        let mut state = DynamicValue::object();
        for (name, value) in pairs {
            state
                .set_value(&AttributePath::new(name), value.clone())
                .unwrap();
        }
        state
    }

    #[test]
    fn only_set_attributes_become_fields() {
        let state = state(&[
            ("host", Dynamic::String("sab".into())),
            ("port", Dynamic::Number(8080.0)),
            ("use_ssl", Dynamic::Null),
            ("api_key", Dynamic::Unknown),
            (
                "sync_categories",
                Dynamic::List(vec![Dynamic::Number(2000.0), Dynamic::Number(5000.0)]),
            ),
        ]);

        let fields = state_to_fields(TABLE, &state);
        assert_eq!(
            fields,
            vec![
                Field::new("host", json!("sab")),
                Field::new("port", json!(8080)),
                Field::new("syncCategories", json!([2000, 5000])),
            ]
        );
    }

    #[test]
    fn missing_fields_read_as_null() {
        let fields = vec![
            Field::new("port", json!(8080)),
            Field::new("tags", json!(["a", "b"])),
        ];
        let mut out = DynamicValue::object();
        fields_to_state(TABLE, &fields, &DynamicValue::null(), &mut out).unwrap();

        let map = out.value.as_map().unwrap();
        assert_eq!(map["port"], Dynamic::Number(8080.0));
        assert!(map["host"].is_null());
        assert_eq!(
            map["field_tags"],
            Dynamic::List(vec![Dynamic::String("a".into()), Dynamic::String("b".into())])
        );
        assert_eq!(map.len(), TABLE.len());
    }

    #[test]
    fn masked_secret_keeps_prior_value() {
        let fields = vec![Field::new("apiKey", json!(MASKED_VALUE))];
        let prior = state(&[("api_key", Dynamic::String("real-key".into()))]);
        let mut out = DynamicValue::object();
        fields_to_state(TABLE, &fields, &prior, &mut out).unwrap();

        assert_eq!(
            out.get_string(&AttributePath::new("api_key")).unwrap(),
            "real-key"
        );
    }

    #[test]
    fn masked_secret_without_prior_is_null() {
        let fields = vec![Field::new("apiKey", json!(MASKED_VALUE))];
        let prior = state(&[("api_key", Dynamic::Unknown)]);
        let mut out = DynamicValue::object();
        fields_to_state(TABLE, &fields, &prior, &mut out).unwrap();

        assert!(out.is_null_at(&AttributePath::new("api_key")));
    }

    #[test]
    fn mismatched_json_types_are_null() {
        assert!(json_to_dynamic(FieldKind::Bool, &json!("yes")).is_null());
        assert_eq!(
            json_to_dynamic(FieldKind::String, &json!(5)),
            Dynamic::String("5".into())
        );
        assert!(dynamic_to_json(FieldKind::Int, &Dynamic::String("5".into())).is_none());
    }

    #[test]
    fn descriptions_are_humanized() {
        assert_eq!(describe("api_key"), "Api key.");
        let attr = TABLE[3].attribute();
        assert!(attr.sensitive && attr.optional && attr.computed);
    }

    #[test]
    fn int_set_ignores_unknown() {
        let state = state(&[("tags", Dynamic::Unknown)]);
        assert!(int_set(&state, "tags").is_empty());
        assert_eq!(int_set_value(&[1, 2]), Dynamic::List(vec![Dynamic::from(1i64), Dynamic::from(2i64)]));
    }
}
