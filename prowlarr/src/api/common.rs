//! Common types shared by the Prowlarr API models

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the dynamic `fields` list carried by provider-backed
/// entities (applications, download clients, notifications, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Field {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Field {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
        }
    }
}

/// Looks up the value of a field, treating JSON null as absent
pub fn field_value<'a>(fields: &'a [Field], name: &str) -> Option<&'a Value> {
    fields
        .iter()
        .find(|f| f.name == name)
        .and_then(|f| f.value.as_ref())
        .filter(|v| !v.is_null())
}

/// Entities whose settings are implemented by a named Prowlarr plugin
pub trait FieldModel {
    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
    fn implementation(&self) -> &str;
    fn set_implementation(&mut self, implementation: String);
    fn config_contract(&self) -> &str;
    fn set_config_contract(&mut self, config_contract: String);
    fn tags(&self) -> &[i64];
    fn set_tags(&mut self, tags: Vec<i64>);
    fn fields(&self) -> &[Field];
    fn set_fields(&mut self, fields: Vec<Field>);
}

macro_rules! impl_field_model {
    ($model:ty) => {
        impl $crate::api::common::FieldModel for $model {
            fn id(&self) -> i64 {
                self.id
            }

            fn set_id(&mut self, id: i64) {
                self.id = id;
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn set_name(&mut self, name: String) {
                self.name = name;
            }

            fn implementation(&self) -> &str {
                &self.implementation
            }

            fn set_implementation(&mut self, implementation: String) {
                self.implementation = implementation;
            }

            fn config_contract(&self) -> &str {
                &self.config_contract
            }

            fn set_config_contract(&mut self, config_contract: String) {
                self.config_contract = config_contract;
            }

            fn tags(&self) -> &[i64] {
                &self.tags
            }

            fn set_tags(&mut self, tags: Vec<i64>) {
                self.tags = tags;
            }

            fn fields(&self) -> &[$crate::api::common::Field] {
                &self.fields
            }

            fn set_fields(&mut self, fields: Vec<$crate::api::common::Field>) {
                self.fields = fields;
            }
        }
    };
}

pub(crate) use impl_field_model;
