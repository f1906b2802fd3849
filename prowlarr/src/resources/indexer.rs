//! Indexer resource implementation
//!
//! Indexer definitions are too numerous for per-kind resources, so their
//! settings are exposed as a set of untyped `fields` entries, each carrying
//! exactly one of `text_value`, `number_value`, `bool_value`, `set_value` or
//! `sensitive_value`.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_int_id;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, NestedType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::OneOfString;

use crate::api::indexers::Indexer;
use crate::api::{Client, Field};
use crate::helpers::errors::state_error;
use crate::helpers::fields::{int_set, int_set_value};
use crate::helpers::schema::{
    bool_value, i64_value, id_attribute, name_attribute, string_value, tags_attribute,
};
use crate::helpers::{client_error, client_from, not_configured, Action, Component, MASKED_VALUE};

const RESOURCE_NAME: &str = "indexer";

const PROTOCOLS: &[&str] = &["usenet", "torrent"];

const VALUE_KEYS: &[&str] = &[
    "text_value",
    "number_value",
    "bool_value",
    "set_value",
    "sensitive_value",
];

#[derive(Default)]
pub struct IndexerResource {
    client: Option<Client>,
}

impl IndexerResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self) -> Result<&Client, Diagnostic> {
        self.client.as_ref().ok_or_else(not_configured)
    }
}

fn optional(name: &str, r#type: AttributeType, description: &str) -> Attribute {
    AttributeBuilder::new(name, r#type)
        .description(description)
        .optional()
        .computed()
        .build()
}

fn required(name: &str, r#type: AttributeType, description: &str) -> Attribute {
    AttributeBuilder::new(name, r#type)
        .description(description)
        .required()
        .build()
}

pub(crate) fn field_attributes() -> Vec<Attribute> {
    vec![
        required("name", AttributeType::String, "Field name."),
        AttributeBuilder::new("text_value", AttributeType::String)
            .description("Text value.")
            .optional()
            .build(),
        AttributeBuilder::new("number_value", AttributeType::Number)
            .description("Number value.")
            .optional()
            .build(),
        AttributeBuilder::new("bool_value", AttributeType::Bool)
            .description("Bool value.")
            .optional()
            .build(),
        AttributeBuilder::new("set_value", AttributeType::Set(Box::new(AttributeType::String)))
            .description("Set value.")
            .optional()
            .build(),
        AttributeBuilder::new("sensitive_value", AttributeType::String)
            .description("Sensitive string value.")
            .optional()
            .sensitive()
            .build(),
    ]
}

/// Top-level indexer attributes besides id and name
pub(crate) fn indexer_attributes() -> Vec<Attribute> {
    vec![
        optional("enable", AttributeType::Bool, "Enable flag."),
        required("app_profile_id", AttributeType::Number, "Application profile ID."),
        optional("priority", AttributeType::Number, "Priority."),
        required("implementation", AttributeType::String, "Indexer implementation name."),
        required("config_contract", AttributeType::String, "Indexer configuration template."),
        AttributeBuilder::new("protocol", AttributeType::String)
            .description("Protocol. Valid values are 'usenet' and 'torrent'.")
            .required()
            .validator(Box::new(OneOfString::new(PROTOCOLS)))
            .build(),
        optional("privacy", AttributeType::String, "Privacy."),
        optional("language", AttributeType::String, "Language."),
        tags_attribute(),
        AttributeBuilder::nested("fields", NestedType::set(field_attributes()))
            .description("Set of configuration fields.")
            .optional()
            .computed()
            .build(),
    ]
}

pub(crate) fn indexer_schema() -> Schema {
    SchemaBuilder::new()
        .version(0)
        .description("Generic Indexer resource. When possible use a specific resource instead.")
        .attribute(id_attribute("Indexer ID."))
        .attribute(name_attribute("Indexer name."))
        .attributes(indexer_attributes())
        .build()
}

/// Set values that read as integers go out as numbers, category lists
/// being the common case
fn set_item(item: &Dynamic) -> Option<Value> {
    let text = item.as_str()?;
    Some(match text.parse::<i64>() {
        Ok(number) => Value::from(number),
        Err(_) => Value::String(text.to_string()),
    })
}

fn number(value: f64) -> Value {
    if value.fract() == 0.0 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

fn element_to_field(element: &Dynamic) -> Option<Field> {
    let map = element.as_map()?;
    let name = map.get("name")?.as_str()?;
    let known = |key: &str| map.get(key).filter(|v| v.is_set());

    let value = if let Some(text) = known("text_value").and_then(Dynamic::as_str) {
        Value::String(text.to_string())
    } else if let Some(secret) = known("sensitive_value").and_then(Dynamic::as_str) {
        Value::String(secret.to_string())
    } else if let Some(n) = known("number_value").and_then(Dynamic::as_f64) {
        number(n)
    } else if let Some(b) = known("bool_value").and_then(Dynamic::as_bool) {
        Value::Bool(b)
    } else if let Some(items) = known("set_value").and_then(Dynamic::as_list) {
        Value::Array(items.iter().filter_map(set_item).collect())
    } else {
        return None;
    };

    Some(Field::new(name, value))
}

fn state_to_fields(state: &DynamicValue) -> Vec<Field> {
    state
        .get(&AttributePath::new("fields"))
        .and_then(Dynamic::as_list)
        .map(|elements| elements.iter().filter_map(element_to_field).collect())
        .unwrap_or_default()
}

/// Field elements of a state keyed by name, `None` when the set is not known
fn prior_elements(prior: &DynamicValue) -> Option<HashMap<String, HashMap<String, Dynamic>>> {
    let elements = prior.get(&AttributePath::new("fields"))?.as_list()?;
    Some(
        elements
            .iter()
            .filter_map(Dynamic::as_map)
            .filter_map(|map| {
                let name = map.get("name")?.as_str()?;
                Some((name.to_string(), map.clone()))
            })
            .collect(),
    )
}

fn field_to_element(name: &str, value: &Value, prior: Option<&HashMap<String, Dynamic>>) -> Dynamic {
    let mut element: HashMap<String, Dynamic> = VALUE_KEYS
        .iter()
        .map(|key| (key.to_string(), Dynamic::Null))
        .collect();
    element.insert("name".to_string(), Dynamic::String(name.to_string()));

    let prior_secret = prior
        .and_then(|p| p.get("sensitive_value"))
        .filter(|v| v.is_set());

    let (key, converted) = match value {
        Value::Bool(b) => ("bool_value", Dynamic::Bool(*b)),
        Value::Number(n) => ("number_value", n.as_f64().map_or(Dynamic::Null, Dynamic::Number)),
        Value::String(s) if s == MASKED_VALUE => (
            "sensitive_value",
            prior_secret.cloned().unwrap_or(Dynamic::Null),
        ),
        Value::String(s) if prior_secret.is_some() => ("sensitive_value", Dynamic::String(s.clone())),
        Value::String(s) => ("text_value", Dynamic::String(s.clone())),
        Value::Array(items) => (
            "set_value",
            Dynamic::List(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(Dynamic::String(s.clone())),
                        Value::Number(n) => Some(Dynamic::String(n.to_string())),
                        _ => None,
                    })
                    .collect(),
            ),
        ),
        other => ("text_value", Dynamic::String(other.to_string())),
    };
    element.insert(key.to_string(), converted);
    Dynamic::Map(element)
}

pub(crate) fn to_indexer(state: &DynamicValue) -> Indexer {
    Indexer {
        id: i64_value(state, "id").unwrap_or_default(),
        name: string_value(state, "name").unwrap_or_default(),
        enable: bool_value(state, "enable").unwrap_or_default(),
        app_profile_id: i64_value(state, "app_profile_id").unwrap_or_default(),
        priority: i64_value(state, "priority").unwrap_or_default(),
        implementation: string_value(state, "implementation").unwrap_or_default(),
        config_contract: string_value(state, "config_contract").unwrap_or_default(),
        protocol: string_value(state, "protocol").unwrap_or_default(),
        privacy: string_value(state, "privacy").unwrap_or_default(),
        language: string_value(state, "language").unwrap_or_default(),
        fields: state_to_fields(state),
        tags: int_set(state, "tags"),
    }
}

/// Builds the indexer state
///
/// With a `prior` state whose `fields` set is known only the fields named
/// there are stored, otherwise every field with a value.
pub(crate) fn to_state(indexer: &Indexer, prior: Option<&DynamicValue>) -> tfplug::Result<DynamicValue> {
    let mut state = DynamicValue::object();
    state.set_i64(&AttributePath::new("id"), indexer.id)?;
    state.set_string(&AttributePath::new("name"), indexer.name.clone())?;
    state.set_bool(&AttributePath::new("enable"), indexer.enable)?;
    state.set_i64(&AttributePath::new("app_profile_id"), indexer.app_profile_id)?;
    state.set_i64(&AttributePath::new("priority"), indexer.priority)?;
    state.set_string(
        &AttributePath::new("implementation"),
        indexer.implementation.clone(),
    )?;
    state.set_string(
        &AttributePath::new("config_contract"),
        indexer.config_contract.clone(),
    )?;
    state.set_string(&AttributePath::new("protocol"), indexer.protocol.clone())?;
    state.set_string(&AttributePath::new("privacy"), indexer.privacy.clone())?;
    state.set_string(&AttributePath::new("language"), indexer.language.clone())?;
    state.set_value(&AttributePath::new("tags"), int_set_value(&indexer.tags))?;

    let managed = prior.and_then(prior_elements);
    let elements = indexer
        .fields
        .iter()
        .filter_map(|field| {
            let value = field.value.as_ref().filter(|v| !v.is_null())?;
            let prior = match &managed {
                Some(managed) => Some(managed.get(&field.name)?),
                None => None,
            };
            Some(field_to_element(&field.name, value, prior))
        })
        .collect();
    state.set_list(&AttributePath::new("fields"), elements)?;
    Ok(state)
}

#[async_trait]
impl Resource for IndexerResource {
    fn type_name(&self) -> &str {
        "prowlarr_indexer"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: indexer_schema(),
            diagnostics: vec![],
        }
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let client = match self.client() {
            Ok(client) => client,
            Err(diag) => {
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics: vec![diag],
                }
            }
        };

        let indexer = to_indexer(&request.planned_state);
        let created = match client.indexers().endpoint().create(&indexer).await {
            Ok(created) => created,
            Err(e) => {
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics: vec![client_error(Action::Create, RESOURCE_NAME, &e)],
                }
            }
        };

        tracing::trace!("created {}: {}", RESOURCE_NAME, created.id);
        match to_state(&created, Some(&request.planned_state)) {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(e) => CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![state_error(RESOURCE_NAME, e)],
            },
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let client = match self.client() {
            Ok(client) => client,
            Err(diag) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![diag],
                }
            }
        };
        let Some(id) = i64_value(&request.current_state, "id") else {
            return ReadResourceResponse {
                new_state: None,
                diagnostics: vec![],
            };
        };

        match client.indexers().endpoint().get(id).await {
            Ok(indexer) => {
                tracing::trace!("read {}: {}", RESOURCE_NAME, indexer.id);
                match to_state(&indexer, Some(&request.current_state)) {
                    Ok(state) => ReadResourceResponse {
                        new_state: Some(state),
                        diagnostics: vec![],
                    },
                    Err(e) => ReadResourceResponse {
                        new_state: Some(request.current_state),
                        diagnostics: vec![state_error(RESOURCE_NAME, e)],
                    },
                }
            }
            Err(e) if e.is_not_found() => ReadResourceResponse {
                new_state: None,
                diagnostics: vec![],
            },
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![client_error(Action::Read, RESOURCE_NAME, &e)],
            },
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let client = match self.client() {
            Ok(client) => client,
            Err(diag) => {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics: vec![diag],
                }
            }
        };

        let mut indexer = to_indexer(&request.planned_state);
        if let Some(id) = i64_value(&request.prior_state, "id") {
            indexer.id = id;
        }

        let updated = match client.indexers().endpoint().update(indexer.id, &indexer).await {
            Ok(updated) => updated,
            Err(e) => {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics: vec![client_error(Action::Update, RESOURCE_NAME, &e)],
                }
            }
        };

        tracing::trace!("updated {}: {}", RESOURCE_NAME, updated.id);
        match to_state(&updated, Some(&request.planned_state)) {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(e) => UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![state_error(RESOURCE_NAME, e)],
            },
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let client = match self.client() {
            Ok(client) => client,
            Err(diag) => {
                return DeleteResourceResponse {
                    diagnostics: vec![diag],
                }
            }
        };
        let Some(id) = i64_value(&request.prior_state, "id") else {
            return DeleteResourceResponse {
                diagnostics: vec![],
            };
        };

        let diagnostics = match client.indexers().endpoint().delete(id).await {
            Ok(()) => {
                tracing::trace!("deleted {}: {}", RESOURCE_NAME, id);
                vec![]
            }
            Err(e) if e.is_not_found() => vec![],
            Err(e) => vec![client_error(Action::Delete, RESOURCE_NAME, &e)],
        };
        DeleteResourceResponse { diagnostics }
    }

    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse::default();
        import_state_passthrough_int_id(&ctx, AttributePath::new("id"), &request, &mut response);
        tracing::trace!("imported {}: {}", RESOURCE_NAME, request.id);
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for IndexerResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];
        match client_from(request.provider_data, Component::Resource) {
            Ok(client) => self.client = client,
            Err(diag) => diagnostics.push(diag),
        }
        ConfigureResourceResponse { diagnostics }
    }
}
