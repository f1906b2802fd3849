//! Tag resource implementation

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_int_id;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use crate::api::tags::Tag;
use crate::api::Client;
use crate::helpers::errors::state_error;
use crate::helpers::schema::{i64_value, id_attribute, string_value};
use crate::helpers::{client_error, client_from, not_configured, Action, Component};

const RESOURCE_NAME: &str = "tag";

#[derive(Default)]
pub struct TagResource {
    client: Option<Client>,
}

impl TagResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self) -> Result<&Client, Diagnostic> {
        self.client.as_ref().ok_or_else(not_configured)
    }
}

pub(crate) fn tag_schema() -> Schema {
    SchemaBuilder::new()
        .version(0)
        .description("Tag resource.")
        .attribute(id_attribute("Tag ID."))
        .attribute(
            AttributeBuilder::new("label", AttributeType::String)
                .description("Tag label. It must be lowercase.")
                .required()
                .build(),
        )
        .build()
}

fn to_tag(state: &DynamicValue) -> Tag {
    Tag {
        id: i64_value(state, "id").unwrap_or_default(),
        label: string_value(state, "label").unwrap_or_default(),
    }
}

pub(crate) fn to_state(tag: &Tag) -> tfplug::Result<DynamicValue> {
    let mut state = DynamicValue::object();
    state.set_i64(&AttributePath::new("id"), tag.id)?;
    state.set_string(&AttributePath::new("label"), tag.label.clone())?;
    Ok(state)
}

#[async_trait]
impl Resource for TagResource {
    fn type_name(&self) -> &str {
        "prowlarr_tag"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: tag_schema(),
            diagnostics: vec![],
        }
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let result = async {
            let client = self.client()?;
            let created = client
                .tags()
                .endpoint()
                .create(&to_tag(&request.planned_state))
                .await
                .map_err(|e| client_error(Action::Create, RESOURCE_NAME, &e))?;
            tracing::trace!("created {}: {}", RESOURCE_NAME, created.id);
            to_state(&created).map_err(|e| state_error(RESOURCE_NAME, e))
        }
        .await;

        match result {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diag) => CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![diag],
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

        match client.tags().endpoint().get(id).await {
            Ok(tag) => {
                tracing::trace!("read {}: {}", RESOURCE_NAME, tag.id);
                match to_state(&tag) {
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
        let result = async {
            let client = self.client()?;
            let mut tag = to_tag(&request.planned_state);
            if let Some(id) = i64_value(&request.prior_state, "id") {
                tag.id = id;
            }
            let updated = client
                .tags()
                .endpoint()
                .update(tag.id, &tag)
                .await
                .map_err(|e| client_error(Action::Update, RESOURCE_NAME, &e))?;
            tracing::trace!("updated {}: {}", RESOURCE_NAME, updated.id);
            to_state(&updated).map_err(|e| state_error(RESOURCE_NAME, e))
        }
        .await;

        match result {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diag) => UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![diag],
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

        let diagnostics = match client.tags().endpoint().delete(id).await {
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
impl ResourceWithConfigure for TagResource {
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
