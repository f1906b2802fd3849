//! Sync profile resource implementation
//!
//! Sync profiles are Prowlarr's application profiles: they decide which
//! search types an indexer synchronised to an application is enabled for.

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

use crate::api::app_profiles::AppProfile;
use crate::api::Client;
use crate::helpers::errors::state_error;
use crate::helpers::schema::{bool_value, i64_value, id_attribute, name_attribute, string_value};
use crate::helpers::{client_error, client_from, not_configured, Action, Component};

const RESOURCE_NAME: &str = "sync_profile";

#[derive(Default)]
pub struct SyncProfileResource {
    client: Option<Client>,
}

impl SyncProfileResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self) -> Result<&Client, Diagnostic> {
        self.client.as_ref().ok_or_else(not_configured)
    }
}

pub(crate) fn sync_profile_schema() -> Schema {
    let flag = |name: &str, description: &str| {
        AttributeBuilder::new(name, AttributeType::Bool)
            .description(description)
            .optional()
            .computed()
            .build()
    };

    SchemaBuilder::new()
        .version(0)
        .description("Sync profile resource. Controls which searches synchronised indexers run.")
        .attribute(id_attribute("Sync profile ID."))
        .attribute(name_attribute("Sync profile name."))
        .attribute(flag("enable_rss", "Enable RSS flag."))
        .attribute(flag(
            "enable_interactive_search",
            "Enable interactive search flag.",
        ))
        .attribute(flag("enable_automatic_search", "Enable automatic search flag."))
        .attribute(
            AttributeBuilder::new("minimum_seeders", AttributeType::Number)
                .description("Minimum seeders.")
                .optional()
                .computed()
                .build(),
        )
        .build()
}

fn to_profile(state: &DynamicValue) -> AppProfile {
    AppProfile {
        id: i64_value(state, "id").unwrap_or_default(),
        name: string_value(state, "name").unwrap_or_default(),
        enable_rss: bool_value(state, "enable_rss").unwrap_or_default(),
        enable_interactive_search: bool_value(state, "enable_interactive_search")
            .unwrap_or_default(),
        enable_automatic_search: bool_value(state, "enable_automatic_search").unwrap_or_default(),
        minimum_seeders: i64_value(state, "minimum_seeders").unwrap_or_default(),
    }
}

pub(crate) fn to_state(profile: &AppProfile) -> tfplug::Result<DynamicValue> {
    let mut state = DynamicValue::object();
    state.set_i64(&AttributePath::new("id"), profile.id)?;
    state.set_string(&AttributePath::new("name"), profile.name.clone())?;
    state.set_bool(&AttributePath::new("enable_rss"), profile.enable_rss)?;
    state.set_bool(
        &AttributePath::new("enable_interactive_search"),
        profile.enable_interactive_search,
    )?;
    state.set_bool(
        &AttributePath::new("enable_automatic_search"),
        profile.enable_automatic_search,
    )?;
    state.set_i64(&AttributePath::new("minimum_seeders"), profile.minimum_seeders)?;
    Ok(state)
}

#[async_trait]
impl Resource for SyncProfileResource {
    fn type_name(&self) -> &str {
        "prowlarr_sync_profile"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: sync_profile_schema(),
            diagnostics: vec![],
        }
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let result = async {
            let created = self
                .client()?
                .app_profiles()
                .create(&to_profile(&request.planned_state))
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

        let profile = match client.app_profiles().get(id).await {
            Ok(profile) => profile,
            Err(e) if e.is_not_found() => {
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
            Err(e) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![client_error(Action::Read, RESOURCE_NAME, &e)],
                }
            }
        };

        tracing::trace!("read {}: {}", RESOURCE_NAME, profile.id);
        match to_state(&profile) {
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

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let result = async {
            let mut profile = to_profile(&request.planned_state);
            if let Some(id) = i64_value(&request.prior_state, "id") {
                profile.id = id;
            }
            let updated = self
                .client()?
                .app_profiles()
                .update(profile.id, &profile)
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

        let diagnostics = match client.app_profiles().delete(id).await {
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
impl ResourceWithConfigure for SyncProfileResource {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Credentials;
    use crate::provider_data::ProwlarrProviderData;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::sync::Arc;
    use tfplug::Dynamic;

    async fn configured(url: &str) -> SyncProfileResource {
        let client = Client::new(url, Credentials::ApiKey("key".into())).unwrap();
        let mut resource = SyncProfileResource::new();
        resource
            .configure(
                Context::new(),
                ConfigureResourceRequest {
                    provider_data: Some(Arc::new(ProwlarrProviderData::new(client))),
                },
            )
            .await;
        resource
    }

    fn planned() -> DynamicValue {
        let mut state = DynamicValue::object();
        state
            .set_string(&AttributePath::new("name"), "Automatic".to_string())
            .unwrap();
        state
            .set_bool(&AttributePath::new("enable_automatic_search"), true)
            .unwrap();
        state
            .set_i64(&AttributePath::new("minimum_seeders"), 3)
            .unwrap();
        state
            .set_value(&AttributePath::new("enable_rss"), Dynamic::Unknown)
            .unwrap();
        state
            .set_value(&AttributePath::new("id"), Dynamic::Unknown)
            .unwrap();
        state
    }

    #[tokio::test]
    async fn create_sends_profile() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/appprofile")
            .match_body(Matcher::Json(json!({
                "id": 0,
                "name": "Automatic",
                "enableRss": false,
                "enableInteractiveSearch": false,
                "enableAutomaticSearch": true,
                "minimumSeeders": 3
            })))
            .with_status(201)
            .with_body(
                r#"{"id":2,"name":"Automatic","enableRss":true,"enableInteractiveSearch":false,"enableAutomaticSearch":true,"minimumSeeders":3}"#,
            )
            .create_async()
            .await;

        let resource = configured(&server.url()).await;
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "prowlarr_sync_profile".to_string(),
                    planned_state: planned(),
                    config: planned(),
                },
            )
            .await;

        mock.assert_async().await;
        assert!(response.diagnostics.is_empty());
        let state = response.new_state;
        assert_eq!(state.get_i64(&AttributePath::new("id")).unwrap(), 2);
        assert!(state.get_bool(&AttributePath::new("enable_rss")).unwrap());
    }

    #[tokio::test]
    async fn failed_read_keeps_state() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/appprofile/2")
            .with_status(500)
            .with_body("database is locked")
            .create_async()
            .await;

        let resource = configured(&server.url()).await;
        let mut current = planned();
        current.set_i64(&AttributePath::new("id"), 2).unwrap();

        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "prowlarr_sync_profile".to_string(),
                    current_state: current.clone(),
                },
            )
            .await;

        assert_eq!(response.new_state, Some(current));
        assert_eq!(response.diagnostics[0].summary, "Client Error");
        assert!(response.diagnostics[0]
            .detail
            .starts_with("Unable to read sync_profile, got error:"));
    }

    #[tokio::test]
    async fn import_rejects_non_numeric_id() {
        let response = SyncProfileResource::new()
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "prowlarr_sync_profile".to_string(),
                    id: "standard".to_string(),
                },
            )
            .await;

        assert!(response.imported_resources.is_empty());
        assert_eq!(
            response.diagnostics[0].summary,
            "Unexpected Import Identifier"
        );
    }
}
