//! Resources for the field-bearing entity families
//!
//! Applications, download clients, indexer proxies and notifications share
//! one shape: a few top-level attributes plus a dynamic `fields` list. A
//! [`Family`] describes the endpoint and the field table of such a group; a
//! [`KindSpec`] narrows it to one implementation (`Sabnzbd`, `Discord`, ...)
//! with fixed implementation and contract names.
//!
//! The generic resource of a family exposes the whole field table and lets
//! the user choose `implementation` and `config_contract`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::marker::PhantomData;
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_int_id;
use tfplug::provider::ResourceFactory;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::OneOfInt;

use crate::api::endpoint::Endpoint;
use crate::api::{Client, FieldModel};
use crate::helpers::errors::state_error;
use crate::helpers::fields::{fields_to_state, int_set, int_set_value, state_to_fields};
use crate::helpers::schema::{
    i64_value, id_attribute, name_attribute, string_value, tags_attribute,
};
use crate::helpers::{client_error, client_from, not_configured, Action, Component, FieldSpec};

/// One implementation within a family
#[derive(Debug)]
pub struct KindSpec {
    /// Resource name without the provider prefix
    pub name: &'static str,
    pub implementation: &'static str,
    pub config_contract: &'static str,
    pub protocol: Option<&'static str>,
    /// Attribute names taken from the family field table
    pub fields: &'static [&'static str],
    pub required: &'static [&'static str],
    /// Integer attributes restricted to a set of values
    pub one_of: &'static [(&'static str, &'static [i64])],
}

impl KindSpec {
    pub const fn new(
        name: &'static str,
        implementation: &'static str,
        config_contract: &'static str,
        fields: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            implementation,
            config_contract,
            protocol: None,
            fields,
            required: &[],
            one_of: &[],
        }
    }

    pub const fn protocol(self, protocol: &'static str) -> Self {
        Self {
            protocol: Some(protocol),
            ..self
        }
    }

    pub const fn required(self, required: &'static [&'static str]) -> Self {
        Self { required, ..self }
    }

    pub const fn one_of(self, one_of: &'static [(&'static str, &'static [i64])]) -> Self {
        Self { one_of, ..self }
    }
}

/// A group of entity kinds sharing one endpoint and one field table
pub trait Family: Send + Sync + 'static {
    type Model: FieldModel + Serialize + DeserializeOwned + Default + Send + Sync;

    /// Generic resource name, e.g. `download_client`
    const NAME: &'static str;
    /// List data source name, e.g. `download_clients`
    const PLURAL: &'static str;
    /// Human readable name used in descriptions
    const TITLE: &'static str;
    const FIELDS: &'static [FieldSpec];
    /// Allowed values of integer fields on the generic resource
    const ONE_OF: &'static [(&'static str, &'static [i64])] = &[];

    fn endpoint(client: &Client) -> Endpoint<'_, Self::Model>;

    /// Attributes besides id, name, tags, implementation, config_contract
    /// and the field table
    fn attributes(kind: Option<&KindSpec>) -> Vec<Attribute>;

    /// Copies the family attributes from state into the model
    fn write_model(state: &DynamicValue, kind: Option<&KindSpec>, model: &mut Self::Model);

    /// Copies the family attributes from the model into state
    fn read_model(
        model: &Self::Model,
        kind: Option<&KindSpec>,
        state: &mut DynamicValue,
    ) -> tfplug::Result<()>;
}

/// Field table entries exposed by a kind, or the whole table
pub fn field_specs<F: Family>(kind: Option<&KindSpec>) -> Vec<&'static FieldSpec> {
    match kind {
        None => F::FIELDS.iter().collect(),
        Some(kind) => kind
            .fields
            .iter()
            .filter_map(|name| F::FIELDS.iter().find(|spec| spec.attribute == *name))
            .collect(),
    }
}

fn field_attribute<F: Family>(spec: &FieldSpec, kind: Option<&KindSpec>) -> Attribute {
    let (required, one_of) = match kind {
        Some(kind) => (kind.required.contains(&spec.attribute), kind.one_of),
        None => (false, F::ONE_OF),
    };

    let mut builder = if required {
        spec.builder().required()
    } else {
        spec.builder().optional().computed()
    };
    if let Some((_, values)) = one_of.iter().find(|(name, _)| *name == spec.attribute) {
        builder = builder.validator(Box::new(OneOfInt::new(values)));
    }
    builder.build()
}

pub fn family_schema<F: Family>(kind: Option<&KindSpec>) -> Schema {
    let title = match kind {
        Some(kind) => format!("{} {}", F::TITLE, kind.implementation),
        None => F::TITLE.to_string(),
    };

    let mut builder = SchemaBuilder::new()
        .version(0)
        .description(&format!("{} resource.", title))
        .attribute(id_attribute(&format!("{} ID.", F::TITLE)))
        .attribute(name_attribute(&format!("{} name.", F::TITLE)))
        .attribute(tags_attribute());

    if kind.is_none() {
        builder = builder
            .attribute(
                AttributeBuilder::new("implementation", AttributeType::String)
                    .description(&format!("{} implementation name.", F::TITLE))
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("config_contract", AttributeType::String)
                    .description(&format!("{} configuration template.", F::TITLE))
                    .required()
                    .build(),
            );
    }

    builder
        .attributes(F::attributes(kind))
        .attributes(
            field_specs::<F>(kind)
                .into_iter()
                .map(|spec| field_attribute::<F>(spec, kind)),
        )
        .build()
}

/// Builds the API model from a planned or prior state
pub fn to_model<F: Family>(state: &DynamicValue, kind: Option<&KindSpec>) -> F::Model {
    let mut model = F::Model::default();
    if let Some(id) = i64_value(state, "id") {
        model.set_id(id);
    }
    model.set_name(string_value(state, "name").unwrap_or_default());
    model.set_tags(int_set(state, "tags"));

    match kind {
        Some(kind) => {
            model.set_implementation(kind.implementation.to_string());
            model.set_config_contract(kind.config_contract.to_string());
        }
        None => {
            model.set_implementation(string_value(state, "implementation").unwrap_or_default());
            model.set_config_contract(string_value(state, "config_contract").unwrap_or_default());
        }
    }

    model.set_fields(state_to_fields(field_specs::<F>(kind), state));
    F::write_model(state, kind, &mut model);
    model
}

/// Builds the Terraform state from an API model
///
/// `prior` supplies the values of secrets the API returns masked.
pub fn to_state<F: Family>(
    model: &F::Model,
    kind: Option<&KindSpec>,
    prior: &DynamicValue,
) -> tfplug::Result<DynamicValue> {
    let mut state = DynamicValue::object();
    state.set_i64(&AttributePath::new("id"), model.id())?;
    state.set_string(&AttributePath::new("name"), model.name().to_string())?;
    state.set_value(&AttributePath::new("tags"), int_set_value(model.tags()))?;

    if kind.is_none() {
        state.set_string(
            &AttributePath::new("implementation"),
            model.implementation().to_string(),
        )?;
        state.set_string(
            &AttributePath::new("config_contract"),
            model.config_contract().to_string(),
        )?;
    }

    F::read_model(model, kind, &mut state)?;
    fields_to_state(field_specs::<F>(kind), model.fields(), prior, &mut state)?;
    Ok(state)
}

/// Generic or kind specific resource of a family
pub struct FamilyResource<F: Family> {
    kind: Option<&'static KindSpec>,
    type_name: String,
    client: Option<Client>,
    _family: PhantomData<fn() -> F>,
}

impl<F: Family> FamilyResource<F> {
    pub fn generic() -> Self {
        Self {
            kind: None,
            type_name: format!("prowlarr_{}", F::NAME),
            client: None,
            _family: PhantomData,
        }
    }

    pub fn kind(kind: &'static KindSpec) -> Self {
        Self {
            kind: Some(kind),
            type_name: format!("prowlarr_{}", kind.name),
            client: None,
            _family: PhantomData,
        }
    }

    fn name(&self) -> &'static str {
        self.kind.map_or(F::NAME, |kind| kind.name)
    }

    fn client(&self) -> Result<&Client, Diagnostic> {
        self.client.as_ref().ok_or_else(not_configured)
    }

    fn state(&self, model: &F::Model, prior: &DynamicValue) -> Result<DynamicValue, Diagnostic> {
        to_state::<F>(model, self.kind, prior).map_err(|e| state_error(self.name(), e))
    }
}

/// Registers the generic resource of a family and one resource per kind
pub fn register<F: Family>(kinds: &'static [KindSpec], resources: &mut HashMap<String, ResourceFactory>) {
    resources.insert(
        format!("prowlarr_{}", F::NAME),
        Box::new(|| Box::new(FamilyResource::<F>::generic()) as Box<dyn ResourceWithConfigure>),
    );
    for kind in kinds {
        resources.insert(
            format!("prowlarr_{}", kind.name),
            Box::new(move || {
                Box::new(FamilyResource::<F>::kind(kind)) as Box<dyn ResourceWithConfigure>
            }),
        );
    }
}

#[async_trait]
impl<F: Family> Resource for FamilyResource<F> {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: family_schema::<F>(self.kind),
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

        let model = to_model::<F>(&request.planned_state, self.kind);
        let created = match F::endpoint(client).create(&model).await {
            Ok(created) => created,
            Err(e) => {
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics: vec![client_error(Action::Create, self.name(), &e)],
                }
            }
        };

        tracing::trace!("created {}: {}", self.name(), created.id());
        match self.state(&created, &request.planned_state) {
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

        match F::endpoint(client).get(id).await {
            Ok(model) => {
                tracing::trace!("read {}: {}", self.name(), model.id());
                match self.state(&model, &request.current_state) {
                    Ok(state) => ReadResourceResponse {
                        new_state: Some(state),
                        diagnostics: vec![],
                    },
                    Err(diag) => ReadResourceResponse {
                        new_state: Some(request.current_state),
                        diagnostics: vec![diag],
                    },
                }
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} {} no longer exists, removing from state", self.name(), id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![client_error(Action::Read, self.name(), &e)],
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

        let mut model = to_model::<F>(&request.planned_state, self.kind);
        let id = i64_value(&request.planned_state, "id")
            .or_else(|| i64_value(&request.prior_state, "id"))
            .unwrap_or_default();
        model.set_id(id);

        let updated = match F::endpoint(client).update(id, &model).await {
            Ok(updated) => updated,
            Err(e) => {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics: vec![client_error(Action::Update, self.name(), &e)],
                }
            }
        };

        tracing::trace!("updated {}: {}", self.name(), updated.id());
        match self.state(&updated, &request.planned_state) {
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

        match F::endpoint(client).delete(id).await {
            Ok(()) => {
                tracing::trace!("deleted {}: {}", self.name(), id);
                DeleteResourceResponse {
                    diagnostics: vec![],
                }
            }
            Err(e) if e.is_not_found() => DeleteResourceResponse {
                diagnostics: vec![],
            },
            Err(e) => DeleteResourceResponse {
                diagnostics: vec![client_error(Action::Delete, self.name(), &e)],
            },
        }
    }

    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse::default();
        import_state_passthrough_int_id(&ctx, AttributePath::new("id"), &request, &mut response);
        tracing::trace!("imported {}: {}", self.name(), request.id);
        response
    }
}

#[async_trait]
impl<F: Family> ResourceWithConfigure for FamilyResource<F> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        match client_from(request.provider_data, Component::Resource) {
            Ok(client) => {
                self.client = client;
                ConfigureResourceResponse {
                    diagnostics: vec![],
                }
            }
            Err(diag) => ConfigureResourceResponse {
                diagnostics: vec![diag],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Credentials;
    use crate::provider_data::ProwlarrProviderData;
    use crate::resources::applications::Applications;
    use crate::resources::indexer_proxies::{self, IndexerProxies};
    use mockito::Server;
    use serde_json::json;
    use std::sync::Arc;
    use tfplug::types::Dynamic;

    async fn configure<F: Family>(
        mut resource: FamilyResource<F>,
        url: &str,
    ) -> FamilyResource<F> {
        let client = Client::new(url, Credentials::ApiKey("key".into())).unwrap();
        let response = resource
            .configure(
                Context::new(),
                ConfigureResourceRequest {
                    provider_data: Some(Arc::new(ProwlarrProviderData::new(client))),
                },
            )
            .await;
        assert!(response.diagnostics.is_empty());
        resource
    }

    fn http_proxy() -> &'static KindSpec {
        indexer_proxies::KINDS
            .iter()
            .find(|kind| kind.name == "indexer_proxy_http")
            .unwrap()
    }

    fn proxy_state(id: i64) -> DynamicValue {
        let mut state = DynamicValue::object();
        state.set_i64(&AttributePath::new("id"), id).unwrap();
        state
            .set_string(&AttributePath::new("name"), "proxy".to_string())
            .unwrap();
        state
            .set_string(&AttributePath::new("host"), "proxy.local".to_string())
            .unwrap();
        state.set_i64(&AttributePath::new("port"), 8080).unwrap();
        state
    }

    #[tokio::test]
    async fn read_of_deleted_kind_clears_state() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/indexerproxy/4")
            .with_status(404)
            .create_async()
            .await;

        let resource = configure(
            FamilyResource::<IndexerProxies>::kind(http_proxy()),
            &server.url(),
        )
        .await;
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "prowlarr_indexer_proxy_http".to_string(),
                    current_state: proxy_state(4),
                },
            )
            .await;

        mock.assert_async().await;
        assert!(response.new_state.is_none());
        assert!(response.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn read_of_deleted_generic_clears_state() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/applications/2")
            .with_status(404)
            .create_async()
            .await;

        let resource = configure(FamilyResource::<Applications>::generic(), &server.url()).await;
        let mut current = DynamicValue::object();
        current.set_i64(&AttributePath::new("id"), 2).unwrap();
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "prowlarr_application".to_string(),
                    current_state: current,
                },
            )
            .await;

        assert!(response.new_state.is_none());
        assert!(response.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn failed_read_keeps_state() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/indexerproxy/4")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let resource = configure(
            FamilyResource::<IndexerProxies>::kind(http_proxy()),
            &server.url(),
        )
        .await;
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "prowlarr_indexer_proxy_http".to_string(),
                    current_state: proxy_state(4),
                },
            )
            .await;

        assert_eq!(response.new_state, Some(proxy_state(4)));
        assert_eq!(response.diagnostics[0].summary, "Client Error");
        assert!(response.diagnostics[0]
            .detail
            .starts_with("Unable to read indexer_proxy_http, got error:"));
    }

    #[tokio::test]
    async fn read_refreshes_kind_fields() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/indexerproxy/4")
            .with_body(
                json!({
                    "id": 4,
                    "name": "proxy",
                    "implementation": "Http",
                    "configContract": "HttpSettings",
                    "fields": [
                        {"name": "host", "value": "proxy.lan"},
                        {"name": "port", "value": 3128}
                    ],
                    "tags": [1]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let resource = configure(
            FamilyResource::<IndexerProxies>::kind(http_proxy()),
            &server.url(),
        )
        .await;
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "prowlarr_indexer_proxy_http".to_string(),
                    current_state: proxy_state(4),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state = response.new_state.unwrap();
        assert_eq!(
            state.get_string(&AttributePath::new("host")).unwrap(),
            "proxy.lan"
        );
        assert_eq!(state.get_i64(&AttributePath::new("port")).unwrap(), 3128);
        assert_eq!(
            state.get_list(&AttributePath::new("tags")).unwrap(),
            vec![Dynamic::Number(1.0)]
        );
    }

    #[tokio::test]
    async fn import_rejects_non_numeric_id() {
        let response = FamilyResource::<IndexerProxies>::kind(http_proxy())
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "prowlarr_indexer_proxy_http".to_string(),
                    id: "proxy".to_string(),
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
