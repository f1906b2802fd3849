//! gRPC service implementation of the Terraform Plugin Protocol v6
//!
//! `GrpcProviderServer` adapts a [`Provider`] to the tonic-generated
//! `tfplugin6.Provider` service. Resources and data sources are created from
//! the provider's factories on every call and configured with the provider
//! data captured during `ConfigureProvider`, so no per-instance locking is
//! needed.

use crate::context::Context;
use crate::data_source::{
    ConfigureDataSourceRequest, DataSourceSchemaRequest, DataSourceWithConfigure,
    ReadDataSourceRequest, ValidateDataSourceConfigRequest,
};
use crate::error::{Result, TfplugError};
use crate::plan_modifier::values_equal;
use crate::proto;
use crate::provider::{
    ConfigureProviderRequest, DataSourceFactory, Provider, ProviderData, ProviderMetadataRequest,
    ProviderSchemaRequest, ResourceFactory, StopProviderRequest, ValidateProviderConfigRequest,
};
use crate::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ReadResourceRequest, ResourceSchemaRequest, ResourceWithConfigure,
    UpdateResourceRequest, ValidateResourceConfigRequest,
};
use crate::schema::{
    Attribute, ObjectNestingMode, PlanModifierRequest, Schema, StringKind, ValidatorRequest,
};
use crate::types::{
    has_errors, AttributePath, AttributePathStep, Diagnostic, DiagnosticSeverity, Dynamic,
    DynamicValue,
};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Request, Response, Status};

pub struct GrpcProviderServer<P: Provider> {
    provider: Arc<RwLock<P>>,
    provider_data: Arc<RwLock<Option<ProviderData>>>,
    resources: Arc<HashMap<String, ResourceFactory>>,
    data_sources: Arc<HashMap<String, DataSourceFactory>>,
    lifetime: Context,
}

impl<P: Provider + 'static> GrpcProviderServer<P> {
    pub fn new(provider: P) -> Self {
        let resources = provider.resources();
        let data_sources = provider.data_sources();

        Self {
            provider: Arc::new(RwLock::new(provider)),
            provider_data: Arc::new(RwLock::new(None)),
            resources: Arc::new(resources),
            data_sources: Arc::new(data_sources),
            lifetime: Context::new(),
        }
    }

    /// Context handed to every trait call; cancelled by StopProvider
    fn context(&self) -> Context {
        self.lifetime.clone()
    }

    async fn resource(
        &self,
        type_name: &str,
        configure: bool,
    ) -> std::result::Result<Box<dyn ResourceWithConfigure>, Vec<Diagnostic>> {
        let factory = self.resources.get(type_name).ok_or_else(|| {
            vec![Diagnostic::error(
                "Resource Type Not Found",
                TfplugError::ResourceNotFound(type_name.to_string()).to_string(),
            )]
        })?;

        let mut resource = factory();
        if configure {
            let provider_data = self.provider_data.read().await.clone();
            let response = resource
                .configure(self.context(), ConfigureResourceRequest { provider_data })
                .await;
            if has_errors(&response.diagnostics) {
                return Err(response.diagnostics);
            }
        }

        Ok(resource)
    }

    async fn data_source(
        &self,
        type_name: &str,
        configure: bool,
    ) -> std::result::Result<Box<dyn DataSourceWithConfigure>, Vec<Diagnostic>> {
        let factory = self.data_sources.get(type_name).ok_or_else(|| {
            vec![Diagnostic::error(
                "Data Source Type Not Found",
                TfplugError::DataSourceNotFound(type_name.to_string()).to_string(),
            )]
        })?;

        let mut data_source = factory();
        if configure {
            let provider_data = self.provider_data.read().await.clone();
            let response = data_source
                .configure(self.context(), ConfigureDataSourceRequest { provider_data })
                .await;
            if has_errors(&response.diagnostics) {
                return Err(response.diagnostics);
            }
        }

        Ok(data_source)
    }

    async fn resource_schema(
        &self,
        resource: &dyn ResourceWithConfigure,
    ) -> std::result::Result<Schema, Vec<Diagnostic>> {
        let response = resource
            .schema(self.context(), ResourceSchemaRequest)
            .await;
        if has_errors(&response.diagnostics) {
            return Err(response.diagnostics);
        }
        Ok(response.schema)
    }
}

#[tonic::async_trait]
impl<P: Provider + 'static> proto::ProviderService for GrpcProviderServer<P> {
    async fn get_metadata(
        &self,
        _request: Request<proto::get_metadata::Request>,
    ) -> std::result::Result<Response<proto::get_metadata::Response>, Status> {
        let provider = self.provider.read().await;
        let metadata = provider
            .metadata(self.context(), ProviderMetadataRequest)
            .await;

        Ok(Response::new(proto::get_metadata::Response {
            server_capabilities: Some(server_capabilities(&metadata.server_capabilities)),
            diagnostics: vec![],
            data_sources: sorted_keys(&self.data_sources)
                .into_iter()
                .map(|type_name| proto::get_metadata::DataSourceMetadata { type_name })
                .collect(),
            resources: sorted_keys(&self.resources)
                .into_iter()
                .map(|type_name| proto::get_metadata::ResourceMetadata { type_name })
                .collect(),
        }))
    }

    async fn get_provider_schema(
        &self,
        _request: Request<proto::get_provider_schema::Request>,
    ) -> std::result::Result<Response<proto::get_provider_schema::Response>, Status> {
        let provider = self.provider.read().await;
        let metadata = provider
            .metadata(self.context(), ProviderMetadataRequest)
            .await;
        let provider_schema = provider.schema(self.context(), ProviderSchemaRequest).await;
        drop(provider);

        let mut diagnostics = provider_schema.diagnostics;

        let resource_schemas = join_all(self.resources.iter().map(|(name, factory)| async move {
            let resource = factory();
            let response = resource.schema(self.context(), ResourceSchemaRequest).await;
            (name.clone(), response.schema, response.diagnostics)
        }))
        .await;

        let data_source_schemas =
            join_all(self.data_sources.iter().map(|(name, factory)| async move {
                let data_source = factory();
                let response = data_source
                    .schema(self.context(), DataSourceSchemaRequest)
                    .await;
                (name.clone(), response.schema, response.diagnostics)
            }))
            .await;

        let mut resources = HashMap::new();
        for (name, schema, diags) in resource_schemas {
            diagnostics.extend(diags);
            resources.insert(name, schema_to_proto(&schema));
        }

        let mut data_sources = HashMap::new();
        for (name, schema, diags) in data_source_schemas {
            diagnostics.extend(diags);
            data_sources.insert(name, schema_to_proto(&schema));
        }

        tracing::debug!(
            resources = resources.len(),
            data_sources = data_sources.len(),
            "served provider schema"
        );

        Ok(Response::new(proto::get_provider_schema::Response {
            provider: Some(schema_to_proto(&provider_schema.schema)),
            resource_schemas: resources,
            data_source_schemas: data_sources,
            diagnostics: diagnostics_to_proto(diagnostics),
            provider_meta: None,
            server_capabilities: Some(server_capabilities(&metadata.server_capabilities)),
        }))
    }

    async fn validate_provider_config(
        &self,
        request: Request<proto::validate_provider_config::Request>,
    ) -> std::result::Result<Response<proto::validate_provider_config::Response>, Status> {
        let req = request.into_inner();
        let config = decode_dynamic_value(&req.config)?;

        let provider = self.provider.read().await;
        let schema = provider
            .schema(self.context(), ProviderSchemaRequest)
            .await
            .schema;
        let mut diagnostics = run_validators(&schema.block.attributes, &config.value, &AttributePath::root());
        diagnostics.extend(
            provider
                .validate(self.context(), ValidateProviderConfigRequest { config })
                .await
                .diagnostics,
        );

        Ok(Response::new(proto::validate_provider_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn validate_resource_config(
        &self,
        request: Request<proto::validate_resource_config::Request>,
    ) -> std::result::Result<Response<proto::validate_resource_config::Response>, Status> {
        let req = request.into_inner();
        let config = decode_dynamic_value(&req.config)?;

        let diagnostics = match self.resource(&req.type_name, false).await {
            Ok(resource) => match self.resource_schema(resource.as_ref()).await {
                Ok(schema) => {
                    let mut diagnostics = run_validators(
                        &schema.block.attributes,
                        &config.value,
                        &AttributePath::root(),
                    );
                    diagnostics.extend(
                        resource
                            .validate(
                                self.context(),
                                ValidateResourceConfigRequest {
                                    type_name: req.type_name.clone(),
                                    config,
                                },
                            )
                            .await
                            .diagnostics,
                    );
                    diagnostics
                }
                Err(diags) => diags,
            },
            Err(diags) => diags,
        };

        Ok(Response::new(proto::validate_resource_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn validate_data_resource_config(
        &self,
        request: Request<proto::validate_data_resource_config::Request>,
    ) -> std::result::Result<Response<proto::validate_data_resource_config::Response>, Status> {
        let req = request.into_inner();
        let config = decode_dynamic_value(&req.config)?;

        let diagnostics = match self.data_source(&req.type_name, false).await {
            Ok(data_source) => {
                let schema = data_source
                    .schema(self.context(), DataSourceSchemaRequest)
                    .await
                    .schema;
                let mut diagnostics = run_validators(
                    &schema.block.attributes,
                    &config.value,
                    &AttributePath::root(),
                );
                diagnostics.extend(
                    data_source
                        .validate(
                            self.context(),
                            ValidateDataSourceConfigRequest {
                                type_name: req.type_name.clone(),
                                config,
                            },
                        )
                        .await
                        .diagnostics,
                );
                diagnostics
            }
            Err(diags) => diags,
        };

        Ok(Response::new(proto::validate_data_resource_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn upgrade_resource_state(
        &self,
        request: Request<proto::upgrade_resource_state::Request>,
    ) -> std::result::Result<Response<proto::upgrade_resource_state::Response>, Status> {
        let req = request.into_inner();

        let schema = match self.resource(&req.type_name, false).await {
            Ok(resource) => self.resource_schema(resource.as_ref()).await,
            Err(diags) => Err(diags),
        };
        let schema = match schema {
            Ok(schema) => schema,
            Err(diags) => {
                return Ok(Response::new(proto::upgrade_resource_state::Response {
                    upgraded_state: None,
                    diagnostics: diagnostics_to_proto(diags),
                }))
            }
        };

        if req.version > schema.version {
            return Ok(Response::new(proto::upgrade_resource_state::Response {
                upgraded_state: None,
                diagnostics: diagnostics_to_proto(vec![Diagnostic::error(
                    "Unable to Upgrade Resource State",
                    format!(
                        "State version {} of {} is newer than the provider schema version {}",
                        req.version, req.type_name, schema.version
                    ),
                )]),
            }));
        }

        let raw = req.raw_state.map(|raw| raw.json).unwrap_or_default();
        let mut state = DynamicValue::decode_json(&raw)?;
        complete_object(&schema.block.attributes, &mut state.value, true);

        Ok(Response::new(proto::upgrade_resource_state::Response {
            upgraded_state: Some(encode_dynamic_value(&state)?),
            diagnostics: vec![],
        }))
    }

    async fn configure_provider(
        &self,
        request: Request<proto::configure_provider::Request>,
    ) -> std::result::Result<Response<proto::configure_provider::Response>, Status> {
        let req = request.into_inner();
        let config = decode_dynamic_value(&req.config)?;

        tracing::debug!(terraform_version = %req.terraform_version, "configuring provider");

        let mut provider = self.provider.write().await;
        let response = provider
            .configure(
                self.context(),
                ConfigureProviderRequest {
                    terraform_version: req.terraform_version,
                    config,
                },
            )
            .await;

        if let Some(data) = response.provider_data {
            *self.provider_data.write().await = Some(data);
        }

        Ok(Response::new(proto::configure_provider::Response {
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    async fn read_resource(
        &self,
        request: Request<proto::read_resource::Request>,
    ) -> std::result::Result<Response<proto::read_resource::Response>, Status> {
        let req = request.into_inner();
        let current_state = decode_dynamic_value(&req.current_state)?;

        let resource = match self.resource(&req.type_name, true).await {
            Ok(resource) => resource,
            Err(diags) => return Ok(read_response(req.current_state, diags)),
        };
        let schema = match self.resource_schema(resource.as_ref()).await {
            Ok(schema) => schema,
            Err(diags) => return Ok(read_response(req.current_state, diags)),
        };

        let response = resource
            .read(
                self.context(),
                ReadResourceRequest {
                    type_name: req.type_name.clone(),
                    current_state,
                },
            )
            .await;

        if has_errors(&response.diagnostics) {
            return Ok(read_response(req.current_state, response.diagnostics));
        }

        let new_state = match response.new_state {
            Some(mut state) => {
                complete_object(&schema.block.attributes, &mut state.value, true);
                state
            }
            None => {
                tracing::debug!(type_name = %req.type_name, "resource no longer exists, removing from state");
                DynamicValue::null()
            }
        };

        Ok(read_response(
            Some(encode_dynamic_value(&new_state)?),
            response.diagnostics,
        ))
    }

    async fn plan_resource_change(
        &self,
        request: Request<proto::plan_resource_change::Request>,
    ) -> std::result::Result<Response<proto::plan_resource_change::Response>, Status> {
        let req = request.into_inner();
        let prior_state = decode_dynamic_value(&req.prior_state)?;
        let proposed_new_state = decode_dynamic_value(&req.proposed_new_state)?;
        let config = decode_dynamic_value(&req.config)?;

        // Destroy plans are passed through unchanged
        if proposed_new_state.is_null() {
            return Ok(plan_response(
                Some(encode_dynamic_value(&proposed_new_state)?),
                vec![],
                vec![],
            ));
        }

        let schema = match self.resource(&req.type_name, false).await {
            Ok(resource) => self.resource_schema(resource.as_ref()).await,
            Err(diags) => Err(diags),
        };
        let schema = match schema {
            Ok(schema) => schema,
            Err(diags) => return Ok(plan_response(req.proposed_new_state, vec![], diags)),
        };

        let mut planned = proposed_new_state.clone();
        complete_object(&schema.block.attributes, &mut planned.value, false);

        let is_create = prior_state.is_null();
        if is_create || !values_equal(&prior_state.value, &proposed_new_state.value) {
            mark_computed_unknown(&schema.block.attributes, &config.value, &mut planned.value);
        }

        let mut requires_replace = Vec::new();
        let mut diagnostics = Vec::new();
        for attribute in schema
            .block
            .attributes
            .iter()
            .filter(|a| !a.plan_modifiers.is_empty())
        {
            let path = AttributePath::new(&attribute.name);
            let mut plan_value = lookup(&planned.value, &attribute.name);
            let state_value = lookup(&prior_state.value, &attribute.name);
            let config_value = lookup(&config.value, &attribute.name);

            for modifier in &attribute.plan_modifiers {
                let response = modifier.modify(PlanModifierRequest {
                    config_value: config_value.clone(),
                    state_value: state_value.clone(),
                    plan_value,
                    path: path.clone(),
                });
                plan_value = response.plan_value;
                diagnostics.extend(response.diagnostics);
                if response.requires_replace && !is_create {
                    requires_replace.push(path.clone());
                }
            }

            planned.set_value(&path, plan_value)?;
        }

        tracing::debug!(
            type_name = %req.type_name,
            create = is_create,
            replace = requires_replace.len(),
            "planned resource change"
        );

        Ok(plan_response(
            Some(encode_dynamic_value(&planned)?),
            requires_replace.iter().map(path_to_proto).collect(),
            diagnostics,
        ))
    }

    async fn apply_resource_change(
        &self,
        request: Request<proto::apply_resource_change::Request>,
    ) -> std::result::Result<Response<proto::apply_resource_change::Response>, Status> {
        let req = request.into_inner();
        let prior_state = decode_dynamic_value(&req.prior_state)?;
        let planned_state = decode_dynamic_value(&req.planned_state)?;
        let config = decode_dynamic_value(&req.config)?;

        let resource = match self.resource(&req.type_name, true).await {
            Ok(resource) => resource,
            Err(diags) => return Ok(apply_response(req.prior_state, diags)),
        };
        let schema = match self.resource_schema(resource.as_ref()).await {
            Ok(schema) => schema,
            Err(diags) => return Ok(apply_response(req.prior_state, diags)),
        };

        let ctx = self.context();
        let type_name = req.type_name.clone();

        let (mut new_state, diagnostics) = if planned_state.is_null() {
            let response = resource
                .delete(
                    ctx,
                    DeleteResourceRequest {
                        type_name,
                        prior_state: prior_state.clone(),
                    },
                )
                .await;
            if has_errors(&response.diagnostics) {
                (prior_state, response.diagnostics)
            } else {
                (DynamicValue::null(), response.diagnostics)
            }
        } else if prior_state.is_null() {
            let response = resource
                .create(
                    ctx,
                    CreateResourceRequest {
                        type_name,
                        planned_state,
                        config,
                    },
                )
                .await;
            if has_errors(&response.diagnostics) {
                (DynamicValue::null(), response.diagnostics)
            } else {
                (response.new_state, response.diagnostics)
            }
        } else {
            let response = resource
                .update(
                    ctx,
                    UpdateResourceRequest {
                        type_name,
                        prior_state: prior_state.clone(),
                        planned_state,
                        config,
                    },
                )
                .await;
            if has_errors(&response.diagnostics) {
                (prior_state, response.diagnostics)
            } else {
                (response.new_state, response.diagnostics)
            }
        };

        complete_object(&schema.block.attributes, &mut new_state.value, true);

        Ok(apply_response(
            Some(encode_dynamic_value(&new_state)?),
            diagnostics,
        ))
    }

    async fn import_resource_state(
        &self,
        request: Request<proto::import_resource_state::Request>,
    ) -> std::result::Result<Response<proto::import_resource_state::Response>, Status> {
        let req = request.into_inner();

        let resource = match self.resource(&req.type_name, true).await {
            Ok(resource) => resource,
            Err(diags) => return Ok(import_response(vec![], diags)),
        };
        let schema = match self.resource_schema(resource.as_ref()).await {
            Ok(schema) => schema,
            Err(diags) => return Ok(import_response(vec![], diags)),
        };

        let response = resource
            .import_state(
                self.context(),
                ImportResourceStateRequest {
                    type_name: req.type_name,
                    id: req.id,
                },
            )
            .await;

        let mut imported = Vec::with_capacity(response.imported_resources.len());
        for mut resource in response.imported_resources {
            complete_object(&schema.block.attributes, &mut resource.state.value, true);
            imported.push(proto::import_resource_state::ImportedResource {
                type_name: resource.type_name,
                state: Some(encode_dynamic_value(&resource.state)?),
                private: vec![],
            });
        }

        Ok(import_response(imported, response.diagnostics))
    }

    async fn read_data_source(
        &self,
        request: Request<proto::read_data_source::Request>,
    ) -> std::result::Result<Response<proto::read_data_source::Response>, Status> {
        let req = request.into_inner();
        let config = decode_dynamic_value(&req.config)?;

        let data_source = match self.data_source(&req.type_name, true).await {
            Ok(data_source) => data_source,
            Err(diags) => return Ok(data_source_response(None, diags)),
        };
        let schema = data_source
            .schema(self.context(), DataSourceSchemaRequest)
            .await
            .schema;

        let response = data_source
            .read(
                self.context(),
                ReadDataSourceRequest {
                    type_name: req.type_name,
                    config,
                },
            )
            .await;

        if has_errors(&response.diagnostics) {
            return Ok(data_source_response(None, response.diagnostics));
        }

        let mut state = response.state;
        complete_object(&schema.block.attributes, &mut state.value, true);

        Ok(data_source_response(
            Some(encode_dynamic_value(&state)?),
            response.diagnostics,
        ))
    }

    async fn stop_provider(
        &self,
        _request: Request<proto::stop_provider::Request>,
    ) -> std::result::Result<Response<proto::stop_provider::Response>, Status> {
        let response = self
            .provider
            .read()
            .await
            .stop(self.context(), StopProviderRequest)
            .await;
        self.lifetime.cancel();

        Ok(Response::new(proto::stop_provider::Response {
            error: response.error.unwrap_or_default(),
        }))
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}

fn lookup(value: &Dynamic, name: &str) -> Dynamic {
    value
        .as_map()
        .and_then(|m| m.get(name))
        .cloned()
        .unwrap_or(Dynamic::Null)
}

/// Marks computed attributes without configuration as unknown so Terraform
/// expects the provider to supply them during apply
fn mark_computed_unknown(attributes: &[Attribute], config: &Dynamic, planned: &mut Dynamic) {
    let Dynamic::Map(planned) = planned else {
        return;
    };

    for attribute in attributes {
        let config_value = lookup(config, &attribute.name);
        if attribute.computed && config_value.is_null() {
            planned.insert(attribute.name.clone(), Dynamic::Unknown);
            continue;
        }

        if let Some(nested) = &attribute.nested_type {
            if nested.nesting == ObjectNestingMode::Single {
                if let Some(value) = planned.get_mut(&attribute.name) {
                    mark_computed_unknown(&nested.attributes, &config_value, value);
                }
            }
        }
    }
}

/// Ensures every schema attribute is present in an object value and drops
/// unknown keys; optionally replaces leftover unknowns with null
fn complete_object(attributes: &[Attribute], value: &mut Dynamic, strip_unknown: bool) {
    let Dynamic::Map(map) = value else {
        return;
    };

    map.retain(|key, _| attributes.iter().any(|a| &a.name == key));

    for attribute in attributes {
        let entry = map.entry(attribute.name.clone()).or_insert(Dynamic::Null);
        if strip_unknown && entry.is_unknown() {
            *entry = Dynamic::Null;
        }

        let Some(nested) = &attribute.nested_type else {
            continue;
        };
        match (nested.nesting, entry) {
            (ObjectNestingMode::Single, object @ Dynamic::Map(_)) => {
                complete_object(&nested.attributes, object, strip_unknown)
            }
            (ObjectNestingMode::Map, Dynamic::Map(objects)) => {
                for object in objects.values_mut() {
                    complete_object(&nested.attributes, object, strip_unknown);
                }
            }
            (_, Dynamic::List(objects)) => {
                for object in objects.iter_mut() {
                    complete_object(&nested.attributes, object, strip_unknown);
                }
            }
            _ => {}
        }
    }
}

fn run_validators(attributes: &[Attribute], config: &Dynamic, parent: &AttributePath) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for attribute in attributes {
        let value = lookup(config, &attribute.name);
        if !value.is_set() {
            continue;
        }

        let mut path = parent.clone();
        path.steps
            .push(AttributePathStep::AttributeName(attribute.name.clone()));

        for validator in &attribute.validators {
            diagnostics.extend(
                validator
                    .validate(ValidatorRequest {
                        config_value: value.clone(),
                        path: path.clone(),
                    })
                    .diagnostics,
            );
        }

        if let Some(nested) = &attribute.nested_type {
            if nested.nesting == ObjectNestingMode::Single {
                diagnostics.extend(run_validators(&nested.attributes, &value, &path));
            }
        }
    }

    diagnostics
}

pub(crate) fn decode_dynamic_value(value: &Option<proto::DynamicValue>) -> Result<DynamicValue> {
    match value {
        Some(v) if !v.msgpack.is_empty() => DynamicValue::decode_msgpack(&v.msgpack),
        Some(v) if !v.json.is_empty() => DynamicValue::decode_json(&v.json),
        _ => Ok(DynamicValue::null()),
    }
}

pub(crate) fn encode_dynamic_value(value: &DynamicValue) -> Result<proto::DynamicValue> {
    Ok(proto::DynamicValue {
        msgpack: value.encode_msgpack()?,
        json: vec![],
    })
}

fn server_capabilities(
    capabilities: &crate::provider::ServerCapabilities,
) -> proto::ServerCapabilities {
    proto::ServerCapabilities {
        plan_destroy: capabilities.plan_destroy,
        get_provider_schema_optional: capabilities.get_provider_schema_optional,
        move_resource_state: false,
    }
}

fn string_kind(kind: StringKind) -> i32 {
    match kind {
        StringKind::Plain => proto::StringKind::Plain as i32,
        StringKind::Markdown => proto::StringKind::Markdown as i32,
    }
}

pub(crate) fn schema_to_proto(schema: &Schema) -> proto::Schema {
    proto::Schema {
        version: schema.version,
        block: Some(proto::schema::Block {
            version: schema.block.version,
            attributes: schema.block.attributes.iter().map(attribute_to_proto).collect(),
            block_types: vec![],
            description: schema.block.description.clone(),
            description_kind: string_kind(schema.block.description_kind),
            deprecated: schema.block.deprecated,
        }),
    }
}

fn attribute_to_proto(attribute: &Attribute) -> proto::schema::Attribute {
    // Nested attributes carry their type in nested_type only
    let (r#type, nested_type) = match &attribute.nested_type {
        Some(nested) => (
            vec![],
            Some(proto::schema::Object {
                attributes: nested.attributes.iter().map(attribute_to_proto).collect(),
                nesting: match nested.nesting {
                    ObjectNestingMode::Single => proto::schema::object::NestingMode::Single,
                    ObjectNestingMode::List => proto::schema::object::NestingMode::List,
                    ObjectNestingMode::Set => proto::schema::object::NestingMode::Set,
                    ObjectNestingMode::Map => proto::schema::object::NestingMode::Map,
                } as i32,
                min_items: 0,
                max_items: 0,
            }),
        ),
        None => (attribute.r#type.to_bytes(), None),
    };

    proto::schema::Attribute {
        name: attribute.name.clone(),
        r#type,
        nested_type,
        description: attribute.description.clone(),
        required: attribute.required,
        optional: attribute.optional,
        computed: attribute.computed,
        sensitive: attribute.sensitive,
        description_kind: proto::StringKind::Markdown as i32,
        deprecated: attribute.deprecated,
        write_only: false,
    }
}

fn path_to_proto(path: &AttributePath) -> proto::AttributePath {
    use proto::attribute_path::step::Selector;

    proto::AttributePath {
        steps: path
            .steps
            .iter()
            .map(|step| proto::attribute_path::Step {
                selector: Some(match step {
                    AttributePathStep::AttributeName(name) => Selector::AttributeName(name.clone()),
                    AttributePathStep::ElementKeyString(key) => {
                        Selector::ElementKeyString(key.clone())
                    }
                    AttributePathStep::ElementKeyInt(idx) => Selector::ElementKeyInt(*idx),
                }),
            })
            .collect(),
    }
}

pub(crate) fn diagnostics_to_proto(diagnostics: Vec<Diagnostic>) -> Vec<proto::Diagnostic> {
    diagnostics
        .into_iter()
        .map(|diag| proto::Diagnostic {
            severity: match diag.severity {
                DiagnosticSeverity::Error => proto::diagnostic::Severity::Error,
                DiagnosticSeverity::Warning => proto::diagnostic::Severity::Warning,
            } as i32,
            summary: diag.summary,
            detail: diag.detail,
            attribute: diag.attribute.as_ref().map(path_to_proto),
        })
        .collect()
}

fn read_response(
    new_state: Option<proto::DynamicValue>,
    diagnostics: Vec<Diagnostic>,
) -> Response<proto::read_resource::Response> {
    Response::new(proto::read_resource::Response {
        new_state,
        diagnostics: diagnostics_to_proto(diagnostics),
        private: vec![],
        deferred: None,
    })
}

fn plan_response(
    planned_state: Option<proto::DynamicValue>,
    requires_replace: Vec<proto::AttributePath>,
    diagnostics: Vec<Diagnostic>,
) -> Response<proto::plan_resource_change::Response> {
    Response::new(proto::plan_resource_change::Response {
        planned_state,
        requires_replace,
        planned_private: vec![],
        diagnostics: diagnostics_to_proto(diagnostics),
        legacy_type_system: false,
        deferred: None,
    })
}

fn apply_response(
    new_state: Option<proto::DynamicValue>,
    diagnostics: Vec<Diagnostic>,
) -> Response<proto::apply_resource_change::Response> {
    Response::new(proto::apply_resource_change::Response {
        new_state,
        private: vec![],
        diagnostics: diagnostics_to_proto(diagnostics),
        legacy_type_system: false,
    })
}

fn import_response(
    imported_resources: Vec<proto::import_resource_state::ImportedResource>,
    diagnostics: Vec<Diagnostic>,
) -> Response<proto::import_resource_state::Response> {
    Response::new(proto::import_resource_state::Response {
        imported_resources,
        diagnostics: diagnostics_to_proto(diagnostics),
        deferred: None,
    })
}

fn data_source_response(
    state: Option<proto::DynamicValue>,
    diagnostics: Vec<Diagnostic>,
) -> Response<proto::read_data_source::Response> {
    Response::new(proto::read_data_source::Response {
        state,
        diagnostics: diagnostics_to_proto(diagnostics),
        deferred: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan_modifier::UseStateForUnknown;
    use crate::schema::{AttributeBuilder, AttributeType, NestedType};

    fn attributes() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("id", AttributeType::Number)
                .computed()
                .plan_modifier(Box::new(UseStateForUnknown))
                .build(),
            AttributeBuilder::new("name", AttributeType::String)
                .required()
                .build(),
            AttributeBuilder::new("port", AttributeType::Number)
                .optional()
                .computed()
                .build(),
            AttributeBuilder::nested(
                "authentication",
                NestedType::single(vec![
                    AttributeBuilder::new("method", AttributeType::String)
                        .optional()
                        .build(),
                    AttributeBuilder::new("password", AttributeType::String)
                        .optional()
                        .computed()
                        .build(),
                ]),
            )
            .optional()
            .build(),
        ]
    }

    fn object(pairs: &[(&str, Dynamic)]) -> Dynamic {
        Dynamic::Map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn computed_attributes_without_config_become_unknown() {
        let config = object(&[
            ("name", Dynamic::String("sab".into())),
            (
                "authentication",
                object(&[("method", Dynamic::String("forms".into()))]),
            ),
        ]);
        let mut planned = config.clone();
        complete_object(&attributes(), &mut planned, false);
        mark_computed_unknown(&attributes(), &config, &mut planned);

        let planned = planned.as_map().unwrap();
        assert!(planned["id"].is_unknown());
        assert!(planned["port"].is_unknown());
        assert_eq!(planned["name"], Dynamic::String("sab".into()));
        let auth = planned["authentication"].as_map().unwrap();
        assert!(auth["password"].is_unknown());
        assert_eq!(auth["method"], Dynamic::String("forms".into()));
    }

    #[test]
    fn complete_object_fills_nulls_and_drops_foreign_keys() {
        let mut value = object(&[
            ("id", Dynamic::Unknown),
            ("legacy", Dynamic::Bool(true)),
        ]);
        complete_object(&attributes(), &mut value, true);

        let map = value.as_map().unwrap();
        assert!(!map.contains_key("legacy"));
        assert!(map["id"].is_null());
        assert!(map["authentication"].is_null());
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn validators_only_see_known_values() {
        let attrs = vec![AttributeBuilder::new("priority", AttributeType::Number)
            .optional()
            .validator(Box::new(crate::validator::OneOfInt::new(&[1, 2])))
            .build()];

        let bad = object(&[("priority", Dynamic::Number(3.0))]);
        assert_eq!(run_validators(&attrs, &bad, &AttributePath::root()).len(), 1);

        let unknown = object(&[("priority", Dynamic::Unknown)]);
        assert!(run_validators(&attrs, &unknown, &AttributePath::root()).is_empty());
    }

    #[test]
    fn nested_attributes_are_sent_as_objects() {
        let attr = attribute_to_proto(&attributes()[3]);
        assert!(attr.r#type.is_empty());
        let nested = attr.nested_type.unwrap();
        assert_eq!(
            nested.nesting,
            proto::schema::object::NestingMode::Single as i32
        );
        assert_eq!(nested.attributes.len(), 2);
    }

    #[test]
    fn diagnostics_keep_attribute_paths() {
        let diags = diagnostics_to_proto(vec![Diagnostic::warning("w", "d")
            .with_attribute(AttributePath::new("fields").index(0))]);
        assert_eq!(diags[0].severity, proto::diagnostic::Severity::Warning as i32);
        assert_eq!(diags[0].attribute.as_ref().unwrap().steps.len(), 2);
    }
}
