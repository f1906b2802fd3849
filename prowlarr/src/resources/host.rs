//! Host resource implementation
//!
//! `/config/host` is a singleton: create and update overlay the planned
//! values on the current configuration and PUT it back, delete only drops
//! the resource from state.

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource,
    ReadResourceRequest, ReadResourceResponse, Resource, ResourceSchemaRequest,
    ResourceSchemaResponse, ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, NestedType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::OneOfString;

use crate::api::host::HostConfig;
use crate::api::Client;
use crate::helpers::errors::state_error;
use crate::helpers::schema::id_attribute;
use crate::helpers::{client_error, client_from, not_configured, Action, Component, MASKED_VALUE};

const RESOURCE_NAME: &str = "host";

/// Prowlarr keeps a single host configuration with this id
pub(crate) const HOST_ID: i64 = 1;

const AUTHENTICATION_METHODS: &[&str] = &["none", "basic", "forms", "external"];
const AUTHENTICATION_REQUIRED: &[&str] = &["enabled", "disabledForLocalAddresses"];
const CERTIFICATE_VALIDATIONS: &[&str] = &["enabled", "disabledForLocalAddresses", "disabled"];
const PROXY_TYPES: &[&str] = &["http", "socks4", "socks5"];
const UPDATE_MECHANISMS: &[&str] = &["builtIn", "script", "external", "apt", "docker"];
const LOG_LEVELS: &[&str] = &["info", "debug", "trace"];

#[derive(Default)]
pub struct HostResource {
    client: Option<Client>,
}

impl HostResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self) -> Result<&Client, Diagnostic> {
        self.client.as_ref().ok_or_else(not_configured)
    }

    /// Fetches the live configuration, applies the plan and saves it
    async fn apply(&self, planned: &DynamicValue, action: Action) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let mut config = client
            .host()
            .get()
            .await
            .map_err(|e| client_error(action, RESOURCE_NAME, &e))?;
        write_config(planned, &mut config);

        let saved = client
            .host()
            .update(&config)
            .await
            .map_err(|e| client_error(action, RESOURCE_NAME, &e))?;
        to_state(&saved, Some(planned)).map_err(|e| state_error(RESOURCE_NAME, e))
    }
}

fn attr(name: &str, r#type: AttributeType, description: &str) -> AttributeBuilder {
    AttributeBuilder::new(name, r#type).description(description)
}

fn one_of(name: &str, values: &'static [&'static str], description: &str) -> AttributeBuilder {
    attr(name, AttributeType::String, description).validator(Box::new(OneOfString::new(values)))
}

fn block(name: &str, description: &str, attributes: Vec<Attribute>) -> Attribute {
    AttributeBuilder::nested(name, NestedType::single(attributes))
        .description(description)
        .required()
        .build()
}

pub(crate) fn host_attributes() -> Vec<Attribute> {
    use AttributeType::{Bool, Number, String};

    vec![
        attr("bind_address", String, "Bind address.").required().build(),
        attr("port", Number, "Port.").required().build(),
        attr("url_base", String, "URL base.").optional().computed().build(),
        attr("instance_name", String, "Instance name.").required().build(),
        attr("application_url", String, "Application URL.")
            .optional()
            .computed()
            .build(),
        attr("launch_browser", Bool, "Launch browser flag.")
            .optional()
            .computed()
            .build(),
        block(
            "authentication",
            "Authentication configuration.",
            vec![
                one_of("method", AUTHENTICATION_METHODS, "Authentication method.")
                    .required()
                    .build(),
                one_of("required", AUTHENTICATION_REQUIRED, "Authentication required.")
                    .optional()
                    .computed()
                    .build(),
                attr("username", String, "Username.").optional().computed().build(),
                attr("password", String, "Password.")
                    .optional()
                    .computed()
                    .sensitive()
                    .build(),
            ],
        ),
        block(
            "proxy",
            "Proxy configuration.",
            vec![
                attr("enabled", Bool, "Proxy enabled flag.").required().build(),
                one_of("type", PROXY_TYPES, "Proxy type.").optional().computed().build(),
                attr("hostname", String, "Proxy hostname.").optional().computed().build(),
                attr("port", Number, "Proxy port.").optional().computed().build(),
                attr("username", String, "Proxy username.").optional().computed().build(),
                attr("password", String, "Proxy password.")
                    .optional()
                    .computed()
                    .sensitive()
                    .build(),
                attr("bypass_filter", String, "Proxy bypass filter.")
                    .optional()
                    .computed()
                    .build(),
                attr("bypass_local_addresses", Bool, "Bypass proxy for local addresses.")
                    .optional()
                    .computed()
                    .build(),
            ],
        ),
        block(
            "ssl",
            "SSL configuration.",
            vec![
                attr("enabled", Bool, "SSL enabled flag.").required().build(),
                one_of(
                    "certificate_validation",
                    CERTIFICATE_VALIDATIONS,
                    "Certificate validation.",
                )
                .required()
                .build(),
                attr("port", Number, "SSL port.").optional().computed().build(),
                attr("cert_path", String, "Certificate path.").optional().computed().build(),
                attr("cert_password", String, "Certificate password.")
                    .optional()
                    .computed()
                    .sensitive()
                    .build(),
            ],
        ),
        block(
            "update",
            "Update configuration.",
            vec![
                one_of("mechanism", UPDATE_MECHANISMS, "Update mechanism.")
                    .required()
                    .build(),
                attr("branch", String, "Branch reference.").required().build(),
                attr("script_path", String, "Update script path.")
                    .optional()
                    .computed()
                    .build(),
                attr("update_automatically", Bool, "Update automatically flag.")
                    .optional()
                    .computed()
                    .build(),
            ],
        ),
        block(
            "backup",
            "Backup configuration.",
            vec![
                attr("folder", String, "Backup folder.").required().build(),
                attr("interval", Number, "Backup interval in days.").required().build(),
                attr("retention", Number, "Backup retention in days.").required().build(),
            ],
        ),
        block(
            "logging",
            "Logging configuration.",
            vec![
                one_of("log_level", LOG_LEVELS, "Log level.").required().build(),
                attr("analytics_enabled", Bool, "Analytics enabled flag.")
                    .optional()
                    .computed()
                    .build(),
                attr("log_size_limit", Number, "Log size limit in MB.")
                    .optional()
                    .computed()
                    .build(),
            ],
        ),
    ]
}

pub(crate) fn host_schema() -> Schema {
    SchemaBuilder::new()
        .version(0)
        .description("Host configuration resource. There is one per Prowlarr instance.")
        .attribute(id_attribute("Host ID."))
        .attributes(host_attributes())
        .build()
}

fn path(block: &str, name: &str) -> AttributePath {
    AttributePath::new(block).attribute(name)
}

fn top(name: &str) -> AttributePath {
    AttributePath::new(name)
}

fn known(state: &DynamicValue, path: &AttributePath) -> Option<Dynamic> {
    state.get(path).filter(|v| v.is_set()).cloned()
}

fn overlay_string(state: &DynamicValue, path: AttributePath, target: &mut String) {
    if let Some(value) = known(state, &path).as_ref().and_then(Dynamic::as_str) {
        *target = value.to_string();
    }
}

fn overlay_i64(state: &DynamicValue, path: AttributePath, target: &mut i64) {
    if let Some(value) = known(state, &path).as_ref().and_then(Dynamic::as_i64) {
        *target = value;
    }
}

fn overlay_bool(state: &DynamicValue, path: AttributePath, target: &mut bool) {
    if let Some(value) = known(state, &path).as_ref().and_then(Dynamic::as_bool) {
        *target = value;
    }
}

/// Applies every known planned value, leaving the rest of the live
/// configuration untouched
fn write_config(state: &DynamicValue, config: &mut HostConfig) {
    overlay_string(state, top("bind_address"), &mut config.bind_address);
    overlay_i64(state, top("port"), &mut config.port);
    overlay_string(state, top("url_base"), &mut config.url_base);
    overlay_string(state, top("instance_name"), &mut config.instance_name);
    overlay_string(state, top("application_url"), &mut config.application_url);
    overlay_bool(state, top("launch_browser"), &mut config.launch_browser);

    overlay_string(state, path("authentication", "method"), &mut config.authentication_method);
    overlay_string(
        state,
        path("authentication", "required"),
        &mut config.authentication_required,
    );
    overlay_string(state, path("authentication", "username"), &mut config.username);
    overlay_string(state, path("authentication", "password"), &mut config.password);
    config.password_confirmation = config.password.clone();

    overlay_bool(state, path("proxy", "enabled"), &mut config.proxy_enabled);
    overlay_string(state, path("proxy", "type"), &mut config.proxy_type);
    overlay_string(state, path("proxy", "hostname"), &mut config.proxy_hostname);
    overlay_i64(state, path("proxy", "port"), &mut config.proxy_port);
    overlay_string(state, path("proxy", "username"), &mut config.proxy_username);
    overlay_string(state, path("proxy", "password"), &mut config.proxy_password);
    overlay_string(state, path("proxy", "bypass_filter"), &mut config.proxy_bypass_filter);
    overlay_bool(
        state,
        path("proxy", "bypass_local_addresses"),
        &mut config.proxy_bypass_local_addresses,
    );

    overlay_bool(state, path("ssl", "enabled"), &mut config.enable_ssl);
    overlay_i64(state, path("ssl", "port"), &mut config.ssl_port);
    overlay_string(
        state,
        path("ssl", "certificate_validation"),
        &mut config.certificate_validation,
    );
    overlay_string(state, path("ssl", "cert_path"), &mut config.ssl_cert_path);
    overlay_string(state, path("ssl", "cert_password"), &mut config.ssl_cert_password);

    overlay_string(state, path("update", "mechanism"), &mut config.update_mechanism);
    overlay_string(state, path("update", "branch"), &mut config.branch);
    overlay_string(state, path("update", "script_path"), &mut config.update_script_path);
    overlay_bool(
        state,
        path("update", "update_automatically"),
        &mut config.update_automatically,
    );

    overlay_string(state, path("backup", "folder"), &mut config.backup_folder);
    overlay_i64(state, path("backup", "interval"), &mut config.backup_interval);
    overlay_i64(state, path("backup", "retention"), &mut config.backup_retention);

    overlay_string(state, path("logging", "log_level"), &mut config.log_level);
    overlay_bool(
        state,
        path("logging", "analytics_enabled"),
        &mut config.analytics_enabled,
    );
    overlay_i64(state, path("logging", "log_size_limit"), &mut config.log_size_limit);
}

/// Secrets come back masked; keep the planned or stored value instead
fn secret(value: &str, prior: Option<&DynamicValue>, path: &AttributePath) -> Dynamic {
    if value != MASKED_VALUE {
        return Dynamic::String(value.to_string());
    }
    prior
        .and_then(|prior| known(prior, path))
        .unwrap_or(Dynamic::Null)
}

pub(crate) fn to_state(config: &HostConfig, prior: Option<&DynamicValue>) -> tfplug::Result<DynamicValue> {
    let mut state = DynamicValue::object();
    state.set_i64(&top("id"), HOST_ID)?;
    state.set_string(&top("bind_address"), config.bind_address.clone())?;
    state.set_i64(&top("port"), config.port)?;
    state.set_string(&top("url_base"), config.url_base.clone())?;
    state.set_string(&top("instance_name"), config.instance_name.clone())?;
    state.set_string(&top("application_url"), config.application_url.clone())?;
    state.set_bool(&top("launch_browser"), config.launch_browser)?;

    state.set_string(&path("authentication", "method"), config.authentication_method.clone())?;
    state.set_string(
        &path("authentication", "required"),
        config.authentication_required.clone(),
    )?;
    state.set_string(&path("authentication", "username"), config.username.clone())?;
    let password = path("authentication", "password");
    state.set_value(&password, secret(&config.password, prior, &password))?;

    state.set_bool(&path("proxy", "enabled"), config.proxy_enabled)?;
    state.set_string(&path("proxy", "type"), config.proxy_type.clone())?;
    state.set_string(&path("proxy", "hostname"), config.proxy_hostname.clone())?;
    state.set_i64(&path("proxy", "port"), config.proxy_port)?;
    state.set_string(&path("proxy", "username"), config.proxy_username.clone())?;
    let proxy_password = path("proxy", "password");
    state.set_value(
        &proxy_password,
        secret(&config.proxy_password, prior, &proxy_password),
    )?;
    state.set_string(&path("proxy", "bypass_filter"), config.proxy_bypass_filter.clone())?;
    state.set_bool(
        &path("proxy", "bypass_local_addresses"),
        config.proxy_bypass_local_addresses,
    )?;

    state.set_bool(&path("ssl", "enabled"), config.enable_ssl)?;
    state.set_i64(&path("ssl", "port"), config.ssl_port)?;
    state.set_string(
        &path("ssl", "certificate_validation"),
        config.certificate_validation.clone(),
    )?;
    state.set_string(&path("ssl", "cert_path"), config.ssl_cert_path.clone())?;
    let cert_password = path("ssl", "cert_password");
    state.set_value(
        &cert_password,
        secret(&config.ssl_cert_password, prior, &cert_password),
    )?;

    state.set_string(&path("update", "mechanism"), config.update_mechanism.clone())?;
    state.set_string(&path("update", "branch"), config.branch.clone())?;
    state.set_string(&path("update", "script_path"), config.update_script_path.clone())?;
    state.set_bool(
        &path("update", "update_automatically"),
        config.update_automatically,
    )?;

    state.set_string(&path("backup", "folder"), config.backup_folder.clone())?;
    state.set_i64(&path("backup", "interval"), config.backup_interval)?;
    state.set_i64(&path("backup", "retention"), config.backup_retention)?;

    state.set_string(&path("logging", "log_level"), config.log_level.clone())?;
    state.set_bool(&path("logging", "analytics_enabled"), config.analytics_enabled)?;
    state.set_i64(&path("logging", "log_size_limit"), config.log_size_limit)?;
    Ok(state)
}

#[async_trait]
impl Resource for HostResource {
    fn type_name(&self) -> &str {
        "prowlarr_host"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: host_schema(),
            diagnostics: vec![],
        }
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        match self.apply(&request.planned_state, Action::Create).await {
            Ok(new_state) => {
                tracing::trace!("created {}: {}", RESOURCE_NAME, HOST_ID);
                CreateResourceResponse {
                    new_state,
                    diagnostics: vec![],
                }
            }
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

        match client.host().get().await {
            Ok(config) => {
                tracing::trace!("read {}: {}", RESOURCE_NAME, HOST_ID);
                match to_state(&config, Some(&request.current_state)) {
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
        match self.apply(&request.planned_state, Action::Update).await {
            Ok(new_state) => {
                tracing::trace!("updated {}: {}", RESOURCE_NAME, HOST_ID);
                UpdateResourceResponse {
                    new_state,
                    diagnostics: vec![],
                }
            }
            Err(diag) => UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![diag],
            },
        }
    }

    async fn delete(&self, _ctx: Context, _request: DeleteResourceRequest) -> DeleteResourceResponse {
        // The configuration cannot be removed from Prowlarr
        tracing::trace!("deleted {}: {}", RESOURCE_NAME, HOST_ID);
        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }

    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse::default();
        let mut state = DynamicValue::object();
        match state.set_i64(&top("id"), HOST_ID) {
            Ok(()) => {
                tracing::trace!("imported {}: {}", RESOURCE_NAME, HOST_ID);
                response.imported_resources.push(ImportedResource {
                    type_name: request.type_name,
                    state,
                });
            }
            Err(e) => response.diagnostics.push(state_error(RESOURCE_NAME, e)),
        }
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for HostResource {
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
