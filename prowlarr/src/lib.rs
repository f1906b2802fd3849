//! Terraform provider for Prowlarr
//!
//! Exposes the Prowlarr `/api/v1` REST API as resources and data sources
//! served over the Terraform plugin protocol by `tfplug`.

pub mod api;
pub mod data_sources;
pub mod helpers;
pub mod provider_data;
pub mod resources;

use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory, ServerCapabilities,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::StringMatches;

use api::{Client, Credentials};
use provider_data::ProwlarrProviderData;

pub const URL_ENV: &str = "PROWLARR_URL";
pub const API_KEY_ENV: &str = "PROWLARR_API_KEY";
pub const AUTHORIZATION_ENV: &str = "PROWLARR_AUTHORIZATION";

#[derive(Default)]
pub struct ProwlarrProvider;

impl ProwlarrProvider {
    pub fn new() -> Self {
        Self
    }
}

fn provider_schema() -> Schema {
    let mut url = AttributeBuilder::new("url", AttributeType::String)
        .description(&format!(
            "Full Prowlarr URL with protocol and port (e.g. `https://test.prowlarr.com:9696`). \
             A base path is kept (e.g. `https://media.example.com/prowlarr`); do **NOT** add `/api`, \
             the provider appends the API paths itself. \
             Can be specified via the `{}` environment variable.",
            URL_ENV
        ))
        .optional();
    if let Ok(pattern) = Regex::new(r"^https?://[^\s/]+(/\S*)?$") {
        url = url.validator(Box::new(StringMatches::new(
            pattern,
            "must be a valid URL with a HTTP or HTTPS scheme",
        )));
    }

    SchemaBuilder::new()
        .version(0)
        .description("The Prowlarr provider is used to interact with the resources supported by Prowlarr.")
        .attribute(url.build())
        .attribute(
            AttributeBuilder::new("api_key", AttributeType::String)
                .description(&format!(
                    "API key for Prowlarr authentication. Can be specified via the `{}` environment variable.",
                    API_KEY_ENV
                ))
                .optional()
                .sensitive()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("authorization", AttributeType::String)
                .description(&format!(
                    "Authorization header value, e.g. `Basic <token>`. Used instead of `api_key`. \
                     Can be specified via the `{}` environment variable.",
                    AUTHORIZATION_ENV
                ))
                .optional()
                .sensitive()
                .build(),
        )
        .build()
}

/// Outcome of resolving one provider attribute
enum Setting {
    Value(String),
    /// Unknown until apply; configuration must stop without an error
    Unknown(Diagnostic),
}

/// Reads an attribute, falling back to `env` when it is null
fn setting(config: &DynamicValue, name: &str, env: &str) -> Setting {
    match config.get(&AttributePath::new(name)) {
        Some(Dynamic::Unknown) => Setting::Unknown(
            Diagnostic::warning(
                "Unable to create client",
                format!("Cannot use unknown value as {}", name),
            )
            .with_attribute(AttributePath::new(name)),
        ),
        Some(Dynamic::String(value)) => Setting::Value(value.clone()),
        _ => Setting::Value(std::env::var(env).unwrap_or_default()),
    }
}

/// Resolves the endpoint and credentials; `Ok(None)` when a value is unknown
fn resolve(
    config: &DynamicValue,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Option<(String, Credentials)>, Diagnostic> {
    let url = match setting(config, "url", URL_ENV) {
        Setting::Unknown(diag) => {
            diagnostics.push(diag);
            return Ok(None);
        }
        Setting::Value(url) => url,
    };
    if url.is_empty() {
        return Err(Diagnostic::error(
            "Unable to find URL",
            "URL cannot be an empty string",
        )
        .with_attribute(AttributePath::new("url")));
    }

    let api_key = match setting(config, "api_key", API_KEY_ENV) {
        Setting::Unknown(diag) => {
            diagnostics.push(diag);
            return Ok(None);
        }
        Setting::Value(key) => key,
    };
    let authorization = match setting(config, "authorization", AUTHORIZATION_ENV) {
        Setting::Unknown(diag) => {
            diagnostics.push(diag);
            return Ok(None);
        }
        Setting::Value(value) => value,
    };

    let credentials = match (api_key.is_empty(), authorization.is_empty()) {
        (false, true) => Credentials::ApiKey(api_key),
        (true, false) => Credentials::Authorization(authorization),
        (true, true) => {
            return Err(Diagnostic::error(
                "Missing Authentication Credentials",
                format!(
                    "One of api_key or authorization must be set, in the provider block or via the {} or {} environment variables.",
                    API_KEY_ENV, AUTHORIZATION_ENV
                ),
            ))
        }
        (false, false) => {
            return Err(Diagnostic::error(
                "Conflicting Authentication Credentials",
                "Only one of api_key or authorization can be set.",
            ))
        }
    };

    Ok(Some((url, credentials)))
}

#[async_trait]
impl Provider for ProwlarrProvider {
    fn type_name(&self) -> &str {
        "prowlarr"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: "prowlarr".to_string(),
            server_capabilities: ServerCapabilities::default(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: provider_schema(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let mut diagnostics = vec![];

        let (url, credentials) = match resolve(&request.config, &mut diagnostics) {
            Ok(Some(resolved)) => resolved,
            Ok(None) => {
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
            Err(diag) => {
                diagnostics.push(diag);
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                };
            }
        };

        match Client::new(&url, credentials) {
            Ok(client) => {
                tracing::info!(url = %client.base_url(), "configured prowlarr client");
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: Some(Arc::new(ProwlarrProviderData::new(client))),
                }
            }
            Err(e) => {
                diagnostics.push(
                    Diagnostic::error("Unable to create client", e.to_string())
                        .with_attribute(AttributePath::new("url")),
                );
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        resources::resources()
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        data_sources::data_sources()
    }
}
