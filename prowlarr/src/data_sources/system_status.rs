//! System status data source

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource,
    DataSourceSchemaRequest, DataSourceSchemaResponse, DataSourceWithConfigure,
    ReadDataSourceRequest, ReadDataSourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use crate::api::system::SystemStatus;
use crate::api::Client;
use crate::helpers::errors::state_error;
use crate::helpers::{client_error, client_from, not_configured, Action, Component};

const DATA_SOURCE_NAME: &str = "system_status";

const STRINGS: &[&str] = &[
    "app_name",
    "instance_name",
    "version",
    "build_time",
    "start_time",
    "startup_path",
    "app_data",
    "os_name",
    "os_version",
    "mode",
    "branch",
    "authentication",
    "sqlite_version",
    "database_type",
    "database_version",
    "url_base",
    "runtime_version",
    "runtime_name",
    "package_version",
    "package_author",
    "package_update_mechanism",
];

const FLAGS: &[&str] = &[
    "is_debug",
    "is_production",
    "is_admin",
    "is_user_interactive",
    "is_net_core",
    "is_mono",
    "is_linux",
    "is_osx",
    "is_windows",
    "is_docker",
];

#[derive(Default)]
pub struct SystemStatusDataSource {
    client: Option<Client>,
}

impl SystemStatusDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn fetch(&self) -> Result<DynamicValue, Diagnostic> {
        let client = self.client.as_ref().ok_or_else(not_configured)?;
        let status = client
            .system()
            .status()
            .await
            .map_err(|e| client_error(Action::Read, DATA_SOURCE_NAME, &e))?;
        tracing::trace!("read {}", DATA_SOURCE_NAME);
        to_state(&status).map_err(|e| state_error(DATA_SOURCE_NAME, e))
    }
}

/// "os_version" -> "OS version."
fn describe(name: &str) -> String {
    let text = name
        .trim_start_matches("is_")
        .replace('_', " ")
        .replace("os ", "OS ")
        .replace("url ", "URL ");
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

fn schema() -> Schema {
    let computed = |name: &str, r#type: AttributeType| {
        AttributeBuilder::new(name, r#type)
            .description(&describe(name))
            .computed()
            .build()
    };

    SchemaBuilder::new()
        .version(0)
        .description("System status of the Prowlarr instance.")
        .attribute(computed("id", AttributeType::Number))
        .attribute(computed("migration_version", AttributeType::Number))
        .attributes(STRINGS.iter().map(|name| computed(*name, AttributeType::String)))
        .attributes(FLAGS.iter().map(|name| computed(*name, AttributeType::Bool)))
        .build()
}

fn to_state(status: &SystemStatus) -> tfplug::Result<DynamicValue> {
    let strings = [
        &status.app_name,
        &status.instance_name,
        &status.version,
        &status.build_time,
        &status.start_time,
        &status.startup_path,
        &status.app_data,
        &status.os_name,
        &status.os_version,
        &status.mode,
        &status.branch,
        &status.authentication,
        &status.sqlite_version,
        &status.database_type,
        &status.database_version,
        &status.url_base,
        &status.runtime_version,
        &status.runtime_name,
        &status.package_version,
        &status.package_author,
        &status.package_update_mechanism,
    ];
    let flags = [
        status.is_debug,
        status.is_production,
        status.is_admin,
        status.is_user_interactive,
        status.is_net_core,
        status.is_mono,
        status.is_linux,
        status.is_osx,
        status.is_windows,
        status.is_docker,
    ];

    let mut state = DynamicValue::object();
    // Status is a singleton, the id only satisfies Terraform
    state.set_i64(&AttributePath::new("id"), 1)?;
    state.set_i64(
        &AttributePath::new("migration_version"),
        status.migration_version,
    )?;
    for (name, value) in STRINGS.iter().zip(strings) {
        state.set_string(&AttributePath::new(name), value.clone())?;
    }
    for (name, value) in FLAGS.iter().zip(flags) {
        state.set_bool(&AttributePath::new(name), value)?;
    }
    Ok(state)
}

#[async_trait]
impl DataSource for SystemStatusDataSource {
    fn type_name(&self) -> &str {
        "prowlarr_system_status"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: schema(),
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        match self.fetch().await {
            Ok(state) => ReadDataSourceResponse {
                state,
                diagnostics: vec![],
            },
            Err(diag) => ReadDataSourceResponse {
                state: request.config,
                diagnostics: vec![diag],
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for SystemStatusDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];
        match client_from(request.provider_data, Component::DataSource) {
            Ok(client) => self.client = client,
            Err(diag) => diagnostics.push(diag),
        }
        ConfigureDataSourceResponse { diagnostics }
    }
}
