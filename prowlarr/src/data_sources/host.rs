//! Host configuration data source

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource,
    DataSourceSchemaRequest, DataSourceSchemaResponse, DataSourceWithConfigure,
    ReadDataSourceRequest, ReadDataSourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{Diagnostic, DynamicValue};

use crate::api::Client;
use crate::helpers::errors::state_error;
use crate::helpers::schema::computed_only;
use crate::helpers::{client_error, client_from, not_configured, Action, Component};
use crate::resources::host::{host_attributes, to_state};

const DATA_SOURCE_NAME: &str = "host";

#[derive(Default)]
pub struct HostDataSource {
    client: Option<Client>,
}

impl HostDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn fetch(&self) -> Result<DynamicValue, Diagnostic> {
        let client = self.client.as_ref().ok_or_else(not_configured)?;
        let config = client
            .host()
            .get()
            .await
            .map_err(|e| client_error(Action::Read, DATA_SOURCE_NAME, &e))?;
        tracing::trace!("read {}", DATA_SOURCE_NAME);
        to_state(&config, None).map_err(|e| state_error(DATA_SOURCE_NAME, e))
    }
}

fn schema() -> Schema {
    SchemaBuilder::new()
        .version(0)
        .description("Host configuration.")
        .attribute(
            AttributeBuilder::new("id", AttributeType::Number)
                .description("Host ID.")
                .computed()
                .build(),
        )
        .attributes(host_attributes().into_iter().map(computed_only))
        .build()
}

#[async_trait]
impl DataSource for HostDataSource {
    fn type_name(&self) -> &str {
        "prowlarr_host"
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
impl DataSourceWithConfigure for HostDataSource {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_attribute_is_computed() {
        let schema = schema();
        let authentication = schema.attribute("authentication").unwrap();

        assert!(schema.block.attributes.iter().all(|a| a.computed && !a.required));
        assert!(authentication
            .nested_type
            .as_ref()
            .unwrap()
            .attributes
            .iter()
            .all(|a| a.computed && a.validators.is_empty()));
    }

    #[tokio::test]
    async fn unconfigured_read_fails() {
        let response = HostDataSource::new()
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "prowlarr_host".to_string(),
                    config: DynamicValue::object(),
                },
            )
            .await;
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }
}
