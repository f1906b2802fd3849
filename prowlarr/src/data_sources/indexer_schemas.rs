//! Names of every indexer definition Prowlarr ships

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource,
    DataSourceSchemaRequest, DataSourceSchemaResponse, DataSourceWithConfigure,
    ReadDataSourceRequest, ReadDataSourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{Diagnostic, Dynamic, DynamicValue};

use super::lookup::list_state;
use crate::api::Client;
use crate::helpers::errors::state_error;
use crate::helpers::{client_error, client_from, not_configured, Action, Component};

const DATA_SOURCE_NAME: &str = "indexer_schemas";

#[derive(Default)]
pub struct IndexerSchemasDataSource {
    client: Option<Client>,
}

impl IndexerSchemasDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn names(&self) -> Result<DynamicValue, Diagnostic> {
        let client = self.client.as_ref().ok_or_else(not_configured)?;
        let schemas = client
            .indexers()
            .schemas()
            .await
            .map_err(|e| client_error(Action::Read, DATA_SOURCE_NAME, &e))?;

        tracing::trace!("read {}", DATA_SOURCE_NAME);
        let names = schemas
            .into_iter()
            .map(|schema| Dynamic::String(schema.name))
            .collect();
        list_state(DATA_SOURCE_NAME, names).map_err(|e| state_error(DATA_SOURCE_NAME, e))
    }
}

fn schema() -> Schema {
    SchemaBuilder::new()
        .version(0)
        .description("List all available indexer schemas.")
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .computed()
                .build(),
        )
        .attribute(
            AttributeBuilder::new(
                DATA_SOURCE_NAME,
                AttributeType::Set(Box::new(AttributeType::String)),
            )
            .description("Indexer name list.")
            .computed()
            .build(),
        )
        .build()
}

#[async_trait]
impl DataSource for IndexerSchemasDataSource {
    fn type_name(&self) -> &str {
        "prowlarr_indexer_schemas"
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
        match self.names().await {
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
impl DataSourceWithConfigure for IndexerSchemasDataSource {
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
