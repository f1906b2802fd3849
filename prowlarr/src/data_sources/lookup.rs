//! Single item and list data sources over a listable collection
//!
//! Every collection backing a data source is looked up the same way: list
//! it, then either pick the item whose key attribute matches the config or
//! return all of them as a computed set.

use async_trait::async_trait;
use std::collections::HashMap;
use std::marker::PhantomData;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource,
    DataSourceSchemaRequest, DataSourceSchemaResponse, DataSourceWithConfigure,
    ReadDataSourceRequest, ReadDataSourceResponse,
};
use tfplug::provider::DataSourceFactory;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use crate::api::{ApiError, Client};
use crate::helpers::errors::state_error;
use crate::helpers::schema::{computed_only, computed_set, string_value};
use crate::helpers::{
    client_error, client_from, data_source_error, not_configured, Action, Component,
};

/// A collection that data sources can list and search
#[async_trait]
pub trait Lookup: Send + Sync + 'static {
    type Item: Send + Sync;

    /// Single item data source name, e.g. `tag`
    const NAME: &'static str;
    /// List data source name, e.g. `tags`
    const PLURAL: &'static str;
    /// Attribute matched against the config, e.g. `label`
    const KEY: &'static str;
    const TITLE: &'static str;

    /// Attributes of one item, as the matching resource declares them
    fn attributes() -> Vec<Attribute>;

    async fn list(client: &Client) -> Result<Vec<Self::Item>, ApiError>;

    fn key(item: &Self::Item) -> &str;

    fn to_state(item: &Self::Item) -> tfplug::Result<DynamicValue>;
}

pub fn item_schema<L: Lookup>() -> Schema {
    let attributes = L::attributes().into_iter().map(|attribute| {
        if attribute.name == L::KEY {
            AttributeBuilder::new(L::KEY, attribute.r#type)
                .description(&attribute.description)
                .required()
                .build()
        } else {
            computed_only(attribute)
        }
    });

    SchemaBuilder::new()
        .version(0)
        .description(&format!("Single {}.", L::TITLE))
        .attributes(attributes)
        .build()
}

pub fn list_schema<L: Lookup>() -> Schema {
    let items = L::attributes().into_iter().map(computed_only).collect();

    SchemaBuilder::new()
        .version(0)
        .description(&format!("List all available {}.", L::TITLE))
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .computed()
                .build(),
        )
        .attribute(computed_set(
            L::PLURAL,
            &format!("{} list.", L::TITLE),
            items,
        ))
        .build()
}

/// State of a list data source: the item set plus an id counting the items
pub fn list_state(plural: &str, items: Vec<Dynamic>) -> tfplug::Result<DynamicValue> {
    let mut state = DynamicValue::object();
    state.set_string(&AttributePath::new("id"), items.len().to_string())?;
    state.set_list(&AttributePath::new(plural), items)?;
    Ok(state)
}

fn configure_client(
    slot: &mut Option<Client>,
    request: ConfigureDataSourceRequest,
) -> ConfigureDataSourceResponse {
    let mut diagnostics = vec![];
    match client_from(request.provider_data, Component::DataSource) {
        Ok(client) => *slot = client,
        Err(diag) => diagnostics.push(diag),
    }
    ConfigureDataSourceResponse { diagnostics }
}

/// Looks up one item by its key attribute
pub struct ItemDataSource<L: Lookup> {
    type_name: String,
    client: Option<Client>,
    _lookup: PhantomData<fn() -> L>,
}

impl<L: Lookup> ItemDataSource<L> {
    pub fn new() -> Self {
        Self {
            type_name: format!("prowlarr_{}", L::NAME),
            client: None,
            _lookup: PhantomData,
        }
    }

    async fn find(&self, config: &DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let client = self.client.as_ref().ok_or_else(not_configured)?;
        let search = string_value(config, L::KEY).unwrap_or_default();

        let items = L::list(client)
            .await
            .map_err(|e| client_error(Action::Read, L::NAME, &e))?;
        let item = items
            .iter()
            .find(|item| L::key(item) == search)
            .ok_or_else(|| data_source_error(L::NAME, L::KEY, &search))?;

        tracing::trace!("read {}", L::NAME);
        L::to_state(item).map_err(|e| state_error(L::NAME, e))
    }
}

impl<L: Lookup> Default for ItemDataSource<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<L: Lookup> DataSource for ItemDataSource<L> {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: item_schema::<L>(),
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        match self.find(&request.config).await {
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
impl<L: Lookup> DataSourceWithConfigure for ItemDataSource<L> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        configure_client(&mut self.client, request)
    }
}

/// Lists every item of a collection
pub struct ListDataSource<L: Lookup> {
    type_name: String,
    client: Option<Client>,
    _lookup: PhantomData<fn() -> L>,
}

impl<L: Lookup> ListDataSource<L> {
    pub fn new() -> Self {
        Self {
            type_name: format!("prowlarr_{}", L::PLURAL),
            client: None,
            _lookup: PhantomData,
        }
    }

    async fn list(&self) -> Result<DynamicValue, Diagnostic> {
        let client = self.client.as_ref().ok_or_else(not_configured)?;
        let items = L::list(client)
            .await
            .map_err(|e| client_error(Action::Read, L::PLURAL, &e))?;

        tracing::trace!("read {}", L::PLURAL);
        let mapped = items
            .iter()
            .map(|item| L::to_state(item).map(|state| state.value))
            .collect::<tfplug::Result<Vec<_>>>()
            .and_then(|values| list_state(L::PLURAL, values));
        mapped.map_err(|e| state_error(L::PLURAL, e))
    }
}

impl<L: Lookup> Default for ListDataSource<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<L: Lookup> DataSource for ListDataSource<L> {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: list_schema::<L>(),
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        match self.list().await {
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
impl<L: Lookup> DataSourceWithConfigure for ListDataSource<L> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        configure_client(&mut self.client, request)
    }
}

/// Registers the single item data source of a collection
pub fn register_item<L: Lookup>(data_sources: &mut HashMap<String, DataSourceFactory>) {
    data_sources.insert(
        format!("prowlarr_{}", L::NAME),
        Box::new(|| Box::new(ItemDataSource::<L>::new()) as Box<dyn DataSourceWithConfigure>),
    );
}

/// Registers the single item and the list data sources of a collection
pub fn register<L: Lookup>(data_sources: &mut HashMap<String, DataSourceFactory>) {
    register_item::<L>(data_sources);
    data_sources.insert(
        format!("prowlarr_{}", L::PLURAL),
        Box::new(|| Box::new(ListDataSource::<L>::new()) as Box<dyn DataSourceWithConfigure>),
    );
}
