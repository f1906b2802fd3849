#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::plan_modifier::{RequiresReplace, UseStateForUnknown};
use tfplug::proto::{self, ProviderService};
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory, ServerCapabilities,
};
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::OneOfString;
use tfplug::{import_state_passthrough_int_id, GrpcProviderServer};
use tonic::Request;

type Store = Mutex<HashMap<i64, (String, i64)>>;

struct WidgetProvider;

#[async_trait]
impl Provider for WidgetProvider {
    fn type_name(&self) -> &str {
        "test"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: "test".to_string(),
            server_capabilities: ServerCapabilities::default(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: SchemaBuilder::new()
                .attribute(
                    AttributeBuilder::new("endpoint", AttributeType::String)
                        .optional()
                        .build(),
                )
                .build(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        _request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let store: Store = Mutex::new(HashMap::new());
        ConfigureProviderResponse {
            diagnostics: vec![],
            provider_data: Some(Arc::new(store)),
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut resources: HashMap<String, ResourceFactory> = HashMap::new();
        resources.insert(
            "test_widget".to_string(),
            Box::new(|| Box::new(WidgetResource::default()) as Box<dyn ResourceWithConfigure>),
        );
        resources
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut data_sources: HashMap<String, DataSourceFactory> = HashMap::new();
        data_sources.insert(
            "test_widgets".to_string(),
            Box::new(|| Box::new(WidgetsDataSource::default()) as Box<dyn DataSourceWithConfigure>),
        );
        data_sources
    }
}

#[derive(Default)]
struct WidgetResource {
    store: Option<Arc<dyn std::any::Any + Send + Sync>>,
}

impl WidgetResource {
    fn store(&self) -> Option<&Store> {
        self.store.as_ref().and_then(|s| s.downcast_ref::<Store>())
    }

    fn state(id: i64, name: &str, size: i64, kind: Dynamic) -> DynamicValue {
        let mut state = DynamicValue::object();
        state.set_i64(&AttributePath::new("id"), id).unwrap();
        state
            .set_string(&AttributePath::new("name"), name.to_string())
            .unwrap();
        state.set_i64(&AttributePath::new("size"), size).unwrap();
        state.set_value(&AttributePath::new("kind"), kind).unwrap();
        state
    }
}

#[async_trait]
impl Resource for WidgetResource {
    fn type_name(&self) -> &str {
        "test_widget"
    }

    async fn schema(&self, _ctx: Context, _request: ResourceSchemaRequest) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: SchemaBuilder::new()
                .attribute(
                    AttributeBuilder::new("id", AttributeType::Number)
                        .computed()
                        .plan_modifier(Box::new(UseStateForUnknown))
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("name", AttributeType::String)
                        .required()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("size", AttributeType::Number)
                        .optional()
                        .computed()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("kind", AttributeType::String)
                        .optional()
                        .validator(Box::new(OneOfString::new(&["small", "large"])))
                        .plan_modifier(Box::new(RequiresReplace))
                        .build(),
                )
                .build(),
            diagnostics: vec![],
        }
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let store = self.store().unwrap();
        let name = request
            .planned_state
            .get_string(&AttributePath::new("name"))
            .unwrap();
        let mut widgets = store.lock().unwrap();
        let id = widgets.len() as i64 + 1;
        widgets.insert(id, (name.clone(), 10));

        let kind = request
            .planned_state
            .get(&AttributePath::new("kind"))
            .cloned()
            .unwrap_or(Dynamic::Null);
        CreateResourceResponse {
            new_state: Self::state(id, &name, 10, kind),
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let id = request
            .current_state
            .get_i64(&AttributePath::new("id"))
            .unwrap();
        let widgets = self.store().unwrap().lock().unwrap();
        ReadResourceResponse {
            new_state: widgets
                .get(&id)
                .map(|(name, size)| Self::state(id, name, *size, Dynamic::Null)),
            diagnostics: vec![],
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.planned_state,
            diagnostics: vec![Diagnostic::error("Update Failed", "widgets are immutable")],
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let id = request.prior_state.get_i64(&AttributePath::new("id")).unwrap();
        self.store().unwrap().lock().unwrap().remove(&id);
        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }

    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse::default();
        import_state_passthrough_int_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for WidgetResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        self.store = request.provider_data;
        ConfigureResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[derive(Default)]
struct WidgetsDataSource {
    configured: bool,
}

#[async_trait]
impl DataSource for WidgetsDataSource {
    fn type_name(&self) -> &str {
        "test_widgets"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: SchemaBuilder::new()
                .attribute(
                    AttributeBuilder::new("id", AttributeType::String)
                        .computed()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("names", AttributeType::Set(Box::new(AttributeType::String)))
                        .computed()
                        .build(),
                )
                .build(),
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, _request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut state = DynamicValue::object();
        state
            .set_string(&AttributePath::new("id"), self.configured.to_string())
            .unwrap();
        ReadDataSourceResponse {
            state,
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for WidgetsDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        self.configured = request.provider_data.is_some();
        ConfigureDataSourceResponse {
            diagnostics: vec![],
        }
    }
}

fn object(pairs: &[(&str, Dynamic)]) -> Dynamic {
    Dynamic::Map(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    )
}

fn dv(value: Dynamic) -> Option<proto::DynamicValue> {
    Some(proto::DynamicValue {
        msgpack: DynamicValue::new(value).encode_msgpack().unwrap(),
        json: vec![],
    })
}

fn decode(value: Option<proto::DynamicValue>) -> Dynamic {
    DynamicValue::decode_msgpack(&value.unwrap().msgpack)
        .unwrap()
        .value
}

async fn configured_server() -> GrpcProviderServer<WidgetProvider> {
    let server = GrpcProviderServer::new(WidgetProvider);
    let response = server
        .configure_provider(Request::new(proto::configure_provider::Request {
            terraform_version: "1.9.0".to_string(),
            config: dv(object(&[("endpoint", Dynamic::Null)])),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(response.diagnostics.is_empty());
    server
}

async fn create_widget(server: &GrpcProviderServer<WidgetProvider>, name: &str) -> Dynamic {
    let config = object(&[
        ("id", Dynamic::Null),
        ("name", Dynamic::String(name.to_string())),
        ("size", Dynamic::Null),
        ("kind", Dynamic::Null),
    ]);
    let plan = server
        .plan_resource_change(Request::new(proto::plan_resource_change::Request {
            type_name: "test_widget".to_string(),
            prior_state: dv(Dynamic::Null),
            proposed_new_state: dv(config.clone()),
            config: dv(config.clone()),
            ..Default::default()
        }))
        .await
        .unwrap()
        .into_inner();

    let applied = server
        .apply_resource_change(Request::new(proto::apply_resource_change::Request {
            type_name: "test_widget".to_string(),
            prior_state: dv(Dynamic::Null),
            planned_state: plan.planned_state,
            config: dv(config),
            ..Default::default()
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(applied.diagnostics.is_empty());
    decode(applied.new_state)
}

#[tokio::test]
async fn metadata_lists_registered_types() {
    let server = GrpcProviderServer::new(WidgetProvider);
    let response = server
        .get_metadata(Request::new(proto::get_metadata::Request {}))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.resources.len(), 1);
    assert_eq!(response.resources[0].type_name, "test_widget");
    assert_eq!(response.data_sources[0].type_name, "test_widgets");
}

#[tokio::test]
async fn provider_schema_includes_all_types() {
    let server = GrpcProviderServer::new(WidgetProvider);
    let response = server
        .get_provider_schema(Request::new(proto::get_provider_schema::Request {}))
        .await
        .unwrap()
        .into_inner();

    let widget = &response.resource_schemas["test_widget"];
    let block = widget.block.as_ref().unwrap();
    let id = block.attributes.iter().find(|a| a.name == "id").unwrap();
    assert!(id.computed);
    assert_eq!(id.r#type, b"\"number\"".to_vec());

    let widgets = &response.data_source_schemas["test_widgets"];
    let names = widgets
        .block
        .as_ref()
        .unwrap()
        .attributes
        .iter()
        .find(|a| a.name == "names")
        .unwrap();
    assert_eq!(names.r#type, br#"["set","string"]"#.to_vec());
    assert!(response.provider.is_some());
}

#[tokio::test]
async fn plan_create_marks_computed_attributes_unknown() {
    let server = configured_server().await;
    let config = object(&[
        ("id", Dynamic::Null),
        ("name", Dynamic::String("alpha".into())),
        ("size", Dynamic::Null),
        ("kind", Dynamic::String("small".into())),
    ]);

    let response = server
        .plan_resource_change(Request::new(proto::plan_resource_change::Request {
            type_name: "test_widget".to_string(),
            prior_state: dv(Dynamic::Null),
            proposed_new_state: dv(config.clone()),
            config: dv(config),
            ..Default::default()
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.requires_replace.is_empty());
    let planned = decode(response.planned_state);
    let planned = planned.as_map().unwrap();
    assert!(planned["id"].is_unknown());
    assert!(planned["size"].is_unknown());
    assert_eq!(planned["kind"], Dynamic::String("small".into()));
}

#[tokio::test]
async fn create_read_and_delete_round_trip() {
    let server = configured_server().await;
    let state = create_widget(&server, "alpha").await;
    let map = state.as_map().unwrap();
    assert_eq!(map["id"], Dynamic::Number(1.0));
    assert_eq!(map["size"], Dynamic::Number(10.0));
    assert!(map["kind"].is_null());

    let read = server
        .read_resource(Request::new(proto::read_resource::Request {
            type_name: "test_widget".to_string(),
            current_state: dv(state.clone()),
            ..Default::default()
        }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(decode(read.new_state), state);

    let deleted = server
        .apply_resource_change(Request::new(proto::apply_resource_change::Request {
            type_name: "test_widget".to_string(),
            prior_state: dv(state.clone()),
            planned_state: dv(Dynamic::Null),
            config: dv(Dynamic::Null),
            ..Default::default()
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(deleted.diagnostics.is_empty());
    assert!(decode(deleted.new_state).is_null());

    let gone = server
        .read_resource(Request::new(proto::read_resource::Request {
            type_name: "test_widget".to_string(),
            current_state: dv(state),
            ..Default::default()
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(decode(gone.new_state).is_null());
}

#[tokio::test]
async fn changing_replace_attribute_requires_replacement() {
    let server = configured_server().await;
    let prior = object(&[
        ("id", Dynamic::Number(1.0)),
        ("name", Dynamic::String("alpha".into())),
        ("size", Dynamic::Number(10.0)),
        ("kind", Dynamic::String("small".into())),
    ]);
    let config = object(&[
        ("id", Dynamic::Null),
        ("name", Dynamic::String("alpha".into())),
        ("size", Dynamic::Null),
        ("kind", Dynamic::String("large".into())),
    ]);
    let proposed = object(&[
        ("id", Dynamic::Number(1.0)),
        ("name", Dynamic::String("alpha".into())),
        ("size", Dynamic::Number(10.0)),
        ("kind", Dynamic::String("large".into())),
    ]);

    let response = server
        .plan_resource_change(Request::new(proto::plan_resource_change::Request {
            type_name: "test_widget".to_string(),
            prior_state: dv(prior),
            proposed_new_state: dv(proposed),
            config: dv(config),
            ..Default::default()
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.requires_replace.len(), 1);
    let planned = decode(response.planned_state);
    // id keeps its prior value while size is recomputed
    assert_eq!(planned.as_map().unwrap()["id"], Dynamic::Number(1.0));
    assert!(planned.as_map().unwrap()["size"].is_unknown());
}

#[tokio::test]
async fn unchanged_plan_keeps_prior_state() {
    let server = configured_server().await;
    let prior = object(&[
        ("id", Dynamic::Number(3.0)),
        ("name", Dynamic::String("alpha".into())),
        ("size", Dynamic::Number(10.0)),
        ("kind", Dynamic::Null),
    ]);
    let config = object(&[
        ("id", Dynamic::Null),
        ("name", Dynamic::String("alpha".into())),
        ("size", Dynamic::Null),
        ("kind", Dynamic::Null),
    ]);

    let response = server
        .plan_resource_change(Request::new(proto::plan_resource_change::Request {
            type_name: "test_widget".to_string(),
            prior_state: dv(prior.clone()),
            proposed_new_state: dv(prior.clone()),
            config: dv(config),
            ..Default::default()
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(decode(response.planned_state), prior);
}

#[tokio::test]
async fn failed_update_returns_prior_state() {
    let server = configured_server().await;
    let prior = create_widget(&server, "alpha").await;
    let mut planned = prior.clone();
    if let Dynamic::Map(map) = &mut planned {
        map.insert("name".to_string(), Dynamic::String("beta".into()));
    }

    let response = server
        .apply_resource_change(Request::new(proto::apply_resource_change::Request {
            type_name: "test_widget".to_string(),
            prior_state: dv(prior.clone()),
            planned_state: dv(planned.clone()),
            config: dv(planned),
            ..Default::default()
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Update Failed");
    assert_eq!(decode(response.new_state), prior);
}

#[tokio::test]
async fn import_fills_missing_attributes_with_null() {
    let server = configured_server().await;
    let response = server
        .import_resource_state(Request::new(proto::import_resource_state::Request {
            type_name: "test_widget".to_string(),
            id: "7".to_string(),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.diagnostics.is_empty());
    let state = decode(response.imported_resources[0].state.clone());
    let map = state.as_map().unwrap();
    assert_eq!(map["id"], Dynamic::Number(7.0));
    assert!(map["name"].is_null());
    assert_eq!(map.len(), 4);
}

#[tokio::test]
async fn validate_resource_config_runs_attribute_validators() {
    let server = GrpcProviderServer::new(WidgetProvider);
    let config = object(&[
        ("id", Dynamic::Null),
        ("name", Dynamic::String("alpha".into())),
        ("size", Dynamic::Null),
        ("kind", Dynamic::String("medium".into())),
    ]);

    let response = server
        .validate_resource_config(Request::new(proto::validate_resource_config::Request {
            type_name: "test_widget".to_string(),
            config: dv(config),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(
        response.diagnostics[0].summary,
        "Invalid Attribute Value Match"
    );
}

#[tokio::test]
async fn data_source_receives_provider_data() {
    let server = configured_server().await;
    let response = server
        .read_data_source(Request::new(proto::read_data_source::Request {
            type_name: "test_widgets".to_string(),
            config: dv(object(&[("id", Dynamic::Null), ("names", Dynamic::Null)])),
            ..Default::default()
        }))
        .await
        .unwrap()
        .into_inner();

    let state = decode(response.state);
    let map = state.as_map().unwrap();
    assert_eq!(map["id"], Dynamic::String("true".into()));
    assert!(map["names"].is_null());
}

#[tokio::test]
async fn upgrade_resource_state_reads_json() {
    let server = GrpcProviderServer::new(WidgetProvider);
    let response = server
        .upgrade_resource_state(Request::new(proto::upgrade_resource_state::Request {
            type_name: "test_widget".to_string(),
            version: 0,
            raw_state: Some(proto::RawState {
                json: br#"{"id":4,"name":"alpha","obsolete":true}"#.to_vec(),
                flatmap: HashMap::new(),
            }),
        }))
        .await
        .unwrap()
        .into_inner();

    let state = decode(response.upgraded_state);
    let map = state.as_map().unwrap();
    assert_eq!(map["id"], Dynamic::Number(4.0));
    assert!(map["size"].is_null());
    assert!(!map.contains_key("obsolete"));
}
