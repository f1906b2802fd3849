use mockito::{Matcher, Server};
use prowlarr::ProwlarrProvider;
use serde_json::json;
use tfplug::context::Context;
use tfplug::data_source::{ConfigureDataSourceRequest, ReadDataSourceRequest};
use tfplug::provider::{ConfigureProviderRequest, ProviderData};
use tfplug::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest, ReadResourceRequest,
    UpdateResourceRequest,
};
use tfplug::{AttributePath, Dynamic, DynamicValue, Provider};

async fn configured_provider(url: &str) -> (ProwlarrProvider, ProviderData) {
    let mut provider = ProwlarrProvider::new();
    let mut config = DynamicValue::object();
    config
        .set_string(&AttributePath::new("url"), url.to_string())
        .unwrap();
    config
        .set_string(&AttributePath::new("api_key"), "secret".to_string())
        .unwrap();
    config
        .set_value(&AttributePath::new("authorization"), Dynamic::Null)
        .unwrap();

    let response = provider
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                terraform_version: "1.9.0".to_string(),
                config,
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    let data = response.provider_data.unwrap();
    (provider, data)
}

fn sabnzbd_plan(priority: i64) -> DynamicValue {
    let mut plan = DynamicValue::object();
    let set = |plan: &mut DynamicValue, name: &str, value: Dynamic| {
        plan.set_value(&AttributePath::new(name), value).unwrap();
    };
    set(&mut plan, "id", Dynamic::Unknown);
    set(&mut plan, "name", Dynamic::String("SABnzbd".into()));
    set(&mut plan, "enable", Dynamic::Bool(true));
    set(&mut plan, "priority", Dynamic::Number(priority as f64));
    set(&mut plan, "host", Dynamic::String("sabnzbd".into()));
    set(&mut plan, "port", Dynamic::Number(8080.0));
    set(&mut plan, "api_key", Dynamic::String("sab-key".into()));
    set(&mut plan, "item_priority", Dynamic::Unknown);
    set(&mut plan, "tags", Dynamic::List(vec![]));
    plan
}

fn sabnzbd_response(priority: i64) -> String {
    json!({
        "id": 5,
        "name": "SABnzbd",
        "enable": true,
        "priority": priority,
        "protocol": "usenet",
        "implementation": "Sabnzbd",
        "configContract": "SabnzbdSettings",
        "fields": [
            {"name": "host", "value": "sabnzbd"},
            {"name": "port", "value": 8080},
            {"name": "apiKey", "value": "********"},
            {"name": "itemPriority", "value": -100},
            {"name": "useSsl", "value": false}
        ],
        "tags": []
    })
    .to_string()
}

#[tokio::test(flavor = "multi_thread")]
async fn download_client_lifecycle_with_mock_server() {
    let mut server = Server::new_async().await;
    let (provider, data) = configured_provider(&server.url()).await;

    let create = server
        .mock("POST", "/api/v1/downloadclient")
        .match_header("x-api-key", "secret")
        .match_body(Matcher::PartialJson(json!({
            "name": "SABnzbd",
            "implementation": "Sabnzbd",
            "configContract": "SabnzbdSettings",
            "protocol": "usenet",
            "fields": [
                {"name": "host", "value": "sabnzbd"},
                {"name": "port", "value": 8080},
                {"name": "apiKey", "value": "sab-key"}
            ]
        })))
        .with_status(201)
        .with_body(sabnzbd_response(1))
        .create_async()
        .await;

    let resources = provider.resources();
    let factory = &resources["prowlarr_download_client_sabnzbd"];

    let mut resource = factory();
    let configured = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(data.clone()),
            },
        )
        .await;
    assert!(configured.diagnostics.is_empty());

    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "prowlarr_download_client_sabnzbd".to_string(),
                planned_state: sabnzbd_plan(1),
                config: sabnzbd_plan(1),
            },
        )
        .await;
    create.assert_async().await;
    assert!(created.diagnostics.is_empty());

    let state = created.new_state;
    assert_eq!(state.get_i64(&AttributePath::new("id")).unwrap(), 5);
    assert_eq!(
        state.get_string(&AttributePath::new("api_key")).unwrap(),
        "sab-key"
    );
    assert_eq!(
        state.get_i64(&AttributePath::new("item_priority")).unwrap(),
        -100
    );

    // A fresh instance per request, as the plugin server does
    let _read = server
        .mock("GET", "/api/v1/downloadclient/5")
        .with_body(sabnzbd_response(1))
        .create_async()
        .await;
    let mut resource = factory();
    resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(data.clone()),
            },
        )
        .await;
    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "prowlarr_download_client_sabnzbd".to_string(),
                current_state: state.clone(),
            },
        )
        .await;
    assert!(read.diagnostics.is_empty());
    assert_eq!(read.new_state, Some(state.clone()));

    let update = server
        .mock("PUT", "/api/v1/downloadclient/5")
        .match_body(Matcher::PartialJson(json!({"id": 5, "priority": 2})))
        .with_status(202)
        .with_body(sabnzbd_response(2))
        .create_async()
        .await;
    let mut planned = sabnzbd_plan(2);
    planned.set_i64(&AttributePath::new("id"), 5).unwrap();
    let updated = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "prowlarr_download_client_sabnzbd".to_string(),
                prior_state: state.clone(),
                planned_state: planned.clone(),
                config: planned,
            },
        )
        .await;
    update.assert_async().await;
    assert!(updated.diagnostics.is_empty());
    assert_eq!(
        updated
            .new_state
            .get_i64(&AttributePath::new("priority"))
            .unwrap(),
        2
    );

    let delete = server
        .mock("DELETE", "/api/v1/downloadclient/5")
        .with_status(200)
        .create_async()
        .await;
    let deleted = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "prowlarr_download_client_sabnzbd".to_string(),
                prior_state: updated.new_state,
            },
        )
        .await;
    delete.assert_async().await;
    assert!(deleted.diagnostics.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_tag_reports_data_source_error() {
    let mut server = Server::new_async().await;
    let (provider, data) = configured_provider(&server.url()).await;

    let _tags = server
        .mock("GET", "/api/v1/tag")
        .with_body(r#"[{"id":1,"label":"hd"},{"id":2,"label":"anime"}]"#)
        .create_async()
        .await;

    let data_sources = provider.data_sources();
    let mut data_source = data_sources["prowlarr_tag"]();
    data_source
        .configure(
            Context::new(),
            ConfigureDataSourceRequest {
                provider_data: Some(data),
            },
        )
        .await;

    let mut config = DynamicValue::object();
    config
        .set_string(&AttributePath::new("label"), "anime".to_string())
        .unwrap();
    let found = data_source
        .read(
            Context::new(),
            ReadDataSourceRequest {
                type_name: "prowlarr_tag".to_string(),
                config: config.clone(),
            },
        )
        .await;
    assert!(found.diagnostics.is_empty());
    assert_eq!(found.state.get_i64(&AttributePath::new("id")).unwrap(), 2);

    config
        .set_string(&AttributePath::new("label"), "4k".to_string())
        .unwrap();
    let missing = data_source
        .read(
            Context::new(),
            ReadDataSourceRequest {
                type_name: "prowlarr_tag".to_string(),
                config,
            },
        )
        .await;
    assert_eq!(missing.diagnostics[0].summary, "Data Source Error");
    assert_eq!(
        missing.diagnostics[0].detail,
        "Unable to find tag, got error: data source not found: no tag with label '4k'"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn download_clients_list_counts_items() {
    let mut server = Server::new_async().await;
    let (provider, data) = configured_provider(&server.url()).await;

    let _list = server
        .mock("GET", "/api/v1/downloadclient")
        .with_body(format!("[{}]", sabnzbd_response(1)))
        .create_async()
        .await;

    let data_sources = provider.data_sources();
    let mut data_source = data_sources["prowlarr_download_clients"]();
    data_source
        .configure(
            Context::new(),
            ConfigureDataSourceRequest {
                provider_data: Some(data),
            },
        )
        .await;

    let response = data_source
        .read(
            Context::new(),
            ReadDataSourceRequest {
                type_name: "prowlarr_download_clients".to_string(),
                config: DynamicValue::object(),
            },
        )
        .await;

    assert!(response.diagnostics.is_empty());
    assert_eq!(
        response.state.get_string(&AttributePath::new("id")).unwrap(),
        "1"
    );
    let items = response
        .state
        .get_list(&AttributePath::new("download_clients"))
        .unwrap();
    assert_eq!(
        items[0].as_map().unwrap()["implementation"],
        Dynamic::String("Sabnzbd".into())
    );
    // Secrets masked by the API cannot be shown
    assert_eq!(items[0].as_map().unwrap()["api_key"], Dynamic::Null);
}
