//! Host configuration singleton

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::client::Client;
use super::error::ApiError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostConfig {
    pub id: i64,
    pub bind_address: String,
    pub port: i64,
    pub url_base: String,
    pub instance_name: String,
    pub application_url: String,
    pub launch_browser: bool,

    pub authentication_method: String,
    pub authentication_required: String,
    pub username: String,
    pub password: String,
    pub password_confirmation: String,

    pub proxy_enabled: bool,
    pub proxy_type: String,
    pub proxy_hostname: String,
    pub proxy_port: i64,
    pub proxy_username: String,
    pub proxy_password: String,
    pub proxy_bypass_filter: String,
    pub proxy_bypass_local_addresses: bool,

    pub enable_ssl: bool,
    pub ssl_port: i64,
    pub certificate_validation: String,
    pub ssl_cert_path: String,
    pub ssl_cert_password: String,

    pub update_mechanism: String,
    pub branch: String,
    pub update_script_path: String,
    pub update_automatically: bool,

    pub backup_folder: String,
    pub backup_interval: i64,
    pub backup_retention: i64,

    pub log_level: String,
    pub analytics_enabled: bool,
    pub log_size_limit: i64,

    /// Settings this provider does not manage, sent back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub struct HostApi<'a> {
    client: &'a Client,
}

impl<'a> HostApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> Result<HostConfig, ApiError> {
        self.client.get("/config/host").await
    }

    pub async fn update(&self, config: &HostConfig) -> Result<HostConfig, ApiError> {
        self.client
            .put(&format!("/config/host/{}", config.id), config)
            .await
    }
}
