//! Indexer models and the indexer schema catalogue

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::{impl_field_model, Field};
use super::endpoint::Endpoint;
use super::error::ApiError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Indexer {
    pub id: i64,
    pub name: String,
    pub enable: bool,
    pub app_profile_id: i64,
    pub priority: i64,
    pub implementation: String,
    pub config_contract: String,
    pub protocol: String,
    pub privacy: String,
    pub language: String,
    pub fields: Vec<Field>,
    pub tags: Vec<i64>,
}

impl_field_model!(Indexer);

/// Indexer operations
pub struct IndexersApi<'a> {
    client: &'a Client,
}

impl<'a> IndexersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn endpoint(&self) -> Endpoint<'a, Indexer> {
        Endpoint::new(self.client, "/indexer")
    }

    /// Every indexer definition Prowlarr knows, with default field values
    pub async fn schemas(&self) -> Result<Vec<Indexer>, ApiError> {
        self.client.get("/indexer/schema").await
    }
}
