//! Tag operations

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::endpoint::Endpoint;
use super::error::ApiError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tag {
    pub id: i64,
    pub label: String,
}

/// A tag together with the ids of every entity using it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagDetails {
    pub id: i64,
    pub label: String,
    pub notification_ids: Vec<i64>,
    pub indexer_ids: Vec<i64>,
    pub indexer_proxy_ids: Vec<i64>,
    pub application_ids: Vec<i64>,
}

pub struct TagsApi<'a> {
    client: &'a Client,
}

impl<'a> TagsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn endpoint(&self) -> Endpoint<'a, Tag> {
        Endpoint::new(self.client, "/tag")
    }

    pub async fn details(&self) -> Result<Vec<TagDetails>, ApiError> {
        self.client.get("/tag/detail").await
    }
}
