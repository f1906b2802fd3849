//! Download client models

use serde::{Deserialize, Serialize};

use super::common::{impl_field_model, Field};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DownloadClient {
    pub id: i64,
    pub name: String,
    pub enable: bool,
    pub priority: i64,
    pub protocol: String,
    pub implementation: String,
    pub config_contract: String,
    pub fields: Vec<Field>,
    pub tags: Vec<i64>,
    pub categories: Vec<DownloadClientCategory>,
}

/// Mapping of a client side category to Prowlarr category ids
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DownloadClientCategory {
    #[serde(rename = "clientCategory")]
    pub name: String,
    pub categories: Vec<i64>,
}

impl_field_model!(DownloadClient);
