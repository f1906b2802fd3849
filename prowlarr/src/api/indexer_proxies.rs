//! Indexer proxy models

use serde::{Deserialize, Serialize};

use super::common::{impl_field_model, Field};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexerProxy {
    pub id: i64,
    pub name: String,
    pub implementation: String,
    pub config_contract: String,
    pub fields: Vec<Field>,
    pub tags: Vec<i64>,
}

impl_field_model!(IndexerProxy);
