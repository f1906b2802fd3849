//! Notification (connection) models

use serde::{Deserialize, Serialize};

use super::common::{impl_field_model, Field};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Notification {
    pub id: i64,
    pub name: String,
    pub on_grab: bool,
    pub on_health_issue: bool,
    pub on_health_restored: bool,
    pub on_application_update: bool,
    pub include_manual_grabs: bool,
    pub include_health_warnings: bool,
    pub implementation: String,
    pub config_contract: String,
    pub fields: Vec<Field>,
    pub tags: Vec<i64>,
}

impl_field_model!(Notification);
