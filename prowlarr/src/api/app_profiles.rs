//! Application (sync) profiles

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppProfile {
    pub id: i64,
    pub name: String,
    pub enable_rss: bool,
    pub enable_interactive_search: bool,
    pub enable_automatic_search: bool,
    pub minimum_seeders: i64,
}
