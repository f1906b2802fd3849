//! Application (Sonarr, Radarr, ...) synchronisation targets

use serde::{Deserialize, Serialize};

use super::common::{impl_field_model, Field};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Application {
    pub id: i64,
    pub name: String,
    pub sync_level: String,
    pub implementation: String,
    pub config_contract: String,
    pub fields: Vec<Field>,
    pub tags: Vec<i64>,
}

impl_field_model!(Application);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn application_uses_camel_case() {
        let app: Application = serde_json::from_value(json!({
            "id": 2,
            "name": "Sonarr",
            "syncLevel": "fullSync",
            "implementation": "Sonarr",
            "configContract": "SonarrSettings",
            "fields": [{"name": "baseUrl", "value": "http://sonarr:8989"}],
            "tags": [1],
            "infoLink": "https://wiki.servarr.com"
        }))
        .unwrap();

        assert_eq!(app.sync_level, "fullSync");
        assert_eq!(app.config_contract, "SonarrSettings");
        assert_eq!(app.fields.len(), 1);
    }
}
