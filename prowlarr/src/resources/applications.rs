//! Applications: the *arr instances Prowlarr pushes indexers to

use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::{AttributePath, DynamicValue};
use tfplug::validator::OneOfString;

use super::family::{Family, KindSpec};
use crate::api::applications::Application;
use crate::api::endpoint::Endpoint;
use crate::api::Client;
use crate::helpers::schema::string_value;
use crate::helpers::FieldSpec;

pub struct Applications;

const APPLICATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::string("prowlarrUrl", "prowlarr_url"),
    FieldSpec::string("baseUrl", "base_url"),
    FieldSpec::string("apiKey", "api_key").sensitive(),
    FieldSpec::int_set("syncCategories", "sync_categories"),
    FieldSpec::int_set("animeSyncCategories", "anime_sync_categories"),
];

const SYNC_LEVELS: &[&str] = &["addOnly", "disabled", "fullSync"];

const STANDARD: &[&str] = &["prowlarr_url", "base_url", "api_key", "sync_categories"];
const REQUIRED: &[&str] = &["prowlarr_url", "base_url", "api_key"];

pub static KINDS: &[KindSpec] = &[
    KindSpec::new(
        "application_lazy_librarian",
        "LazyLibrarian",
        "LazyLibrarianSettings",
        STANDARD,
    )
    .required(REQUIRED),
    KindSpec::new("application_lidarr", "Lidarr", "LidarrSettings", STANDARD).required(REQUIRED),
    KindSpec::new("application_mylar", "Mylar", "MylarSettings", STANDARD).required(REQUIRED),
    KindSpec::new("application_radarr", "Radarr", "RadarrSettings", STANDARD).required(REQUIRED),
    KindSpec::new("application_readarr", "Readarr", "ReadarrSettings", STANDARD)
        .required(REQUIRED),
    KindSpec::new(
        "application_sonarr",
        "Sonarr",
        "SonarrSettings",
        &[
            "prowlarr_url",
            "base_url",
            "api_key",
            "sync_categories",
            "anime_sync_categories",
        ],
    )
    .required(REQUIRED),
    KindSpec::new("application_whisparr", "Whisparr", "WhisparrSettings", STANDARD)
        .required(REQUIRED),
];

impl Family for Applications {
    type Model = Application;

    const NAME: &'static str = "application";
    const PLURAL: &'static str = "applications";
    const TITLE: &'static str = "Application";
    const FIELDS: &'static [FieldSpec] = APPLICATION_FIELDS;

    fn endpoint(client: &Client) -> Endpoint<'_, Application> {
        client.applications()
    }

    fn attributes(_kind: Option<&KindSpec>) -> Vec<Attribute> {
        vec![AttributeBuilder::new("sync_level", AttributeType::String)
            .description("Sync level: `addOnly`, `disabled` or `fullSync`.")
            .required()
            .validator(Box::new(OneOfString::new(SYNC_LEVELS)))
            .build()]
    }

    fn write_model(state: &DynamicValue, _kind: Option<&KindSpec>, model: &mut Application) {
        model.sync_level = string_value(state, "sync_level").unwrap_or_default();
    }

    fn read_model(
        model: &Application,
        _kind: Option<&KindSpec>,
        state: &mut DynamicValue,
    ) -> tfplug::Result<()> {
        state.set_string(&AttributePath::new("sync_level"), model.sync_level.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Field;
    use crate::resources::family::{family_schema, field_specs, to_model, to_state};
    use serde_json::json;
    use tfplug::Dynamic;

    fn sonarr() -> &'static KindSpec {
        KINDS
            .iter()
            .find(|kind| kind.implementation == "Sonarr")
            .unwrap()
    }

    #[test]
    fn kinds_only_reference_known_fields() {
        for kind in KINDS {
            assert_eq!(
                field_specs::<Applications>(Some(kind)).len(),
                kind.fields.len(),
                "{}",
                kind.name
            );
        }
    }

    #[test]
    fn kind_schema_requires_connection_fields() {
        let schema = family_schema::<Applications>(Some(sonarr()));

        assert!(schema.attribute("api_key").unwrap().required);
        assert!(schema.attribute("api_key").unwrap().sensitive);
        assert!(schema.attribute("anime_sync_categories").unwrap().optional);
        assert!(schema.attribute("implementation").is_none());
        assert!(schema.attribute("sync_level").unwrap().required);
    }

    #[test]
    fn generic_schema_exposes_implementation() {
        let schema = family_schema::<Applications>(None);
        assert!(schema.attribute("implementation").unwrap().required);
        assert!(schema.attribute("config_contract").unwrap().required);
        assert!(schema.attribute("anime_sync_categories").is_some());
    }

    #[test]
    fn planned_state_becomes_application() {
        let mut state = DynamicValue::object();
        state
            .set_string(&AttributePath::new("name"), "Sonarr".to_string())
            .unwrap();
        state
            .set_string(&AttributePath::new("sync_level"), "fullSync".to_string())
            .unwrap();
        state
            .set_string(&AttributePath::new("base_url"), "http://sonarr:8989".to_string())
            .unwrap();
        state
            .set_value(&AttributePath::new("api_key"), Dynamic::Unknown)
            .unwrap();
        state
            .set_list(&AttributePath::new("tags"), vec![Dynamic::Number(1.0)])
            .unwrap();

        let app = to_model::<Applications>(&state, Some(sonarr()));
        assert_eq!(app.implementation, "Sonarr");
        assert_eq!(app.config_contract, "SonarrSettings");
        assert_eq!(app.sync_level, "fullSync");
        assert_eq!(app.tags, vec![1]);
        assert_eq!(app.fields, vec![Field::new("baseUrl", json!("http://sonarr:8989"))]);
    }

    #[test]
    fn application_becomes_state() {
        let app = Application {
            id: 3,
            name: "Radarr".to_string(),
            sync_level: "addOnly".to_string(),
            implementation: "Radarr".to_string(),
            config_contract: "RadarrSettings".to_string(),
            fields: vec![
                Field::new("apiKey", json!("********")),
                Field::new("syncCategories", json!([2000])),
            ],
            tags: vec![],
        };
        let mut prior = DynamicValue::object();
        prior
            .set_string(&AttributePath::new("api_key"), "secret".to_string())
            .unwrap();

        let state = to_state::<Applications>(&app, None, &prior).unwrap();
        assert_eq!(state.get_i64(&AttributePath::new("id")).unwrap(), 3);
        assert_eq!(
            state.get_string(&AttributePath::new("api_key")).unwrap(),
            "secret"
        );
        assert_eq!(
            state.get_string(&AttributePath::new("implementation")).unwrap(),
            "Radarr"
        );
        assert!(state.is_null_at(&AttributePath::new("prowlarr_url")));
        assert_eq!(
            state.get_list(&AttributePath::new("sync_categories")).unwrap(),
            vec![Dynamic::from(2000i64)]
        );
    }
}
