//! Collections exposed through the lookup data sources

use async_trait::async_trait;
use std::marker::PhantomData;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::{AttributePath, DynamicValue};

use super::lookup::Lookup;
use crate::api::app_profiles::AppProfile;
use crate::api::indexers::Indexer;
use crate::api::tags::{Tag, TagDetails};
use crate::api::{ApiError, Client, FieldModel};
use crate::helpers::fields::int_set_value;
use crate::resources::family::{self, family_schema, Family};
use crate::resources::{indexer, sync_profile, tag};

/// The entities of a field-bearing family, looked up by name
pub struct Families<F>(PhantomData<fn() -> F>);

#[async_trait]
impl<F: Family> Lookup for Families<F> {
    type Item = F::Model;

    const NAME: &'static str = F::NAME;
    const PLURAL: &'static str = F::PLURAL;
    const KEY: &'static str = "name";
    const TITLE: &'static str = F::TITLE;

    fn attributes() -> Vec<Attribute> {
        family_schema::<F>(None).block.attributes
    }

    async fn list(client: &Client) -> Result<Vec<F::Model>, ApiError> {
        F::endpoint(client).list().await
    }

    fn key(item: &F::Model) -> &str {
        item.name()
    }

    fn to_state(item: &F::Model) -> tfplug::Result<DynamicValue> {
        family::to_state::<F>(item, None, &DynamicValue::null())
    }
}

pub struct Indexers;

#[async_trait]
impl Lookup for Indexers {
    type Item = Indexer;

    const NAME: &'static str = "indexer";
    const PLURAL: &'static str = "indexers";
    const KEY: &'static str = "name";
    const TITLE: &'static str = "Indexer";

    fn attributes() -> Vec<Attribute> {
        indexer::indexer_schema().block.attributes
    }

    async fn list(client: &Client) -> Result<Vec<Indexer>, ApiError> {
        client.indexers().endpoint().list().await
    }

    fn key(item: &Indexer) -> &str {
        &item.name
    }

    fn to_state(item: &Indexer) -> tfplug::Result<DynamicValue> {
        indexer::to_state(item, None)
    }
}

/// Indexer definitions with their default settings
pub struct IndexerSchemas;

#[async_trait]
impl Lookup for IndexerSchemas {
    type Item = Indexer;

    const NAME: &'static str = "indexer_schema";
    const PLURAL: &'static str = "indexer_schemas";
    const KEY: &'static str = "name";
    const TITLE: &'static str = "Indexer Schema";

    fn attributes() -> Vec<Attribute> {
        indexer::indexer_schema().block.attributes
    }

    async fn list(client: &Client) -> Result<Vec<Indexer>, ApiError> {
        client.indexers().schemas().await
    }

    fn key(item: &Indexer) -> &str {
        &item.name
    }

    fn to_state(item: &Indexer) -> tfplug::Result<DynamicValue> {
        indexer::to_state(item, None)
    }
}

pub struct Tags;

#[async_trait]
impl Lookup for Tags {
    type Item = Tag;

    const NAME: &'static str = "tag";
    const PLURAL: &'static str = "tags";
    const KEY: &'static str = "label";
    const TITLE: &'static str = "Tag";

    fn attributes() -> Vec<Attribute> {
        tag::tag_schema().block.attributes
    }

    async fn list(client: &Client) -> Result<Vec<Tag>, ApiError> {
        client.tags().endpoint().list().await
    }

    fn key(item: &Tag) -> &str {
        &item.label
    }

    fn to_state(item: &Tag) -> tfplug::Result<DynamicValue> {
        tag::to_state(item)
    }
}

/// Tags with the entities using them
pub struct TagsDetails;

fn id_set(name: &str, description: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::Set(Box::new(AttributeType::Number)))
        .description(description)
        .computed()
        .build()
}

#[async_trait]
impl Lookup for TagsDetails {
    type Item = TagDetails;

    const NAME: &'static str = "tag_details";
    const PLURAL: &'static str = "tags_details";
    const KEY: &'static str = "label";
    const TITLE: &'static str = "Tag Details";

    fn attributes() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("id", AttributeType::Number)
                .description("Tag ID.")
                .computed()
                .build(),
            AttributeBuilder::new("label", AttributeType::String)
                .description("Tag label.")
                .computed()
                .build(),
            id_set("notification_ids", "List of associated notifications."),
            id_set("indexer_ids", "List of associated indexers."),
            id_set("indexer_proxy_ids", "List of associated indexer proxies."),
            id_set("application_ids", "List of associated applications."),
        ]
    }

    async fn list(client: &Client) -> Result<Vec<TagDetails>, ApiError> {
        client.tags().details().await
    }

    fn key(item: &TagDetails) -> &str {
        &item.label
    }

    fn to_state(item: &TagDetails) -> tfplug::Result<DynamicValue> {
        let mut state = DynamicValue::object();
        state.set_i64(&AttributePath::new("id"), item.id)?;
        state.set_string(&AttributePath::new("label"), item.label.clone())?;
        state.set_value(
            &AttributePath::new("notification_ids"),
            int_set_value(&item.notification_ids),
        )?;
        state.set_value(&AttributePath::new("indexer_ids"), int_set_value(&item.indexer_ids))?;
        state.set_value(
            &AttributePath::new("indexer_proxy_ids"),
            int_set_value(&item.indexer_proxy_ids),
        )?;
        state.set_value(
            &AttributePath::new("application_ids"),
            int_set_value(&item.application_ids),
        )?;
        Ok(state)
    }
}

pub struct SyncProfiles;

#[async_trait]
impl Lookup for SyncProfiles {
    type Item = AppProfile;

    const NAME: &'static str = "sync_profile";
    const PLURAL: &'static str = "sync_profiles";
    const KEY: &'static str = "name";
    const TITLE: &'static str = "Sync Profile";

    fn attributes() -> Vec<Attribute> {
        sync_profile::sync_profile_schema().block.attributes
    }

    async fn list(client: &Client) -> Result<Vec<AppProfile>, ApiError> {
        client.app_profiles().list().await
    }

    fn key(item: &AppProfile) -> &str {
        &item.name
    }

    fn to_state(item: &AppProfile) -> tfplug::Result<DynamicValue> {
        sync_profile::to_state(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sources::lookup::{item_schema, list_schema};
    use crate::resources::download_clients::DownloadClients;

    #[test]
    fn item_schema_requires_only_the_key() {
        let schema = item_schema::<Families<DownloadClients>>();

        let name = schema.attribute("name").unwrap();
        assert!(name.required);
        let protocol = schema.attribute("protocol").unwrap();
        assert!(protocol.computed && !protocol.required);
        assert!(protocol.validators.is_empty());
        assert!(schema.attribute("host").unwrap().computed);
    }

    #[test]
    fn list_schema_nests_items() {
        let schema = list_schema::<TagsDetails>();

        assert!(schema.attribute("id").unwrap().computed);
        let items = schema.attribute("tags_details").unwrap();
        let nested = items.nested_type.as_ref().unwrap();
        assert_eq!(nested.attributes.len(), 6);
        assert!(nested.attributes.iter().all(|a| a.computed));
    }

    #[test]
    fn tag_label_is_the_lookup_key() {
        let schema = item_schema::<Tags>();
        assert!(schema.attribute("label").unwrap().required);
        assert!(schema.attribute("id").unwrap().computed);
    }
}
