//! Resource implementations

pub mod applications;
pub mod download_clients;
pub mod family;
pub mod host;
pub mod indexer;
pub mod indexer_proxies;
pub mod notifications;
pub mod sync_profile;
pub mod tag;

use std::collections::HashMap;
use tfplug::provider::ResourceFactory;
use tfplug::resource::ResourceWithConfigure;

use applications::Applications;
use download_clients::DownloadClients;
use indexer_proxies::IndexerProxies;
use notifications::Notifications;

pub use family::FamilyResource;
pub use host::HostResource;
pub use indexer::IndexerResource;
pub use sync_profile::SyncProfileResource;
pub use tag::TagResource;

/// Every resource the provider serves, keyed by type name
pub fn resources() -> HashMap<String, ResourceFactory> {
    let mut resources = HashMap::new();

    family::register::<Applications>(applications::KINDS, &mut resources);
    family::register::<DownloadClients>(download_clients::KINDS, &mut resources);
    family::register::<IndexerProxies>(indexer_proxies::KINDS, &mut resources);
    family::register::<Notifications>(notifications::KINDS, &mut resources);

    resources.insert(
        "prowlarr_tag".to_string(),
        Box::new(|| Box::new(TagResource::new()) as Box<dyn ResourceWithConfigure>),
    );
    resources.insert(
        "prowlarr_sync_profile".to_string(),
        Box::new(|| Box::new(SyncProfileResource::new()) as Box<dyn ResourceWithConfigure>),
    );
    resources.insert(
        "prowlarr_indexer".to_string(),
        Box::new(|| Box::new(IndexerResource::new()) as Box<dyn ResourceWithConfigure>),
    );
    resources.insert(
        "prowlarr_host".to_string(),
        Box::new(|| Box::new(HostResource::new()) as Box<dyn ResourceWithConfigure>),
    );

    resources
}
