//! Data source implementations

pub mod catalogues;
pub mod host;
pub mod indexer_schemas;
pub mod lookup;
pub mod system_status;

use std::collections::HashMap;
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::provider::DataSourceFactory;

use crate::resources::applications::Applications;
use crate::resources::download_clients::DownloadClients;
use crate::resources::indexer_proxies::IndexerProxies;
use crate::resources::notifications::Notifications;
use catalogues::{Families, IndexerSchemas, Indexers, SyncProfiles, Tags, TagsDetails};

pub use host::HostDataSource;
pub use indexer_schemas::IndexerSchemasDataSource;
pub use system_status::SystemStatusDataSource;

/// Every data source the provider serves, keyed by type name
pub fn data_sources() -> HashMap<String, DataSourceFactory> {
    let mut data_sources = HashMap::new();

    lookup::register::<Families<Applications>>(&mut data_sources);
    lookup::register::<Families<DownloadClients>>(&mut data_sources);
    lookup::register::<Families<IndexerProxies>>(&mut data_sources);
    lookup::register::<Families<Notifications>>(&mut data_sources);
    lookup::register::<Indexers>(&mut data_sources);
    lookup::register::<SyncProfiles>(&mut data_sources);
    lookup::register::<Tags>(&mut data_sources);
    lookup::register::<TagsDetails>(&mut data_sources);
    lookup::register_item::<IndexerSchemas>(&mut data_sources);

    data_sources.insert(
        "prowlarr_indexer_schemas".to_string(),
        Box::new(|| Box::new(IndexerSchemasDataSource::new()) as Box<dyn DataSourceWithConfigure>),
    );
    data_sources.insert(
        "prowlarr_host".to_string(),
        Box::new(|| Box::new(HostDataSource::new()) as Box<dyn DataSourceWithConfigure>),
    );
    data_sources.insert(
        "prowlarr_system_status".to_string(),
        Box::new(|| Box::new(SystemStatusDataSource::new()) as Box<dyn DataSourceWithConfigure>),
    );

    data_sources
}
