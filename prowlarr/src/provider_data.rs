//! Provider data structure passed to resources and data sources

use crate::api::Client;

#[derive(Clone, Debug)]
pub struct ProwlarrProviderData {
    pub client: Client,
}

impl ProwlarrProviderData {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}
