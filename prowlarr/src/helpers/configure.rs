//! Extraction of the provider data handed to resources and data sources

use tfplug::provider::ProviderData;
use tfplug::types::Diagnostic;

use crate::api::Client;
use crate::provider_data::ProwlarrProviderData;

/// Which kind of component is being configured, for diagnostics
#[derive(Debug, Clone, Copy)]
pub enum Component {
    Resource,
    DataSource,
}

impl Component {
    fn label(self) -> &'static str {
        match self {
            Component::Resource => "Resource",
            Component::DataSource => "Data Source",
        }
    }
}

/// Returns the API client carried by the provider data
///
/// `None` provider data is not an error: Terraform validates and plans
/// before the provider has been configured.
pub fn client_from(
    provider_data: Option<ProviderData>,
    component: Component,
) -> Result<Option<Client>, Diagnostic> {
    let Some(data) = provider_data else {
        return Ok(None);
    };

    match data.downcast_ref::<ProwlarrProviderData>() {
        Some(data) => Ok(Some(data.client.clone())),
        None => Err(Diagnostic::error(
            format!("Unexpected {} Configure Type", component.label()),
            "Expected ProwlarrProviderData. Please report this issue to the provider developers.",
        )),
    }
}

/// Error for CRUD calls reaching an instance that never got a client
pub fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "Provider data was not properly configured",
    )
}
