//! Indexer proxies (FlareSolverr, HTTP and SOCKS)

use tfplug::schema::Attribute;
use tfplug::types::DynamicValue;

use super::family::{Family, KindSpec};
use crate::api::endpoint::Endpoint;
use crate::api::indexer_proxies::IndexerProxy;
use crate::api::Client;
use crate::helpers::FieldSpec;

pub struct IndexerProxies;

const INDEXER_PROXY_FIELDS: &[FieldSpec] = &[
    FieldSpec::int("port", "port"),
    FieldSpec::int("requestTimeout", "request_timeout"),
    FieldSpec::string("host", "host"),
    FieldSpec::string("username", "username"),
    FieldSpec::string("password", "password").sensitive(),
];

const PROXY: &[&str] = &["host", "port", "username", "password"];

pub static KINDS: &[KindSpec] = &[
    KindSpec::new(
        "indexer_proxy_flaresolverr",
        "FlareSolverr",
        "FlareSolverrSettings",
        &["host", "request_timeout"],
    )
    .required(&["host", "request_timeout"]),
    KindSpec::new("indexer_proxy_http", "Http", "HttpSettings", PROXY)
        .required(&["host", "port"]),
    KindSpec::new("indexer_proxy_socks4", "Socks4", "Socks4Settings", PROXY)
        .required(&["host", "port"]),
    KindSpec::new("indexer_proxy_socks5", "Socks5", "Socks5Settings", PROXY)
        .required(&["host", "port"]),
];

impl Family for IndexerProxies {
    type Model = IndexerProxy;

    const NAME: &'static str = "indexer_proxy";
    const PLURAL: &'static str = "indexer_proxies";
    const TITLE: &'static str = "Indexer Proxy";
    const FIELDS: &'static [FieldSpec] = INDEXER_PROXY_FIELDS;

    fn endpoint(client: &Client) -> Endpoint<'_, IndexerProxy> {
        client.indexer_proxies()
    }

    fn attributes(_kind: Option<&KindSpec>) -> Vec<Attribute> {
        vec![]
    }

    fn write_model(_state: &DynamicValue, _kind: Option<&KindSpec>, _model: &mut IndexerProxy) {}

    fn read_model(
        _model: &IndexerProxy,
        _kind: Option<&KindSpec>,
        _state: &mut DynamicValue,
    ) -> tfplug::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::family::{family_schema, field_specs};

    #[test]
    fn kinds_only_reference_known_fields() {
        for kind in KINDS {
            assert_eq!(
                field_specs::<IndexerProxies>(Some(kind)).len(),
                kind.fields.len(),
                "{}",
                kind.name
            );
        }
    }

    #[test]
    fn flaresolverr_has_no_credentials() {
        let schema = family_schema::<IndexerProxies>(Some(&KINDS[0]));
        assert!(schema.attribute("request_timeout").unwrap().required);
        assert!(schema.attribute("password").is_none());
        assert_eq!(schema.block.attributes.len(), 5);
    }
}
