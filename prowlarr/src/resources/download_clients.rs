//! Download clients, torrent and usenet

use std::collections::HashMap;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, NestedType};
use tfplug::types::{AttributePath, Dynamic, DynamicValue};
use tfplug::validator::OneOfString;

use super::family::{Family, KindSpec};
use crate::api::download_clients::{DownloadClient, DownloadClientCategory};
use crate::api::endpoint::Endpoint;
use crate::api::Client;
use crate::helpers::fields::int_set_value;
use crate::helpers::schema::{bool_value, i64_value, string_value};
use crate::helpers::FieldSpec;

pub struct DownloadClients;

const DOWNLOAD_CLIENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::bool("addPaused", "add_paused"),
    FieldSpec::bool("useSsl", "use_ssl"),
    FieldSpec::bool("startOnAdd", "start_on_add"),
    FieldSpec::bool("addStopped", "add_stopped"),
    FieldSpec::bool("saveMagnetFiles", "save_magnet_files"),
    FieldSpec::bool("readOnly", "read_only"),
    FieldSpec::int("port", "port"),
    FieldSpec::int("itemPriority", "item_priority"),
    FieldSpec::int("initialState", "initial_state"),
    FieldSpec::int("intialState", "intial_state"),
    FieldSpec::string("host", "host"),
    FieldSpec::string("apiKey", "api_key").sensitive(),
    FieldSpec::string("rpcPath", "rpc_path"),
    FieldSpec::string("urlBase", "url_base"),
    FieldSpec::string("apiUrl", "api_url"),
    FieldSpec::string("appId", "app_id"),
    FieldSpec::string("appToken", "app_token").sensitive(),
    FieldSpec::string("secretToken", "secret_token").sensitive(),
    FieldSpec::string("username", "username"),
    FieldSpec::string("password", "password").sensitive(),
    FieldSpec::string("tvImportedCategory", "tv_imported_category"),
    FieldSpec::string("destinationDirectory", "destination_directory"),
    FieldSpec::string("directory", "directory"),
    FieldSpec::string("stationDirectory", "station_directory"),
    FieldSpec::string("destination", "destination"),
    FieldSpec::string("category", "category"),
    FieldSpec::string("nzbFolder", "nzb_folder"),
    FieldSpec::string("strmFolder", "strm_folder"),
    FieldSpec::string("torrentFolder", "torrent_folder"),
    FieldSpec::string("magnetFileExtension", "magnet_file_extension"),
    FieldSpec::int_set("additionalTags", "additional_tags"),
    FieldSpec::string_set("tags", "field_tags"),
    FieldSpec::string_set("postImportTags", "post_im_tags"),
];

const PROTOCOLS: &[&str] = &["usenet", "torrent"];
const TORRENT: &str = "torrent";
const USENET: &str = "usenet";

const DOWNLOAD_STATION: &[&str] = &[
    "host", "port", "use_ssl", "username", "password", "category", "directory",
];
const TRANSMISSION: &[&str] = &[
    "host",
    "port",
    "use_ssl",
    "url_base",
    "username",
    "password",
    "category",
    "directory",
    "item_priority",
    "add_paused",
];

pub static KINDS: &[KindSpec] = &[
    KindSpec::new(
        "download_client_aria2",
        "Aria2",
        "Aria2Settings",
        &["host", "port", "rpc_path", "secret_token", "use_ssl"],
    )
    .protocol(TORRENT),
    KindSpec::new(
        "download_client_deluge",
        "Deluge",
        "DelugeSettings",
        &[
            "host",
            "port",
            "url_base",
            "password",
            "category",
            "item_priority",
            "add_paused",
            "use_ssl",
        ],
    )
    .protocol(TORRENT),
    KindSpec::new(
        "download_client_flood",
        "Flood",
        "FloodSettings",
        &[
            "host",
            "port",
            "use_ssl",
            "url_base",
            "username",
            "password",
            "destination",
            "field_tags",
            "post_im_tags",
            "additional_tags",
            "start_on_add",
        ],
    )
    .protocol(TORRENT),
    KindSpec::new(
        "download_client_freebox",
        "TorrentFreeboxDownload",
        "FreeboxDownloadSettings",
        &[
            "host",
            "port",
            "use_ssl",
            "api_url",
            "app_id",
            "app_token",
            "destination_directory",
            "category",
            "item_priority",
            "add_paused",
        ],
    )
    .protocol(TORRENT),
    KindSpec::new(
        "download_client_hadouken",
        "Hadouken",
        "HadoukenSettings",
        &[
            "host", "port", "use_ssl", "url_base", "username", "password", "category",
        ],
    )
    .protocol(TORRENT),
    KindSpec::new(
        "download_client_qbittorrent",
        "QBittorrent",
        "QBittorrentSettings",
        &[
            "host",
            "port",
            "use_ssl",
            "url_base",
            "username",
            "password",
            "category",
            "item_priority",
            "initial_state",
        ],
    )
    .protocol(TORRENT),
    KindSpec::new(
        "download_client_rtorrent",
        "RTorrent",
        "RTorrentSettings",
        &[
            "host",
            "port",
            "use_ssl",
            "url_base",
            "username",
            "password",
            "category",
            "directory",
            "item_priority",
            "add_stopped",
        ],
    )
    .protocol(TORRENT),
    KindSpec::new(
        "download_client_torrent_blackhole",
        "TorrentBlackhole",
        "TorrentBlackholeSettings",
        &[
            "torrent_folder",
            "save_magnet_files",
            "magnet_file_extension",
            "read_only",
        ],
    )
    .protocol(TORRENT)
    .required(&["torrent_folder"]),
    KindSpec::new(
        "download_client_torrent_download_station",
        "TorrentDownloadStation",
        "DownloadStationSettings",
        DOWNLOAD_STATION,
    )
    .protocol(TORRENT),
    KindSpec::new(
        "download_client_transmission",
        "Transmission",
        "TransmissionSettings",
        TRANSMISSION,
    )
    .protocol(TORRENT),
    KindSpec::new(
        "download_client_utorrent",
        "UTorrent",
        "UTorrentSettings",
        &[
            "host",
            "port",
            "use_ssl",
            "url_base",
            "username",
            "password",
            "category",
            "item_priority",
            "intial_state",
        ],
    )
    .protocol(TORRENT),
    KindSpec::new("download_client_vuze", "Vuze", "TransmissionSettings", TRANSMISSION)
        .protocol(TORRENT),
    KindSpec::new(
        "download_client_nzbget",
        "Nzbget",
        "NzbgetSettings",
        &[
            "host",
            "port",
            "use_ssl",
            "url_base",
            "username",
            "password",
            "category",
            "item_priority",
            "add_paused",
        ],
    )
    .protocol(USENET),
    KindSpec::new(
        "download_client_nzbvortex",
        "NzbVortex",
        "NzbVortexSettings",
        &[
            "host",
            "port",
            "url_base",
            "api_key",
            "category",
            "item_priority",
        ],
    )
    .protocol(USENET)
    .required(&["api_key"])
    .one_of(&[("item_priority", &[-1, 0, 1])]),
    KindSpec::new(
        "download_client_pneumatic",
        "Pneumatic",
        "PneumaticSettings",
        &["nzb_folder", "strm_folder"],
    )
    .protocol(USENET)
    .required(&["nzb_folder", "strm_folder"]),
    KindSpec::new(
        "download_client_sabnzbd",
        "Sabnzbd",
        "SabnzbdSettings",
        &[
            "host",
            "port",
            "use_ssl",
            "url_base",
            "api_key",
            "username",
            "password",
            "category",
            "item_priority",
        ],
    )
    .protocol(USENET)
    .one_of(&[("item_priority", &[-100, -2, -1, 0, 1, 2])]),
    KindSpec::new(
        "download_client_usenet_blackhole",
        "UsenetBlackhole",
        "UsenetBlackholeSettings",
        &["nzb_folder"],
    )
    .protocol(USENET)
    .required(&["nzb_folder"]),
    KindSpec::new(
        "download_client_usenet_download_station",
        "UsenetDownloadStation",
        "DownloadStationSettings",
        DOWNLOAD_STATION,
    )
    .protocol(USENET),
];

fn category_attributes() -> Vec<Attribute> {
    vec![
        AttributeBuilder::new("name", AttributeType::String)
            .description("Name of client category.")
            .computed()
            .build(),
        AttributeBuilder::new("categories", AttributeType::Set(Box::new(AttributeType::Number)))
            .description("List of mapped categories.")
            .computed()
            .build(),
    ]
}

fn categories_from_state(state: &DynamicValue) -> Vec<DownloadClientCategory> {
    let Some(items) = state
        .get(&AttributePath::new("categories"))
        .and_then(Dynamic::as_list)
    else {
        return vec![];
    };

    items
        .iter()
        .filter_map(Dynamic::as_map)
        .map(|item| DownloadClientCategory {
            name: item
                .get("name")
                .and_then(Dynamic::as_str)
                .unwrap_or_default()
                .to_string(),
            categories: item
                .get("categories")
                .and_then(Dynamic::as_list)
                .map(|ids| ids.iter().filter_map(Dynamic::as_i64).collect())
                .unwrap_or_default(),
        })
        .collect()
}

fn categories_to_state(categories: &[DownloadClientCategory]) -> Dynamic {
    Dynamic::List(
        categories
            .iter()
            .map(|category| {
                Dynamic::Map(HashMap::from([
                    ("name".to_string(), Dynamic::String(category.name.clone())),
                    ("categories".to_string(), int_set_value(&category.categories)),
                ]))
            })
            .collect(),
    )
}

impl Family for DownloadClients {
    type Model = DownloadClient;

    const NAME: &'static str = "download_client";
    const PLURAL: &'static str = "download_clients";
    const TITLE: &'static str = "Download Client";
    const FIELDS: &'static [FieldSpec] = DOWNLOAD_CLIENT_FIELDS;

    fn endpoint(client: &Client) -> Endpoint<'_, DownloadClient> {
        client.download_clients()
    }

    fn attributes(kind: Option<&KindSpec>) -> Vec<Attribute> {
        let mut attributes = vec![
            AttributeBuilder::new("enable", AttributeType::Bool)
                .description("Enable flag.")
                .optional()
                .computed()
                .build(),
            AttributeBuilder::new("priority", AttributeType::Number)
                .description("Priority.")
                .optional()
                .computed()
                .build(),
            AttributeBuilder::nested("categories", NestedType::set(category_attributes()))
                .description("List of mapped categories.")
                .computed()
                .build(),
        ];
        if kind.is_none() {
            attributes.push(
                AttributeBuilder::new("protocol", AttributeType::String)
                    .description("Protocol. Valid values are 'usenet' and 'torrent'.")
                    .required()
                    .validator(Box::new(OneOfString::new(PROTOCOLS)))
                    .build(),
            );
        }
        attributes
    }

    fn write_model(state: &DynamicValue, kind: Option<&KindSpec>, model: &mut DownloadClient) {
        model.enable = bool_value(state, "enable").unwrap_or_default();
        model.priority = i64_value(state, "priority").unwrap_or_default();
        model.protocol = match kind.and_then(|kind| kind.protocol) {
            Some(protocol) => protocol.to_string(),
            None => string_value(state, "protocol").unwrap_or_default(),
        };
        model.categories = categories_from_state(state);
    }

    fn read_model(
        model: &DownloadClient,
        kind: Option<&KindSpec>,
        state: &mut DynamicValue,
    ) -> tfplug::Result<()> {
        state.set_bool(&AttributePath::new("enable"), model.enable)?;
        state.set_i64(&AttributePath::new("priority"), model.priority)?;
        state.set_value(
            &AttributePath::new("categories"),
            categories_to_state(&model.categories),
        )?;
        if kind.is_none() {
            state.set_string(&AttributePath::new("protocol"), model.protocol.clone())?;
        }
        Ok(())
    }
}
