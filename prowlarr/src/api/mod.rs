pub mod app_profiles;
pub mod applications;
pub mod client;
pub mod common;
pub mod download_clients;
pub mod endpoint;
pub mod error;
pub mod host;
pub mod indexer_proxies;
pub mod indexers;
pub mod notifications;
pub mod system;
pub mod tags;

pub use client::{Client, Credentials};
pub use common::{Field, FieldModel};
pub use error::ApiError;
