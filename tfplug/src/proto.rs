//! Protocol buffer types for Terraform Plugin Protocol v6
//!
//! The code is generated at build time by tonic_build from
//! `proto/tfplugin6.proto`. Several generated names collide with framework
//! types (`DynamicValue`, `Diagnostic`, `AttributePath`, `Schema`), so always
//! refer to these through the `proto::` prefix.
//!
//! RPC request/response pairs live in snake_case modules, e.g.
//! `proto::read_resource::Request`.

#![allow(clippy::all)]

include!(concat!(env!("OUT_DIR"), "/tfplugin6.rs"));

pub use provider_server::{Provider as ProviderService, ProviderServer};
