pub mod configure;
pub mod errors;
pub mod fields;
pub mod schema;

pub use configure::{client_from, not_configured, Component};
pub use errors::{client_error, data_source_error, Action};
pub use fields::{FieldKind, FieldSpec, MASKED_VALUE};
