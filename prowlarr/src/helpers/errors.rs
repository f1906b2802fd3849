//! Diagnostics reported to Terraform

use std::fmt;
use tfplug::types::Diagnostic;

use crate::api::ApiError;

pub const CLIENT_ERROR: &str = "Client Error";
pub const DATA_SOURCE_ERROR: &str = "Data Source Error";
pub const RESOURCE_ERROR: &str = "Resource Error";

/// What the provider was trying to do when an API call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(verb)
    }
}

/// "Unable to <action> <name>, got error: <err>", followed by the response
/// body when the server returned one
pub fn parse_client_error(action: Action, name: &str, err: &ApiError) -> String {
    let mut message = format!("Unable to {} {}, got error: {}", action, name, err);
    if let Some(body) = err.details() {
        message.push_str("\nDetails:\n");
        message.push_str(body);
    }
    message
}

pub fn client_error(action: Action, name: &str, err: &ApiError) -> Diagnostic {
    Diagnostic::error(CLIENT_ERROR, parse_client_error(action, name, err))
}

pub fn data_not_found_error(kind: &str, field: &str, search: &str) -> String {
    format!(
        "data source not found: no {} with {} '{}'",
        kind, field, search
    )
}

/// Lookup by `field` in a data source found nothing
pub fn data_source_error(name: &str, field: &str, search: &str) -> Diagnostic {
    Diagnostic::error(
        DATA_SOURCE_ERROR,
        format!(
            "Unable to find {}, got error: {}",
            name,
            data_not_found_error(name, field, search)
        ),
    )
}

/// State could not be converted to or from the API model
pub fn state_error(name: &str, err: impl fmt::Display) -> Diagnostic {
    Diagnostic::error(
        RESOURCE_ERROR,
        format!("Unable to map {} state, got error: {}", name, err),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_not_found_names_the_search() {
        assert_eq!(
            data_not_found_error("tag", "label", "test"),
            "data source not found: no tag with label 'test'"
        );
    }

    #[test]
    fn api_errors_include_response_body() {
        let err = ApiError::ApiError {
            status: 400,
            reason: "Bad Request".to_string(),
            body: "Name must be unique".to_string(),
        };
        assert_eq!(
            parse_client_error(Action::Create, "tag", &err),
            "Unable to create tag, got error: 400 Bad Request\nDetails:\nName must be unique"
        );
    }

    #[test]
    fn other_errors_have_no_details() {
        let err = ApiError::ParseError("expected value".to_string());
        assert_eq!(
            parse_client_error(Action::Read, "download_client_sabnzbd", &err),
            "Unable to read download_client_sabnzbd, got error: Failed to parse response: expected value"
        );
    }

    #[test]
    fn data_source_error_uses_summary() {
        let diag = data_source_error("application", "name", "radarr");
        assert_eq!(diag.summary, DATA_SOURCE_ERROR);
        assert_eq!(
            diag.detail,
            "Unable to find application, got error: data source not found: no application with name 'radarr'"
        );
    }

    #[test]
    fn client_error_uses_summary() {
        let diag = client_error(
            Action::Delete,
            "tag",
            &ApiError::AuthError {
                body: String::new(),
            },
        );
        assert_eq!(diag.summary, CLIENT_ERROR);
        assert!(diag.detail.starts_with("Unable to delete tag, got error: 401 Unauthorized"));
    }
}
