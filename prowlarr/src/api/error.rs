use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{status} {reason}")]
    ApiError {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("401 Unauthorized")]
    AuthError { body: String },

    #[error("404 Not Found: {path}")]
    NotFound { path: String, body: String },
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Response body of a failed API call, if the server answered at all
    pub fn details(&self) -> Option<&str> {
        match self {
            ApiError::ApiError { body, .. }
            | ApiError::AuthError { body }
            | ApiError::NotFound { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_status_line() {
        let err = ApiError::ApiError {
            status: 400,
            reason: "Bad Request".to_string(),
            body: r#"[{"propertyName":"Name"}]"#.to_string(),
        };
        assert_eq!(err.to_string(), "400 Bad Request");
        assert_eq!(err.details(), Some(r#"[{"propertyName":"Name"}]"#));
    }

    #[test]
    fn only_missing_resources_are_not_found() {
        let missing = ApiError::NotFound {
            path: "/api/v1/tag/9".to_string(),
            body: String::new(),
        };
        assert!(missing.is_not_found());
        assert!(!ApiError::ParseError("eof".to_string()).is_not_found());
        assert!(ApiError::InvalidUrl("x".to_string()).details().is_none());
    }
}
