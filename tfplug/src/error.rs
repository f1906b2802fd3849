//! Error types for tfplug

/// Error type for tfplug operations
#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("Resource type not found: {0}")]
    ResourceNotFound(String),

    #[error("Data source type not found: {0}")]
    DataSourceNotFound(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Handshake failed: {0}")]
    HandshakeFailed(String),

    #[error("gRPC error: {0}")]
    GrpcError(Box<tonic::Status>),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TLS configuration error: {0}")]
    TlsError(String),

    #[error("Transport error: {0}")]
    TransportError(#[from] tonic::transport::Error),

    #[error("{0}")]
    Custom(String),
}

/// Result type alias for tfplug operations
pub type Result<T> = std::result::Result<T, TfplugError>;

impl From<String> for TfplugError {
    fn from(s: String) -> Self {
        TfplugError::Custom(s)
    }
}

impl From<&str> for TfplugError {
    fn from(s: &str) -> Self {
        TfplugError::Custom(s.to_string())
    }
}

impl From<tonic::Status> for TfplugError {
    fn from(status: tonic::Status) -> Self {
        TfplugError::GrpcError(Box::new(status))
    }
}

impl From<TfplugError> for tonic::Status {
    fn from(err: TfplugError) -> Self {
        match err {
            TfplugError::GrpcError(status) => *status,
            TfplugError::ResourceNotFound(_) | TfplugError::DataSourceNotFound(_) => {
                tonic::Status::not_found(err.to_string())
            }
            TfplugError::DecodingError(_) | TfplugError::TypeMismatch { .. } => {
                tonic::Status::invalid_argument(err.to_string())
            }
            other => tonic::Status::internal(other.to_string()),
        }
    }
}
