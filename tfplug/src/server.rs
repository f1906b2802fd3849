//! Server module for running Terraform providers
//!
//! Binds a loopback listener, prints the go-plugin handshake line on stdout
//! and serves the provider until Terraform closes the connection or the
//! process receives Ctrl-C.

use crate::error::{Result, TfplugError};
use crate::grpc::GrpcProviderServer;
use crate::proto::ProviderServer;
use crate::provider::Provider;
use std::io::Write;
use std::path::PathBuf;
use tonic::transport::{Identity, Server, ServerTlsConfig};

/// Environment variable go-plugin uses to detect a Terraform parent process
pub const MAGIC_COOKIE_KEY: &str = "TF_PLUGIN_MAGIC_COOKIE";
pub const MAGIC_COOKIE_VALUE: &str =
    "d602bf8f470bc67ca7faa0386276bbdd4330efaf76d1a219cb4d6991ca9872b2";

const CORE_PROTOCOL_VERSION: u32 = 1;
const PLUGIN_PROTOCOL_VERSION: u32 = 6;

/// Server configuration for running a Terraform provider
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// PEM certificate; TLS is enabled only when both paths are set
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,
    /// Maximum message size in bytes
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cert_path: None,
            key_path: None,
            max_message_size: 256 << 20, // 256MB
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cert_path(mut self, path: PathBuf) -> Self {
        self.cert_path = Some(path);
        self
    }

    pub fn with_key_path(mut self, path: PathBuf) -> Self {
        self.key_path = Some(path);
        self
    }

    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }
}

/// Fails unless the process was launched by Terraform
pub fn check_magic_cookie() -> Result<()> {
    match std::env::var(MAGIC_COOKIE_KEY) {
        Ok(value) if value == MAGIC_COOKIE_VALUE => Ok(()),
        _ => Err(TfplugError::HandshakeFailed(
            "This binary is a plugin. These are not meant to be executed directly. \
             Please execute the program that consumes these plugins, which will load \
             any plugins automatically"
                .to_string(),
        )),
    }
}

fn handshake_line(addr: std::net::SocketAddr) -> String {
    format!(
        "{}|{}|tcp|{}|grpc",
        CORE_PROTOCOL_VERSION, PLUGIN_PROTOCOL_VERSION, addr
    )
}

async fn load_tls(config: &ServerConfig) -> Result<Option<ServerTlsConfig>> {
    let (Some(cert_path), Some(key_path)) = (&config.cert_path, &config.key_path) else {
        return Ok(None);
    };

    let cert = tokio::fs::read(cert_path)
        .await
        .map_err(|e| TfplugError::TlsError(format!("Failed to read certificate: {}", e)))?;
    let key = tokio::fs::read(key_path)
        .await
        .map_err(|e| TfplugError::TlsError(format!("Failed to read key: {}", e)))?;

    // Another component may already have installed a provider
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    Ok(Some(
        ServerTlsConfig::new().identity(Identity::from_pem(cert, key)),
    ))
}

/// Main entry point for running a provider
pub async fn serve<P: Provider + 'static>(provider: P, config: ServerConfig) -> Result<()> {
    check_magic_cookie()?;

    let provider_service = ProviderServer::new(GrpcProviderServer::new(provider))
        .max_decoding_message_size(config.max_message_size)
        .max_encoding_message_size(config.max_message_size);

    let mut builder = Server::builder();
    if let Some(tls) = load_tls(&config).await? {
        builder = builder.tls_config(tls)?;
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let mut stdout = std::io::stdout();
    writeln!(stdout, "{}", handshake_line(addr))?;
    stdout.flush()?;

    tracing::info!(%addr, "provider server listening");

    let incoming = tokio_stream::wrappers::TcpListenerStream::new(listener);
    builder
        .add_service(provider_service)
        .serve_with_incoming_shutdown(incoming, async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;

    Ok(())
}

/// Convenience function to run a provider with default configuration
pub async fn serve_default<P: Provider + 'static>(provider: P) -> Result<()> {
    serve(provider, ServerConfig::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_line_advertises_protocol_six() {
        let addr: std::net::SocketAddr = "127.0.0.1:41234".parse().unwrap();
        assert_eq!(handshake_line(addr), "1|6|tcp|127.0.0.1:41234|grpc");
    }

    #[test]
    fn default_config_is_plaintext() {
        let config = ServerConfig::default();
        assert!(config.cert_path.is_none());
        assert_eq!(config.max_message_size, 256 << 20);
    }

    #[tokio::test]
    async fn tls_requires_both_paths() {
        let config = ServerConfig::new().with_cert_path(PathBuf::from("/nonexistent.pem"));
        assert!(load_tls(&config).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_certificate_is_a_tls_error() {
        let config = ServerConfig::new()
            .with_cert_path(PathBuf::from("/nonexistent/cert.pem"))
            .with_key_path(PathBuf::from("/nonexistent/key.pem"));
        assert!(matches!(
            load_tls(&config).await,
            Err(TfplugError::TlsError(_))
        ));
    }
}
