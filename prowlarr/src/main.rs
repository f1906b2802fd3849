use prowlarr::ProwlarrProvider;
use tfplug::ServerConfig;
use tracing_subscriber::EnvFilter;

/// Terraform sets TF_LOG_PROVIDER for provider logs, TF_LOG for everything
fn log_filter() -> EnvFilter {
    let level = std::env::var("TF_LOG_PROVIDER")
        .or_else(|_| std::env::var("TF_LOG"))
        .unwrap_or_default()
        .to_lowercase();
    if level.is_empty() {
        return EnvFilter::new("info");
    }
    EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> tfplug::Result<()> {
    // stdout carries the plugin handshake
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tfplug::serve(ProwlarrProvider::new(), ServerConfig::default()).await
}
