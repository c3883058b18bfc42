//! WebSocket server for the collaborative editor.

use collab_server::config::Config;
use collab_server::server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("collab_server=info,collab_core=info")),
        )
        .init();

    let config = Config::from_env()?;

    info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        max_clients = config.max_clients,
        activity_log_capacity = config.activity_log_capacity,
        "starting collab-server"
    );

    server::run(config).await
}
