use resource_daemon::runtime::{setup_tracing, Daemon, DaemonConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = DaemonConfig::from_env().map_err(|e| e.to_string())?;
    info!(addr = %config.socket_addr(), "Starting resource daemon");

    let mut daemon = Daemon::new(config).map_err(|e| e.to_string())?;
    daemon.start().await.map_err(|e| e.to_string())?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Unable to listen for shutdown signal");
    }

    daemon.shutdown().await;
    Ok(())
}
