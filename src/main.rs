use std::sync::Arc;

use parley::config::Config;
use parley::server;
use tokio::sync::Notify;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let shutdown = Arc::new(Notify::new());

    tokio::select! {
        res = server::listener::run(&cfg, Arc::clone(&shutdown)) => {
            res?;
        }

        _ = shutdown.notified() => {
            tracing::info!("Quit requested");
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
