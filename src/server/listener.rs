use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::server::routes::Offers;

pub async fn run(cfg: &Config, shutdown: Arc<Notify>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!("Listening on {}", cfg.server.listen_addr);

    let offers = Arc::new(Offers::from_config(&cfg.content));

    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let offers = Arc::clone(&offers);
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, peer.to_string(), offers, shutdown);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
