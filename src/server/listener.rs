use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::http::connection::Connection;
use crate::server::ServerContext;

/// Accepts connections and runs one pipeline task per connection.
pub struct Server {
    listener: TcpListener,
    ctx: Arc<ServerContext>,
    accept_timeout: Option<Duration>,
}

impl Server {
    /// Binds the listening socket and opens the logs. Any failure here is a
    /// startup error.
    pub async fn bind(cfg: &Config) -> anyhow::Result<Self> {
        let ctx = ServerContext::from_config(cfg).await?;
        Self::bind_with(cfg, ctx).await
    }

    /// Like [`Server::bind`] with a caller-built context, e.g. one with extra
    /// dynamic handlers registered.
    pub async fn bind_with(cfg: &Config, ctx: ServerContext) -> anyhow::Result<Self> {
        let addr = cfg.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("binding {addr}"))?;

        Ok(Self {
            listener,
            ctx: Arc::new(ctx),
            accept_timeout: cfg.accept_timeout(),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop. Never waits for a connection task to finish and puts no
    /// bound on how many run at once.
    ///
    /// Returns `Ok(())` once no connection has arrived within the accept
    /// timeout.
    pub async fn run(self) -> anyhow::Result<()> {
        info!("Listening on {}", self.local_addr()?);

        loop {
            let accepted = match self.accept_timeout {
                Some(limit) => match tokio::time::timeout(limit, self.listener.accept()).await {
                    Ok(accepted) => accepted,
                    Err(_) => {
                        info!("No connection received in {}s, stopping", limit.as_secs());
                        return Ok(());
                    }
                },
                None => self.listener.accept().await,
            };

            let (socket, peer) = match accepted {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    continue;
                }
            };
            info!("Accepted connection from {}", peer);

            let ctx = Arc::clone(&self.ctx);
            tokio::spawn(async move {
                let mut conn = Connection::new(socket, peer, ctx);
                if let Err(e) = conn.run().await {
                    error!("Connection error from {}: {}", peer, e);
                }
            });
        }
    }
}

/// Binds according to `cfg` and serves until the accept timeout elapses.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    Server::bind(cfg).await?.run().await
}
