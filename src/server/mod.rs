//! Listening socket and the state shared by every connection.

pub mod listener;

use anyhow::Context;

use crate::access_log::AccessLog;
use crate::config::Config;
use crate::dynamic::HandlerRegistry;
use crate::resources::Resolver;

pub use listener::Server;

/// Read-only state shared by all connection tasks. The access log is the
/// only thing written to, and it serialises its own appends.
#[derive(Debug)]
pub struct ServerContext {
    pub resolver: Resolver,
    pub handlers: HandlerRegistry,
    pub log: AccessLog,
}

impl ServerContext {
    /// Builds the context for `cfg` with the built-in dynamic handlers.
    pub async fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let resolver = Resolver::new(&cfg.resources)?;
        let handlers = HandlerRegistry::with_builtins(resolver.root());
        Self::with_handlers(cfg, resolver, handlers).await
    }

    pub async fn with_handlers(
        cfg: &Config,
        resolver: Resolver,
        handlers: HandlerRegistry,
    ) -> anyhow::Result<Self> {
        let log = AccessLog::open(&cfg.access_log_path(), &cfg.error_log_path())
            .await
            .context("opening access logs")?;

        Ok(Self {
            resolver,
            handlers,
            log,
        })
    }
}
