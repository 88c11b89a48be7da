//! Server configuration.
//!
//! The configuration is a YAML document loaded once at startup. It is
//! validated up front so that the accept loop never starts with a resource
//! root or log destination it cannot use.

use anyhow::{Context, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Env var overriding `server.port`.
pub const PORT_ENV: &str = "WEBSERVER_PORT";
/// Env var naming the config file when no CLI argument is given.
pub const CONFIG_ENV: &str = "WEBSERVER_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub resources: ResourceConfig,
    #[serde(default)]
    pub logs: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// Seconds the acceptor waits for a new connection before stopping.
    /// `0` waits forever.
    #[serde(default = "default_accept_timeout")]
    pub accept_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    pub root: PathBuf,
    #[serde(default = "default_file")]
    pub default_file: String,
    #[serde(default)]
    pub allow_listing: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_access_file")]
    pub access_file: String,
    #[serde(default = "default_error_file")]
    pub error_file: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            access_file: default_access_file(),
            error_file: default_error_file(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_accept_timeout() -> u64 {
    300
}

fn default_file() -> String {
    "index.html".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_access_file() -> String {
    "access.log".to_string()
}

fn default_error_file() -> String {
    "error.log".to_string()
}

impl Config {
    /// Picks the config path: first CLI argument, then `WEBSERVER_CONFIG`,
    /// then `config.yaml` in the working directory.
    pub fn path_from_env() -> PathBuf {
        std::env::args()
            .nth(1)
            .or_else(|| std::env::var(CONFIG_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
            .into()
    }

    /// Reads, parses and validates the config file at `path`.
    ///
    /// Relative `resources.root` and `logs.dir` are resolved against the
    /// directory containing the config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut cfg = Self::from_yaml_str(&text, base_dir)
            .with_context(|| format!("loading config file {}", path.display()))?;
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(text: &str, base_dir: &Path) -> anyhow::Result<Self> {
        let mut cfg: Config = serde_yaml::from_str(text).context("parsing YAML")?;

        if cfg.resources.root.is_relative() {
            cfg.resources.root = base_dir.join(&cfg.resources.root);
        }
        if cfg.logs.dir.is_relative() {
            cfg.logs.dir = base_dir.join(&cfg.logs.dir);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(port) = std::env::var(PORT_ENV) {
            self.server.port = port
                .parse()
                .with_context(|| format!("invalid {PORT_ENV} value {port:?}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let root = &self.resources.root;
        if !root.is_dir() {
            bail!("resource root {} is not a directory", root.display());
        }

        let default_file = &self.resources.default_file;
        if default_file.is_empty() || default_file.contains('/') || default_file.contains('\\') {
            bail!("default_file must be a plain file name, got {default_file:?}");
        }

        if self.logs.access_file.is_empty() || self.logs.error_file.is_empty() {
            bail!("log file names must not be empty");
        }

        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn accept_timeout(&self) -> Option<Duration> {
        match self.server.accept_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn access_log_path(&self) -> PathBuf {
        self.logs.dir.join(&self.logs.access_file)
    }

    pub fn error_log_path(&self) -> PathBuf {
        self.logs.dir.join(&self.logs.error_file)
    }
}
