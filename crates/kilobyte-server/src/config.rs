use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kilobyte_engine::MergeMode;
use serde::Deserialize;

use crate::args::Args;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub game: GameSettings,
    #[serde(default = "defaults::log")]
    pub log: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Server {
    #[serde(default = "defaults::host")]
    pub host: String,
    #[serde(default = "defaults::port")]
    pub port: u16,
    /// Extra static files; the page's own script and stylesheet are built in.
    #[serde(default = "defaults::public")]
    pub public: PathBuf,
    /// Games kept alive at once; the least recently played is dropped first.
    #[serde(default = "defaults::max_sessions")]
    pub max_sessions: usize,
}

/// Settings every new game is started with.
#[derive(Clone, Debug, PartialEq, Deserialize, Default)]
pub struct GameSettings {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub merge_mode: MergeMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: Server::default(),
            game: GameSettings::default(),
            log: defaults::log(),
        }
    }
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
            public: defaults::public(),
            max_sessions: defaults::max_sessions(),
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("open {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// File settings (or defaults) with command-line flags layered on top.
    pub fn load(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_toml(path)?,
            None => Self::default(),
        };
        if let Some(host) = &args.host {
            config.server.host = host.clone();
        }
        if let Some(port) = args.port {
            config.server.port = port;
        }
        if let Some(public) = &args.public {
            config.server.public = public.clone();
        }
        if let Some(max_sessions) = args.max_sessions {
            config.server.max_sessions = max_sessions;
        }
        if let Some(seed) = args.seed {
            config.game.seed = Some(seed);
        }
        if let Some(mode) = args.merge_mode {
            config.game.merge_mode = mode;
        }
        if let Some(log) = &args.log {
            config.log = log.clone();
        }
        Ok(config)
    }

    pub fn max_sessions(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.server.max_sessions).context("max_sessions must be at least 1")
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .context("invalid host/port combination")
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn host() -> String { "0.0.0.0".to_string() }
    pub fn port() -> u16 { 8080 }
    pub fn public() -> PathBuf { PathBuf::from("public") }
    pub fn max_sessions() -> usize { 1024 }
    pub fn log() -> String { "info".to_string() }
}
