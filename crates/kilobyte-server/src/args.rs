use std::path::PathBuf;

use clap::Parser;
use kilobyte_engine::MergeMode;
use serde::Deserialize;
use serde::de::IntoDeserializer;
use serde::de::value::StrDeserializer;

#[derive(Parser, Debug, Default)]
#[command(about = "Serve the kilobyte page")]
pub struct Args {
    /// Optional TOML config file; flags given here take precedence.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Host interface to bind (default 0.0.0.0).
    #[arg(long)]
    pub host: Option<String>,
    /// Port to bind (default 8080).
    #[arg(long)]
    pub port: Option<u16>,
    /// Directory of extra static files (default "public" in the working directory).
    #[arg(long, value_name = "DIR")]
    pub public: Option<PathBuf>,
    /// Most games kept in memory at once (default 1024).
    #[arg(long)]
    pub max_sessions: Option<usize>,
    /// Seed for tile placement; every page load replays the same game.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Merge sweep behaviour at line boundaries: "wrapping" or "within-line".
    #[arg(long, value_parser = parse_merge_mode)]
    pub merge_mode: Option<MergeMode>,
    /// Optional tracing filter, e.g. "info", "debug".
    #[arg(long)]
    pub log: Option<String>,
}

/// Accepts the same names as `merge_mode` in the config file.
fn parse_merge_mode(raw: &str) -> Result<MergeMode, String> {
    let de: StrDeserializer<'_, serde::de::value::Error> = raw.into_deserializer();
    MergeMode::deserialize(de).map_err(|err| err.to_string())
}
