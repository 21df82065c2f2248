use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use vidbundle::search::Quality;

#[derive(Parser, Debug)]
#[command(name = "vidbundle")]
#[command(about = "Search stock videos and bundle them into a ZIP archive", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web surface
    Serve(ServeArgs),
    /// Run one search → download → archive cycle and write the ZIP to disk
    Fetch(FetchArgs),
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Address to bind the HTTP server to; defaults to `server.bind_addr`
    #[arg(long)]
    pub address: Option<SocketAddr>,
}

/// Unset options fall back to the configured form defaults
#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    #[arg(long)]
    pub keyword: Option<String>,

    /// Minimum video duration in seconds
    #[arg(long)]
    pub min_duration: Option<u32>,

    /// Maximum video duration in seconds
    #[arg(long)]
    pub max_duration: Option<u32>,

    /// tiny, small, medium or large
    #[arg(long)]
    pub quality: Option<Quality>,

    /// Number of videos to bundle
    #[arg(long)]
    pub count: Option<u32>,

    /// Where to write the archive; defaults to `archive.file_name`
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML (secrets omitted)
    Show,
}
