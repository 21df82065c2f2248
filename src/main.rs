mod cli;

use clap::Parser;
use cli::{Cli, Commands, ConfigCommand, FetchArgs};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vidbundle::api;
use vidbundle::config::Config;
use vidbundle::pipeline::Pipeline;
use vidbundle::progress::TracingProgress;
use vidbundle::search::SearchCriteria;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Serve(args) => api::run(config, args.address).await?,
        Commands::Fetch(args) => fetch(config, args).await?,
        Commands::Config(ConfigCommand::Show) => print!("{}", config.to_toml()?),
    }

    Ok(())
}

async fn fetch(config: Config, args: FetchArgs) -> Result<(), AnyError> {
    let defaults = &config.form;
    let count = args.count.unwrap_or(defaults.count);
    if count > defaults.max_count {
        return Err(format!(
            "count {count} exceeds the configured maximum of {}",
            defaults.max_count
        )
        .into());
    }

    let criteria = SearchCriteria::builder()
        .keyword(args.keyword.unwrap_or_else(|| defaults.keyword.clone()))
        .min_duration(args.min_duration.unwrap_or(defaults.min_duration))
        .max_duration(args.max_duration.unwrap_or(defaults.max_duration))
        .quality(args.quality.unwrap_or(defaults.quality))
        .count(count)
        .build()?;

    let pipeline = Pipeline::from_config(&config)?;
    let outcome = pipeline.run(&criteria, &mut TracingProgress::new()).await?;

    let Some(archive) = outcome.archive else {
        if let Some(warning) = outcome.report.warning {
            warn!("{warning}");
        }
        return Ok(());
    };

    let output = args
        .output
        .unwrap_or_else(|| archive.file_name.clone().into());
    tokio::fs::write(&output, &archive.content).await?;

    info!(
        path = %output.display(),
        videos = archive.entries.len(),
        failed = outcome.report.failures.len(),
        "Archive written"
    );

    Ok(())
}
