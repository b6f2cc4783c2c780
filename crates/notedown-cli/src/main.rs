//! notedown CLI
//!
//! Exports a Notion page tree or database to Markdown files plus a JSON
//! metadata index. Configuration comes from the config file and
//! NOTEDOWN_* environment variables; command-line flags override both.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use notedown_core::{parse_id_list, Config, ExportRun, NotionClient};

mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "notedown")]
#[command(about = "Export Notion pages to Markdown")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/notedown/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Notion integration token
    #[arg(long)]
    token: Option<String>,

    /// Database to export
    #[arg(long)]
    database_id: Option<String>,

    /// Comma-separated page IDs (parent page, or explicit list)
    #[arg(long)]
    page_ids: Option<String>,

    /// Directory for exported Markdown files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Directory for downloaded images
    #[arg(long)]
    images_dir: Option<PathBuf>,

    /// Path of the JSON metadata index
    #[arg(long)]
    metadata_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "notedown_core={},notedown_cli={}",
            log_level, log_level
        ))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Command-line flags override config file and environment values
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(token) = &cli.token {
        config.token = Some(token.clone());
    }
    if let Some(database_id) = &cli.database_id {
        config.database_id = Some(database_id.clone());
    }
    if let Some(page_ids) = &cli.page_ids {
        config.page_ids = parse_id_list(page_ids);
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(images_dir) = &cli.images_dir {
        config.images_dir = images_dir.clone();
    }
    if let Some(metadata_file) = &cli.metadata_file {
        config.metadata_file = metadata_file.clone();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::load()?,
    };
    apply_cli_overrides(&mut config, &cli);
    config.validate()?;

    let client = NotionClient::new(
        config
            .token
            .clone()
            .expect("validated config always has a token"),
    )?
    .with_base_url(config.api_base_url.clone());

    let summary = ExportRun::new(config.clone(), client).execute().await?;
    output.print_summary(&summary, &config);

    Ok(())
}
