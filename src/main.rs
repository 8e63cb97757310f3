use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use loushu::cli::{self, EntityKind};
use loushu::config::{Config, FlatConfig};
use loushu::media::MediaKind;

#[derive(Parser, Debug)]
#[command(name = "loushu", about = "Listing manager client: media uploads and Excel bulk import")]
struct Cli {
    #[command(flatten)]
    config: FlatConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import records from an Excel workbook
    Import {
        #[arg(value_enum)]
        entity: EntityKind,
        file: PathBuf,
    },
    /// Write an empty import template
    Template {
        #[arg(value_enum)]
        entity: EntityKind,
        out: PathBuf,
    },
    /// Upload media files and print the resulting refs
    Upload {
        #[arg(value_enum)]
        kind: MediaKind,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Cli::parse();
    let config: Config = args.config.into();

    match args.command {
        Command::Import { entity, file } => cli::run_import(config, entity, &file).await,
        Command::Template { entity, out } => cli::run_template(entity, &out),
        Command::Upload { kind, files } => cli::run_upload(config, kind, &files).await,
    }
}
