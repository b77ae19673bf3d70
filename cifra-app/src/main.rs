use anyhow::Result;
use cifra_common::observability::init_logging;
use cifra_config::{CifraConfig, CifraConfigLoader, SourceKind};
use cifra_extract::SinkFormat;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod browse;
mod commands;
mod wiring;

use commands::Ctx;

/// Find chord sheets, strip tablature noise, and save them.
#[derive(Parser, Debug)]
#[command(name = "cifra", version)]
struct Cli {
    /// Config file (YAML); defaults to ./cifra.yaml and the user config dir
    #[arg(short, long, global = true, env = "CIFRA_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for saved sheets
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,

    /// Artifact format: chords or json
    #[arg(long, global = true)]
    format: Option<SinkFormat>,

    /// How pages are loaded
    #[arg(long, global = true, value_enum)]
    source: Option<SourceArg>,

    /// Print the sheet without saving it
    #[arg(long, global = true)]
    print_only: bool,

    /// Mirror debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SourceArg {
    Direct,
    Browser,
}

impl From<SourceArg> for SourceKind {
    fn from(s: SourceArg) -> Self {
        match s {
            SourceArg::Direct => SourceKind::Direct,
            SourceArg::Browser => SourceKind::Browser,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List candidate chord pages for a query
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Load a chord page (URL, or a query resolved by search), clean and save it
    Fetch { url: String },
    /// Search and fetch one of the candidates
    Find {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Candidate to fetch, 1-based
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        pick: u16,
    },
    /// Run the extractor on a saved HTML page
    Extract {
        file: PathBuf,
        /// Source URL recorded in the artifact
        #[arg(long)]
        url: Option<String>,
    },
    /// Print a saved .chords or .json artifact
    Show { file: PathBuf },
    /// Drive a browser interactively and extract the page it shows
    Browse { url: Option<String> },
    /// Print the effective configuration
    Config,
}

fn load_config(cli: &Cli) -> Result<CifraConfig> {
    let loader = match &cli.config {
        Some(path) => CifraConfigLoader::new().with_file(path),
        None => CifraConfigLoader::new().with_default_files(),
    };
    let mut cfg = loader.load()?;

    // Command-line flags win over files and environment.
    if let Some(dir) = &cli.out_dir {
        cfg.output.dir = dir.to_string_lossy().into_owned();
    }
    if let Some(format) = cli.format {
        cfg.output.format = format.to_string();
    }
    if let Some(source) = cli.source {
        cfg.source = source.into();
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(&cli)?;

    let log_path = init_logging(wiring::log_config(&cfg, cli.verbose)?)?;
    tracing::debug!(log = %log_path.display(), source = ?cfg.source, "cifra.start");

    let ctx = Ctx {
        cfg,
        print_only: cli.print_only,
    };
    let mut out = std::io::stdout().lock();

    match &cli.command {
        Command::Search { query } => commands::search(&ctx, &query.join(" "), &mut out).await,
        Command::Fetch { url } => commands::fetch(&ctx, url, &mut out).await,
        Command::Find { query, pick } => {
            commands::find(&ctx, &query.join(" "), usize::from(*pick), &mut out).await
        }
        Command::Extract { file, url } => {
            commands::extract_file(&ctx, file, url.as_deref(), &mut out)
        }
        Command::Show { file } => commands::show(file, &mut out),
        Command::Browse { url } => {
            drop(out);
            browse::run(&ctx, url.as_deref()).await
        }
        Command::Config => commands::config(&ctx, &mut out),
    }
}
