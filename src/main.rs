use std::env;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use starchart::data::load_catalog;
use starchart::shell::Shell;
use starchart::CatalogConfig;

const CONFIG_ENV: &str = "STARCHART_CONFIG";
const PROMPT: &str = "scq$ ";

/// Proximity, routing and trilateration queries over a star catalog.
#[derive(Debug, Parser)]
#[command(name = "starchart-query", version)]
struct Cli {
    /// Catalog file with one `name,x,y,z` record per line
    #[arg(short, long)]
    catalog: PathBuf,

    /// JSON catalog configuration (defaults to $STARCHART_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read commands from this file instead of stdin
    script: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config_path = cli
        .config
        .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
    let config = match config_path {
        Some(path) => CatalogConfig::from_path(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => CatalogConfig::default(),
    };
    info!("using {:?}", config);

    let catalog = load_catalog(&cli.catalog, config)
        .with_context(|| format!("failed to load catalog {}", cli.catalog.display()))?;
    let mut shell = Shell::new(catalog);
    let mut stdout = io::stdout().lock();

    match cli.script {
        Some(script) => {
            let file = File::open(&script)
                .with_context(|| format!("failed to open script {}", script.display()))?;
            shell.run(BufReader::new(file), &mut stdout, None)?;
        }
        None => {
            let stdin = io::stdin();
            let prompt = stdin.is_terminal().then_some(PROMPT);
            shell.run(stdin.lock(), &mut stdout, prompt)?;
        }
    }

    Ok(())
}
