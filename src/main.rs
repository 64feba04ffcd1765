use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use climate_api::{
    ClimateApiConfig, ClimateRepository, MemoryRepository, QueryService, SqliteRepository,
    telemetry, web,
};

#[derive(Parser, Debug)]
#[command(name = "climate-api")]
#[command(about = "Serve precipitation and temperature views over a station observation database")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database holding the station and measurement tables
    #[arg(short, long)]
    database: Option<String>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Load the whole dataset into memory at startup
    #[arg(long)]
    preload: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(&self, config: &mut ClimateApiConfig) {
        if let Some(database) = &self.database {
            config.database.path.clone_from(database);
        }
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.preload {
            config.database.preload = true;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(error) = run(args).await {
        eprintln!("Error: {error:#}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = ClimateApiConfig::load_from_path(args.config.clone())?;
    args.apply(&mut config);
    config.validate()?;

    telemetry::init(&config.logging)?;

    let sqlite = SqliteRepository::open(&config.database.path, config.database.max_connections)
        .await
        .context("Observation database is unavailable")?;

    let repository: Arc<dyn ClimateRepository> = if config.database.preload {
        let memory = MemoryRepository::load(&sqlite).await?;
        sqlite.close().await;
        Arc::new(memory)
    } else {
        Arc::new(sqlite)
    };

    let service = Arc::new(QueryService::new(repository));
    service.describe_dataset().await?;

    web::run(&config.server, service).await
}
