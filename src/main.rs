//! coaweb main entry point

use coaweb_api::start_server;
use coaweb_config::{Config, ConfigErrorSeverity};
use coaweb_core::AccountBook;
use coaweb_import::FileAccountSource;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "coaweb")]
#[command(version = "0.1.0")]
#[command(about = "Chart-of-accounts viewer with budget vs realisasi tracking", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn init_logger(level: &str) {
    // RUST_LOG wins over the config file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = match Config::load(args.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            init_logger("info");
            match e.severity() {
                ConfigErrorSeverity::Warning => log::warn!("{}", e.to_details()),
                ConfigErrorSeverity::Error => log::error!("{}", e.to_details()),
            }
            return Err(e.into());
        }
    };
    init_logger(&config.logging.level);

    log::info!(
        "Config loaded: data path={}, entities={}",
        config.data.path.display(),
        config.data.entities.len()
    );

    let rt = Runtime::new()?;
    rt.block_on(async {
        let book = Arc::new(AccountBook::new(config.clone(), Arc::new(FileAccountSource)));

        if config.data.load_on_start {
            let summary = book.reload().await;
            log::info!(
                "Initial load: {} entities loaded, {} failed",
                summary.loaded.len(),
                summary.failed.len()
            );
        } else {
            log::info!("Skipping initial load; POST /api/reload to load entities");
        }

        start_server(config, book).await
    })?;

    Ok(())
}
