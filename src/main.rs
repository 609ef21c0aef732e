// src/main.rs
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sheet_ticker::cloud_handler::SHEETS_API;
use sheet_ticker::{
    CloudHandler, ConfigWatcher, Result, Runtime, RuntimeHandle, TerminalPresenter, TickerConfig,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug, Clone)]
#[command(name = "sheet-ticker")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file; reloaded when it changes
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Google API key
    #[arg(short = 'k', long = "api-key", value_name = "KEY")]
    api_key: Option<String>,

    /// Spreadsheet id
    #[arg(short = 's', long = "sheet-id", value_name = "ID")]
    sheet_id: Option<String>,

    /// Seconds between fetches
    #[arg(long = "fetch-interval", value_name = "SECONDS")]
    fetch_interval: Option<f64>,

    /// Seconds each entry stays on screen
    #[arg(long = "roll-interval", value_name = "SECONDS")]
    roll_interval: Option<f64>,

    /// Base URL of the spreadsheets values API
    #[arg(long = "endpoint", value_name = "URL", default_value = SHEETS_API)]
    endpoint: String,

    /// Seconds between checks of the config file
    #[arg(long = "watch-interval", value_name = "SECONDS", default_value = "5")]
    watch_interval: u64,

    /// Log verbosity: 0 = warn, 1 = info, 2 = debug, 3 = trace
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,
}

impl Args {
    fn load_config(&self) -> Result<TickerConfig> {
        let mut config = match &self.config {
            Some(path) => TickerConfig::parse_from_path(path)?,
            None => TickerConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    // Flags win over the file, on start and on every reload.
    fn apply_overrides(&self, config: &mut TickerConfig) {
        if let Some(key) = &self.api_key {
            config.access_key = key.clone();
        }
        if let Some(id) = &self.sheet_id {
            config.source_id = id.clone();
        }
        if let Some(seconds) = self.fetch_interval {
            config.fetch_interval_seconds = seconds;
        }
        if let Some(seconds) = self.roll_interval {
            config.rotation_interval_seconds = seconds;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let log_level = match args.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    log::info!("Sheet Ticker v{VERSION}");

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };
    if !config.has_source() {
        log::warn!("No API key or sheet id given; nothing will be fetched");
    }

    let source = Arc::new(CloudHandler::with_endpoint(args.endpoint.clone()));
    let runtime = Runtime::new(config, source, TerminalPresenter::stdout());
    let handle = runtime.handle();

    if let Some(path) = args.config.clone() {
        tokio::spawn(watch_config(args.clone(), ConfigWatcher::new(path), handle.clone()));
    }
    tokio::spawn(shutdown_on_ctrl_c(handle));

    runtime.run().await;
}

async fn watch_config(args: Args, mut watcher: ConfigWatcher, handle: RuntimeHandle) {
    let mut interval = tokio::time::interval(Duration::from_secs(args.watch_interval.max(1)));
    loop {
        interval.tick().await;
        match watcher.poll() {
            Ok(Some(mut config)) => {
                args.apply_overrides(&mut config);
                if let Err(e) = config.validate() {
                    log::warn!("Ignoring {}: {e}", watcher.path().display());
                    continue;
                }
                log::info!("Reloaded {}", watcher.path().display());
                if !handle.reconfigure(config) {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("Ignoring {}: {e}", watcher.path().display()),
        }
    }
}

async fn shutdown_on_ctrl_c(handle: RuntimeHandle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Cannot listen for Ctrl-C: {e}");
        return;
    }
    handle.shutdown();
}
