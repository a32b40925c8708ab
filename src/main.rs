use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

use tsi::core::config;
use tsi::tui;

#[derive(Parser)]
#[command(name = "tsi", about = "Terminal client for the TSI question-answering service")]
struct Args {
    /// Service base URL (overrides TSI_BASE_URL and the config file)
    #[arg(short, long)]
    url: Option<String>,

    /// Log verbosity written to tsi.log (off, error, warn, info, debug, trace)
    #[arg(long, default_value_t = LevelFilter::Debug)]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to tsi.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("tsi.log") {
        let _ = WriteLogger::init(args.log_level, log_config, log_file);
    }

    // The terminal is about to be taken over, so a bad config file is
    // reported in the title bar instead of on stderr
    let (file_config, notice) = match config::load_config() {
        Ok(c) => (c, None),
        Err(e) => {
            log::warn!("Ignoring config file: {}", e);
            (config::TsiConfig::default(), Some(format!("Config ignored: {e}")))
        }
    };
    let resolved = config::resolve(&file_config, args.url.as_deref());

    log::info!(
        "TSI assistant starting up against {}{}",
        resolved.base_url,
        resolved.endpoint
    );

    tui::run(resolved, notice)
}
