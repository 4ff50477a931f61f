use anyhow::Result;
use chrono::Local;
use clap::Parser;
use weather_chart::config::{Config, LOG_LEVEL};
use weather_chart::generate::generate_chart;
use weather_chart::logging::setup_logger;

fn main() -> Result<()> {
    let config = Config::parse();

    if let Err(e) = setup_logger(LOG_LEVEL) {
        eprintln!("Running without logging: {}", e);
    }

    generate_chart(&config, Local::now().naive_local())?;

    Ok(())
}
