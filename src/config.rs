use std::path::PathBuf;
use clap::Parser;
use log::LevelFilter;

/// Log level used for the console logger
pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Command line configuration
#[derive(Parser, Debug)]
#[command(name = "weather-chart", version)]
#[command(about = "Generate chart.html from weather_history JSON files")]
pub struct Config {
    /// Directory containing JSON history files
    #[arg(long, default_value = "weather_history")]
    pub input_dir: PathBuf,

    /// Output HTML file path
    #[arg(long, default_value = "chart.html")]
    pub output: PathBuf,
}
