pub mod chart;
pub mod config;
pub mod errors;
pub mod generate;
pub mod history;
pub mod logging;
pub mod models;
pub mod series;
