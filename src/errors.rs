use std::path::PathBuf;
use thiserror::Error;

/// Reasons a single snapshot file is left out of the history
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("error reading snapshot file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed snapshot document: {0}")]
    Document(#[from] serde_json::Error),
    #[error("snapshot document has no live observation")]
    NoLiveObservation,
}

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("error serializing chart data: {0}")]
    Data(#[from] serde_json::Error),
    #[error("error writing chart to '{}'", .0.display())]
    Write(PathBuf, #[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("invalid logger configuration: {0}")]
    Config(#[from] log4rs::config::runtime::ConfigErrors),
    #[error("logger already installed: {0}")]
    SetLogger(#[from] log::SetLoggerError),
}
