use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("detection interval must be >= 1")]
    InvalidInterval,
    #[error("detector failed to initialize: {0}")]
    Init(String),
    #[error("detector worker has stopped")]
    WorkerDisconnected,
    #[error("detector panicked: {0}")]
    Panicked(String),
    #[error("failed to read detection script {path}: {source}")]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid detection script: {0}")]
    ScriptParse(#[source] serde_json::Error),
}
