use thiserror::Error;

use crate::types::TrackId;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Track not found in registry: {0}")]
    TrackNotFound(TrackId),

    #[error("Invalid classifier model: {0}")]
    InvalidModel(String),

    #[error("Unable to read classifier model: {0}")]
    ModelIo(#[from] std::io::Error),

    #[error("Malformed classifier model: {0}")]
    ModelFormat(#[from] serde_json::Error),
}
