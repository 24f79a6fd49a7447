use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load data: {0}")]
    DataLoad(String),

    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Index inconsistency: {0}")]
    IndexInconsistency(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Description generation failed: {0}")]
    Generation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
