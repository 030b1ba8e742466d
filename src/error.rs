use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Missing expected data: {0}")]
    MissingData(String),

    /// The API has no component for the requested id.
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// A `.kicad_sym` file that cannot be merged into, e.g. without its closing paren.
    #[error("Invalid library file: {0}")]
    InvalidLibrary(String),

    #[error("Invalid LCSC ID: {0}")]
    InvalidLcscId(String),

    #[error("Background task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
