use thiserror::Error;

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    /// Malformed or missing required input
    #[error("Validation error: {0}")]
    Validation(String),

    /// The parameter table cannot be resolved
    #[error("Structural error: {0}")]
    Structural(String),

    /// A value is not of the kind an encoder/decoder requires
    #[error("Type error: {0}")]
    Type(String),

    /// Unsupported unit family
    #[error("Unit error: {0}")]
    Unit(String),

    /// Failure reported by the host document
    #[error("Document error: {0}")]
    Host(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}
