use thiserror::Error;

use crate::processors::upcast::CastDirection;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Insufficient data: {actual} samples, at least {required} required")]
    InsufficientData { required: usize, actual: usize },

    #[error("No {0} segment found in the depth series")]
    NoCastSegment(CastDirection),

    #[error("No levels match quality-control policy {policy}")]
    NoQualifyingLevels { policy: String },

    #[error("Missing required platform metadata: {0}")]
    MissingMetadata(String),

    #[error("Invalid quality-control policy: {0}")]
    InvalidQcPolicy(String),

    #[error("Invalid WIGOS identifier: '{0}'")]
    InvalidWigosId(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
