use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("snapshot parse error: {0}")]
    SnapshotParse(String),

    #[error("conflicting records for initiative {0} in snapshot")]
    SnapshotConflict(u64),

    #[error("top-n must be a positive integer (got {0})")]
    InvalidTopN(usize),

    #[error("top-k must be a positive integer (got {0})")]
    InvalidTopK(usize),

    #[error("unknown lens: {0}")]
    UnknownLens(String),

    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScoutError {
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            ScoutError::Config(_) | ScoutError::ConfigParse(_) | ScoutError::Toml(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
