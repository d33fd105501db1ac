use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid dataset: {0}")]
    Dataset(String),

    #[error("unknown card: {0}")]
    UnknownCard(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Command(String),
}

pub type Res<T> = Result<T, AdvisorError>;
