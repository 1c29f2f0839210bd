use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid value for field '{field}': {value:?}")]
    Parse { field: &'static str, value: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn parse(field: &'static str, value: &str) -> Self {
        Error::Parse {
            field,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
