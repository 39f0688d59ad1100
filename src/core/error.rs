use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid timestamp '{0}': {1}")]
    InvalidTimestamp(String, String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<serde_yaml::Error> for StoreError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
