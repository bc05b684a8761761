use thiserror::Error;

use super::user::UserId;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("User {0} not found")]
    NotFound(UserId),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl StoreError {
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(format!("document encoding failed: {err}"))
    }
}
