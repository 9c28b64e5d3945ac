use thiserror::Error;

use crate::parser::ParseError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("invalid board name: {0:?} is reserved")]
    InvalidBoardName(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
