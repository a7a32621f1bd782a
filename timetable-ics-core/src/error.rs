use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet reading failed: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Spreadsheet contains no rows")]
    EmptyGrid,

    #[error("ICS generation failed: {0}")]
    IcsGeneration(String),

    #[error("ICS parsing failed: {0}")]
    IcsParse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
