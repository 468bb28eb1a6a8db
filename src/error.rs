use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Browser automation failed: {0}")]
    Browser(String),

    #[error("Timed out after {waited_ms}ms waiting for {what}")]
    SettleTimeout { what: &'static str, waited_ms: u64 },

    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("Failed to process image: {0}")]
    ProcessingError(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("Request failed: {0}")]
    RequestError(String),

    #[error("Failed to parse page: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Failed to write CSV: {0}")]
    Csv(String),
}

impl From<std::io::Error> for HarvestError {
    fn from(e: std::io::Error) -> Self {
        HarvestError::Io(e.to_string())
    }
}
