use dom::DomError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InspectorError {
    #[error("Extraction failed: {0}")]
    Dom(#[from] DomError),

    #[error("No document has been published yet")]
    NoDocument,

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Unknown fetch generation {0}")]
    UnknownGeneration(u64),
}

pub type Result<T> = std::result::Result<T, InspectorError>;
