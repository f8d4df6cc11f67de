use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Retrieval was attempted against an index that was never fitted or was
    /// fitted over zero chunks.
    #[error("Knowledge base is not indexed")]
    NotIndexed,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown {kind}: {value}")]
    UnknownEntity { kind: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
