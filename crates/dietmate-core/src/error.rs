use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A host primitive (display, enumeration, focus, broadcast) failed
    #[error("Host error: {0}")]
    Host(String),
}

impl Error {
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
