use thiserror::Error;

#[derive(Error, Debug)]
pub enum KvsError {
    #[error("Key value commands with server are not currently supported.")]
    /// Backend is the self-hosted server, which has no key value store.
    UnsupportedBackend,
    #[error("Invalid backend '{0}', expected one of: cloud, server")]
    Parse(String),
    #[error("Import document must be a JSON object")]
    NotAMapping,
    #[error("Remote error: {0}")]
    Remote(String),
    #[error("Unexpected response for {0}")]
    UnexpectedResponse(&'static str),
}

impl KvsError {
    /// Usage errors exit the same way clap reports bad arguments.
    pub fn is_usage(&self) -> bool {
        matches!(self, KvsError::UnsupportedBackend)
    }
}

pub type Result<T> = std::result::Result<T, anyhow::Error>;
