use thiserror::Error;

/// Coarse classification of an [`S3Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or incomplete client configuration
    Config,
    /// Malformed call-time arguments
    Validation,
    /// Object key sanitizing / derivation produced an invalid key
    Key,
    /// The store answered with a non-success status
    Transport,
    /// Any failure from an underlying library (IO, HTTP client, formatting, ...)
    Internal,
}

#[derive(Error, Debug)]
pub enum S3Error {
    #[error("config: {0}")]
    Config(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("key: {0}")]
    Key(String),
    #[error("Got HTTP {status} {status_text} with content '{message}'")]
    Transport {
        status: u16,
        status_text: String,
        message: String,
        /// The `<Code>` of an S3 XML error body, if the store sent one
        code: Option<String>,
    },
    #[error("env var missing: {0}")]
    EnvVarMissing(#[from] std::env::VarError),
    #[error("sha2 invalid length: {0}")]
    HmacInvalidLength(#[from] sha2::digest::InvalidLength),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("request: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("serde json: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Time format error: {0}")]
    TimeFormatError(#[from] time::error::Format),
    #[error("url parse: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl S3Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            S3Error::Config(_) | S3Error::EnvVarMissing(_) => ErrorKind::Config,
            S3Error::Validation(_) => ErrorKind::Validation,
            S3Error::Key(_) => ErrorKind::Key,
            S3Error::Transport { .. } => ErrorKind::Transport,
            _ => ErrorKind::Internal,
        }
    }

    /// HTTP status of a transport failure
    pub fn status(&self) -> Option<u16> {
        match self {
            S3Error::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}
