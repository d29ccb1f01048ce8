use thiserror::Error;

/// Failure reported by a transport implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unknown action {0:?}")]
    UnknownAction(String),
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("can't read <{element}>: {message}")]
    Unmarshal { element: String, message: String },
    /// An error document returned by the service.
    #[error("{code}: {message}")]
    Service {
        code: String,
        message: String,
        request_id: Option<String>,
        status: Option<u16>,
    },
    /// A non-success response without a readable error document.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16, body: String },
    #[error(transparent)]
    Http(#[from] http::Error),
    #[error("transport failed: {0}")]
    Transport(#[source] TransportError),
}

impl Error {
    /// Service error code, when the service sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Service { code, .. } => Some(code),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
