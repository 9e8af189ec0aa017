use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The news search API answered with a non-success status.
    #[error("Upstream request failed with status {status}: {body}")]
    UpstreamRequestFailed { status: u16, body: String },

    /// The news search API could not be reached, or the transfer broke off.
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(reqwest::Error),

    /// The gateway could not be reached at all.
    #[error("Gateway unreachable: {0}")]
    GatewayUnreachable(#[from] reqwest::Error),

    /// The gateway answered, but with a non-success status.
    #[error("Gateway returned status {status}: {message}")]
    GatewayStatus { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::UpstreamRequestFailed { status, .. } | Error::GatewayStatus { status, .. } => {
                Some(*status)
            }
            Error::UpstreamUnreachable(e) | Error::GatewayUnreachable(e) => {
                e.status().map(|s| s.as_u16())
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
