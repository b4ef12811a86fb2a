use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Media engine error: {0}")]
    Engine(String),

    #[error("Remote fetch failed with HTTP status {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Returns `true` when the failure came from the network rather than the host.
    pub fn is_network_error(&self) -> bool {
        matches!(self, BridgeError::HttpStatus { .. })
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
