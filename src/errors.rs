//! Metadata Dissemination Error Hierarchy
//!
//! Defines error types for the leadership metadata dissemination engine,
//! categorized by infrastructure layer and protocol concerns.

use std::time::Duration;

use config::ConfigError;
use tokio::task::JoinError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Infrastructure-level failures (network, serialization)
    #[error(transparent)]
    System(#[from] SystemError),

    /// Configuration loading failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration validation failures
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Dissemination protocol failures
    #[error(transparent)]
    Dissemination(#[from] DisseminationError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    // Network layer
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Disk I/O failures (log files, config files)
    #[error(transparent)]
    Io(#[from] std::io::Error),

    // Basic node operations
    #[error("Node failed to start: {0}")]
    NodeStartFailed(String),

    #[error("General server error: {0}")]
    GeneralServer(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Endpoint unavailable (HTTP 503 equivalent)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Peer communication timeout
    #[error("Request timeout to {node_id} after {duration:?}")]
    Timeout { node_id: u32, duration: Duration },

    /// Persistent connection failures
    #[error("Socket connect failed: {0}")]
    ConnectError(String),

    /// Malformed node addresses
    #[error("Invalid URI format: {0}")]
    InvalidURI(String),

    /// Target node missing from the broker table
    #[error("No address known for node {node_id}")]
    UnknownPeer { node_id: u32 },

    /// gRPC transport layer errors
    #[error(transparent)]
    TonicError(#[from] Box<tonic::transport::Error>),

    /// gRPC status code errors
    #[error(transparent)]
    TonicStatusError(#[from] Box<tonic::Status>),

    /// Background task failed
    #[error("Background task failed: {0}")]
    TaskFailed(#[from] JoinError),

    #[error("{0}")]
    SignalSendFailed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DisseminationError {
    /// Startup metadata pull ran out of candidates without a single success
    #[error("Leadership metadata bootstrap exhausted after {attempted} candidate(s)")]
    BootstrapExhausted { attempted: usize },

    /// The receiver acknowledged the batch with an application-level rejection
    #[error("Leadership update rejected by node {node_id}")]
    UpdateRejected { node_id: u32 },

    /// The consensus-layer subscription channel closed unexpectedly
    #[error("Leadership notification subscription closed")]
    SubscriptionClosed,

    /// Operation interrupted by service shutdown
    #[error("Dissemination service is shutting down")]
    ShuttingDown,
}

// ============== Conversion Implementations ============== //
impl From<NetworkError> for Error {
    fn from(e: NetworkError) -> Self {
        Error::System(SystemError::Network(e))
    }
}

impl From<tonic::transport::Error> for Error {
    fn from(err: tonic::transport::Error) -> Self {
        NetworkError::TonicError(Box::new(err)).into()
    }
}

impl From<tonic::Status> for Error {
    fn from(status: tonic::Status) -> Self {
        NetworkError::TonicStatusError(Box::new(status)).into()
    }
}

impl From<JoinError> for Error {
    fn from(err: JoinError) -> Self {
        NetworkError::TaskFailed(err).into()
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::System(SystemError::Io(err))
    }
}
