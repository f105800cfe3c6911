// Error taxonomy shared by every service
// Each error carries a stable machine-readable kind plus a human-readable message

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable, machine-readable error kind sent on the wire.
/// Clients branch on this, never on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    AuthError,
    SessionExpired,
    SessionNotFound,
    WrongPrincipalKind,
    NotOwner,
    NotFound,
    InsufficientQuantity,
    InvalidQuantity,
    ValidationError,
    PartialUpdate,
    ProtocolError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Central error type for all store and service operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketError {
    #[error("invalid credentials")]
    Auth,

    #[error("session has expired")]
    SessionExpired,

    #[error("session not found")]
    SessionNotFound,

    #[error("session belongs to a {actual}, expected a {expected}")]
    WrongPrincipalKind {
        expected: crate::protocol::PrincipalKind,
        actual: crate::protocol::PrincipalKind,
    },

    #[error("{0} is not owned by the requesting seller")]
    NotOwner(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("insufficient quantity: requested {requested}, available {available}")]
    InsufficientQuantity { requested: u64, available: u64 },

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("partial update: {0}")]
    PartialUpdate(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    /// An error decoded from a peer's response; keeps the peer's kind and message verbatim
    #[error("{message}")]
    Remote { kind: ErrorKind, message: String },
}

impl MarketError {
    /// The wire kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MarketError::Auth => ErrorKind::AuthError,
            MarketError::SessionExpired => ErrorKind::SessionExpired,
            MarketError::SessionNotFound => ErrorKind::SessionNotFound,
            MarketError::WrongPrincipalKind { .. } => ErrorKind::WrongPrincipalKind,
            MarketError::NotOwner(_) => ErrorKind::NotOwner,
            MarketError::NotFound(_) => ErrorKind::NotFound,
            MarketError::InsufficientQuantity { .. } => ErrorKind::InsufficientQuantity,
            MarketError::InvalidQuantity(_) => ErrorKind::InvalidQuantity,
            MarketError::Validation(_) => ErrorKind::ValidationError,
            MarketError::PartialUpdate(_) => ErrorKind::PartialUpdate,
            MarketError::Protocol(_) => ErrorKind::ProtocolError,
            MarketError::Remote { kind, .. } => *kind,
        }
    }

    pub fn remote(kind: ErrorKind, message: impl Into<String>) -> Self {
        MarketError::Remote {
            kind,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        MarketError::Protocol(format!("malformed payload: {}", err))
    }
}

impl From<std::io::Error> for MarketError {
    fn from(err: std::io::Error) -> Self {
        MarketError::Protocol(format!("connection failure: {}", err))
    }
}

pub type MarketResult<T> = Result<T, MarketError>;
