use thiserror::Error;

use herald_types::UnknownSourceKind;

/// Failure reported by the transport collaborator. Never retried here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection closed")]
    ConnectionClosed,

    #[error("request timed out")]
    Timeout,

    #[error("server error {code}: {text}")]
    Server { code: u16, text: String },

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum NewsletterError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Reply arrived but lacks a child, attribute or JSON field it must carry.
    #[error("malformed reply: {0}")]
    MalformedReply(String),

    /// Embedded payload is not UTF-8 JSON.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Rejected before anything was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("picture derivation failed: {0}")]
    Picture(String),
}

impl NewsletterError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedReply(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<UnknownSourceKind> for NewsletterError {
    fn from(e: UnknownSourceKind) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NewsletterError>;
