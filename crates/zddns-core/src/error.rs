//! Error types for the zddns system.
//!
//! Every call site sees the failure mode as an explicit variant: a missing
//! record, a transport failure, and a credential rejection are three
//! different things and the engine handles each differently.

use thiserror::Error;

/// Result type alias for zddns operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the zddns system.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure or non-2xx response from a one-shot
    /// collaborator (IP resolver, purge client).
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response from the DNS provider.
    #[error("provider error (status {status}): {body}")]
    Provider {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Response body, for the operator's eyes.
        body: String,
    },

    /// HTTP 401 from the DNS provider. Credentials do not self-heal,
    /// so the engine escalates this to process termination.
    #[error("invalid provider credentials (HTTP 401)")]
    Unauthorized,

    /// A configured (domain, record name) pair has no matching record
    /// at the provider.
    #[error("no A record named {record} in zone {domain}")]
    RecordNotFound {
        /// Zone that was searched.
        domain: String,
        /// Record name that was not found.
        record: String,
    },

    /// The provider answered successfully with a body we could not
    /// make sense of.
    #[error("unexpected provider response: {0}")]
    UnexpectedResponse(String),

    /// Configuration errors (startup only).
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a provider error from a response status and body.
    pub fn provider(status: u16, body: impl Into<String>) -> Self {
        Self::Provider {
            status,
            body: body.into(),
        }
    }

    /// Create a "record not found" error.
    pub fn record_not_found(domain: impl Into<String>, record: impl Into<String>) -> Self {
        Self::RecordNotFound {
            domain: domain.into(),
            record: record.into(),
        }
    }

    /// Create an unexpected-response error.
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::UnexpectedResponse(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error must terminate the process rather than just the
    /// current iteration.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
