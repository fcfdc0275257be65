//! Error types for the JSON store client

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to the store
#[derive(Error, Debug)]
pub enum Error {
    /// The request never produced a usable response (DNS, connect, body read, timeout)
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The store answered with a status the protocol treats as failure
    #[error("Store request for '{key}' failed with status {status}")]
    StoreRequestFailed {
        /// Key path the request addressed
        key: String,
        /// HTTP status code
        status: u16,
    },

    /// The response body is not a `{result, ok}` envelope
    #[error("Malformed envelope for '{key}': {source}")]
    MalformedEnvelope {
        /// Key path the request addressed
        key: String,
        /// Decoder failure
        #[source]
        source: serde_json::Error,
    },

    /// The store holds no value at this key (`result` was null)
    #[error("No value for key '{0}'")]
    NoValueForKey(String),

    /// The store acknowledged a write with `ok: false`
    #[error("Store rejected write to '{0}'")]
    StoreWriteRejected(String),

    /// The store answered a read with `ok: false`
    #[error("Store rejected read of '{0}'")]
    StoreReadRejected(String),

    /// The caller's value could not be encoded as JSON
    #[error("Failed to serialize value for '{key}': {source}")]
    Serialization {
        /// Key path the value was destined for
        key: String,
        /// Encoder failure
        #[source]
        source: serde_json::Error,
    },

    /// The stored value does not have the shape the caller asked for
    #[error("Failed to deserialize value at '{key}': {source}")]
    Deserialization {
        /// Key path the value was read from
        key: String,
        /// Decoder failure
        #[source]
        source: serde_json::Error,
    },

    /// Endpoint or request URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP request could not be assembled
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Client or application configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failures below the store protocol, in the HTTP transport itself
#[derive(Error, Debug)]
pub enum TransportError {
    /// The exchange did not complete within the configured bound
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Connecting or sending the request failed
    #[error("request failed: {0}")]
    Connect(#[source] hyper_util::client::legacy::Error),

    /// Reading the response body failed
    #[error("failed to read response body: {0}")]
    Body(#[source] hyper::Error),
}

impl Error {
    /// True when the store reported that the key holds no value.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NoValueForKey(_))
    }

    /// True when the exchange was cut off by the request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport(TransportError::Timeout(_)))
    }

    /// HTTP status of a failed store request, if that is what this error is.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::StoreRequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;
