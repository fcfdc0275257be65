//! The `{result, ok}` response envelope and outcome classification
//!
//! Every store response wraps its payload in an envelope. Classification runs in
//! a fixed order:
//!
//! 1. HTTP status: `>= 400` always fails, reads additionally fail on anything but `200`.
//! 2. Envelope decode: a body that is not an envelope is a protocol error.
//! 3. Store verdict: reads check `result == null` (no value) before `ok == false`
//!    (rejected); writes only look at `ok`.

use hyper::{Method, StatusCode};
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::{Error, Result};

/// Kind of store operation, which decides how a response is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `GET`, read a value
    Get,
    /// `POST`, store a value
    Create,
    /// `PUT`, overwrite a value
    Replace,
    /// `DELETE`, remove a value
    Delete,
}

impl Operation {
    /// HTTP method the store expects for this operation
    pub fn method(self) -> Method {
        match self {
            Operation::Get => Method::GET,
            Operation::Create => Method::POST,
            Operation::Replace => Method::PUT,
            Operation::Delete => Method::DELETE,
        }
    }

    /// Whether this operation mutates the store
    pub fn is_write(self) -> bool {
        !matches!(self, Operation::Get)
    }
}

/// Response wrapper returned by every store operation
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Stored value as undecoded JSON; `None` when absent or `null`
    #[serde(default)]
    pub result: Option<Box<RawValue>>,
    /// Store-reported success
    #[serde(default)]
    pub ok: bool,
}

impl Envelope {
    /// Decode an envelope from a response body.
    pub fn decode(key: &str, body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|source| Error::MalformedEnvelope {
            key: key.to_string(),
            source,
        })
    }

    /// Apply the read rules and hand back the stored value.
    pub fn into_value(self, key: &str) -> Result<Box<RawValue>> {
        match self.result {
            None => Err(Error::NoValueForKey(key.to_string())),
            Some(_) if !self.ok => Err(Error::StoreReadRejected(key.to_string())),
            Some(value) => Ok(value),
        }
    }

    /// Apply the write rules.
    pub fn into_ack(self, key: &str) -> Result<()> {
        if self.ok {
            Ok(())
        } else {
            Err(Error::StoreWriteRejected(key.to_string()))
        }
    }
}

/// Reject statuses the protocol treats as failure, before the body is looked at.
pub fn check_status(op: Operation, key: &str, status: StatusCode) -> Result<()> {
    let failed = if op.is_write() {
        status.is_client_error() || status.is_server_error()
    } else {
        status != StatusCode::OK
    };

    if failed {
        return Err(Error::StoreRequestFailed {
            key: key.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(())
}
