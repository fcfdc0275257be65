//! Store abstraction shared by the HTTP client and anything built on top of it
//!
//! [`JsonStore`] covers the four raw operations. The typed helpers are
//! provided methods layered on those, so an implementor only has to move
//! bytes: a `get_raw` body is always the full `{result, ok}` envelope.

use std::future::Future;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::envelope::Envelope;
use crate::error::{Error, Result};

/// A path-addressed JSON document store
///
/// Implemented by [`StoreClient`](crate::StoreClient). Code that only needs
/// store semantics, like [`TodoList`](crate::todos::TodoList), is generic over
/// this trait.
///
/// # Example
/// ```rust,no_run
/// use jsonstore::{JsonStore, Result, StoreClient};
///
/// async fn bump<S: JsonStore>(store: &S) -> Result<u64> {
///     let next = store.get_optional::<u64>("metadata/nextId").await?.unwrap_or(0);
///     store.put("metadata/nextId", &(next + 1)).await?;
///     Ok(next)
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let client = StoreClient::new("your-store-id")?;
///     println!("reserved {}", bump(&client).await?);
///     Ok(())
/// }
/// ```
pub trait JsonStore: Send + Sync {
    /// Read a key and return the response body untouched
    ///
    /// The body is the whole envelope, e.g. `{"result":null,"ok":true}` for an
    /// absent key. Only the status line is checked.
    ///
    /// # Errors
    /// `Error::StoreRequestFailed` for any status other than 200.
    fn get_raw(&self, key: &str) -> impl Future<Output = Result<Bytes>> + Send;

    /// Store pre-serialized JSON at a key with `POST`
    fn post_raw(
        &self,
        key: &str,
        data: impl Into<Bytes>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Overwrite a key with pre-serialized JSON using `PUT`
    fn put_raw(
        &self,
        key: &str,
        data: impl Into<Bytes>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a key
    ///
    /// Succeeds whenever the store acknowledges with `ok: true`, including when
    /// nothing was stored at `key`.
    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send;

    /// Retrieve a value and deserialize it into `T`
    ///
    /// # Errors
    /// `Error::NoValueForKey` when nothing is stored at `key`, which callers
    /// commonly branch on. `Error::StoreReadRejected` when the store answers
    /// with `ok: false`. `Error::Deserialization` when the stored JSON does
    /// not fit `T`.
    ///
    /// # Example
    /// ```rust,no_run
    /// # use jsonstore::{Error, JsonStore, StoreClient};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Error> {
    /// # let client = StoreClient::new("store-id")?;
    /// match client.get::<u64>("metadata/nextId").await {
    ///     Ok(next) => println!("next id: {}", next),
    ///     Err(Error::NoValueForKey(_)) => client.put("metadata/nextId", &0u64).await?,
    ///     Err(e) => return Err(e),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn get<T: DeserializeOwned>(&self, key: &str) -> impl Future<Output = Result<T>> + Send {
        async move {
            let body = self.get_raw(key).await?;
            decode_value(key, &body)
        }
    }

    /// Like [`get`](Self::get), but an absent key is `Ok(None)`
    fn get_optional<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<T>>> + Send {
        async move {
            match self.get(key).await {
                Ok(value) => Ok(Some(value)),
                Err(Error::NoValueForKey(_)) => Ok(None),
                Err(e) => Err(e),
            }
        }
    }

    /// Serialize a value and store it at a key with `POST`
    ///
    /// The store treats this exactly like [`put`](Self::put): an existing value
    /// is overwritten, there is no create-if-absent check.
    fn post<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> impl Future<Output = Result<()>> + Send {
        let data = encode(key, value);
        async move { self.post_raw(key, data?).await }
    }

    /// Serialize a value and overwrite a key with it using `PUT`
    ///
    /// Works on nested keys too, e.g. `todos/3/done`.
    fn put<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> impl Future<Output = Result<()>> + Send {
        let data = encode(key, value);
        async move { self.put_raw(key, data?).await }
    }
}

/// Apply the read rules to a raw envelope body and deserialize its `result`
fn decode_value<T: DeserializeOwned>(key: &str, body: &[u8]) -> Result<T> {
    let value = match Envelope::decode(key, body).and_then(|envelope| envelope.into_value(key)) {
        Ok(value) => value,
        Err(e) => {
            debug!("Read of {} failed: {}", key, e);
            return Err(e);
        }
    };
    serde_json::from_str(value.get()).map_err(|source| Error::Deserialization {
        key: key.to_string(),
        source,
    })
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|source| Error::Serialization {
            key: key.to_string(),
            source,
        })
}
