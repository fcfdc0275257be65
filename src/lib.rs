//! An async client for path-addressed JSON document stores such as jsonstore.io
//!
//! The store exposes a hierarchical namespace of JSON documents over HTTP.
//! Every response is wrapped in a `{"result": ..., "ok": ...}` envelope, and a
//! missing key is reported as `result: null` inside a 200 response rather than
//! as a 404. This crate hides that protocol behind a small typed API.
//!
//! # Features
//! - Typed and raw get / post / put / delete on slash-delimited key paths
//! - A [`JsonStore`] trait over the raw operations, so callers can be generic
//!   over the backing store
//! - Distinct error kinds for absent keys, store rejections and transport failures
//! - Connection pooling, HTTP/1.1 and HTTP/2, TLS via rustls
//! - Bounded request timeout on every exchange
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jsonstore::{Error, JsonStore, StoreClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let client = StoreClient::new("your-store-id")?;
//!
//!     client.put("settings/theme", "dark").await?;
//!
//!     let theme: String = client.get("settings/theme").await?;
//!     println!("Theme: {}", theme);
//!
//!     match client.get::<String>("settings/missing").await {
//!         Err(Error::NoValueForKey(key)) => println!("nothing at {}", key),
//!         other => println!("{:?}", other),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod path;
pub mod store;
pub mod todos;

pub use client::{ClientConfig, StoreClient};
pub use config::Config;
pub use envelope::{Envelope, Operation};
pub use error::{Error, Result, TransportError};
pub use store::JsonStore;
