//! JSON API client for Rust.
//!
//! Strict JSON decoding, incremental decoding of large array bodies and uniform
//! error classification on top of a hyper-util transport.
//!
//! # Example
//!
//! ```ignore
//! use clasp::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! pub struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! let client = JsonClient::default();
//! let response = client
//!     .get("https://api.example.com/users/42", RequestOptions::default())
//!     .await?;
//! let user: User = response.json_as()?;
//! ```
//!
//! Large array bodies can be decoded element by element. Streamed bodies are
//! read with blocking calls, so move the response to a blocking task:
//!
//! ```ignore
//! let mut response = client
//!     .get(url, RequestOptions::default().stream(true))
//!     .await?;
//! let count = tokio::task::spawn_blocking(move || {
//!     response
//!         .stream_json(StreamOptions::default().skip_outer_array(true))?
//!         .try_fold(0, |count, _event| Ok::<_, clasp::Error>(count + 1))
//! })
//! .await??;
//! ```

mod client;
mod config;
mod connector;
pub mod prelude;
mod stream;
mod transport;

pub use client::{JsonClient, RequestOptions};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use connector::https_connector;
pub use stream::ChannelStream;
pub use transport::HyperTransport;

// Re-export core types
pub use clasp_core::{
    BodyMode, BodyState, BodyStream, Container, Error, Headers, JsonCodec, JsonStream, Logger,
    MemoryStream, Method, ReaderStream, Request, RequestBuilder, Response, Result, Scalar,
    StreamOptions, TracingLogger, Transport, Value, from_json, from_value, type_name,
};

// Re-export http types for status codes and headers
pub use clasp_core::{StatusCode, header};

// Re-export url for building requests
pub use url;
