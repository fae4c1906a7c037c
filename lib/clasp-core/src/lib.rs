//! Core types for the clasp JSON-over-HTTP client.
//!
//! This crate is synchronous and transport-agnostic:
//! - [`JsonCodec`] - JSON encoding, decoding and shape guards
//! - [`JsonStream`] and [`StreamOptions`] - incremental decoding of a body stream
//! - [`Response`] - HTTP response envelope with cached or streamed body access
//! - [`BodyStream`] - the byte source behind a response
//! - [`Headers`] - case-normalized, multi-value headers
//! - [`Logger`] - optional warning sink
//! - [`Request`] and [`RequestBuilder`] - HTTP request types
//! - [`Transport`] - the trait a transport implements
//! - [`Error`] and [`Result`] - Error handling
//! - [`Method`], [`StatusCode`] and [`header`] (re-exported from `http` crate)

mod client;
mod decoder;
mod error;
mod headers;
mod json;
mod logger;
pub mod prelude;
mod request;
mod response;
mod scan;
mod stream;

pub use client::{BodyMode, Transport};
pub use decoder::{JsonStream, StreamOptions};
pub use error::{Error, Result};
pub use headers::Headers;
pub use json::{Container, JsonCodec, Scalar, from_json, from_value, type_name};
pub use logger::{Logger, TracingLogger};
pub use request::{Request, RequestBuilder};
pub use response::{BODY_NOT_AVAILABLE, BodyState, Response};
pub use stream::{BodyStream, DEFAULT_CHUNK_SIZE, MemoryStream, ReaderStream};

// Re-export http crate types for methods, status codes and headers
pub use http::{Method, StatusCode, header};

/// Dynamic JSON value (re-exported from `serde_json`).
pub use serde_json::Value;
