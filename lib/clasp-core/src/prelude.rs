//! Prelude module for convenient imports.
//!
//! ```
//! use clasp_core::prelude::*;
//! ```

pub use crate::{
    BodyMode, BodyStream, Container, Error, Headers, JsonCodec, JsonStream, Logger, Method,
    Request, RequestBuilder, Response, Result, Scalar, StreamOptions, Transport, Value, from_json,
};
