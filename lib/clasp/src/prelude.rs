//! Prelude module for convenient imports.
//!
//! ```ignore
//! use clasp::prelude::*;
//! ```

pub use crate::{
    ClientConfig, Error, HyperTransport, JsonClient, JsonCodec, Method, Request, RequestOptions,
    Response, Result, StreamOptions, Transport, Value,
};

// Re-export serde for convenience
pub use serde::{Deserialize, Serialize};
