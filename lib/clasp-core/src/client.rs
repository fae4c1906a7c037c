//! Transport trait.
//!
//! [`Transport`] is the seam between request execution and the
//! [`Response`] envelope. Implement it to plug in a different HTTP stack or a
//! test double.

use std::future::Future;

use crate::{Request, Response, Result};

/// How the transport should deliver the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyMode {
    /// Read the whole body before returning.
    #[default]
    Buffered,
    /// Return as soon as headers arrive; the body is read on demand.
    Streamed,
}

/// Executes HTTP requests.
pub trait Transport: Send + Sync {
    /// Execute a request and return the response envelope, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be completed:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    fn execute(
        &self,
        request: Request,
        mode: BodyMode,
    ) -> impl Future<Output = Result<Response>> + Send;
}
