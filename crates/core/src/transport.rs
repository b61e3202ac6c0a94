//! Transport trait definition
//!
//! The client never talks to the network itself. A `Transport` executes a
//! fully built [`HttpRequest`] and hands back the raw [`HttpResponse`], which
//! keeps the request/response model testable without a server.

use async_trait::async_trait;

use crate::error::Result;
use crate::request::HttpRequest;
use crate::response::HttpResponse;

/// Executes HTTP requests against a Swift account
///
/// Implementations resolve `request.path` against the account storage URL.
/// When `request.sink` is set, a 2xx body must be fed to the sink chunk by
/// chunk and the returned response body left empty; error bodies are always
/// returned in the response. Non-2xx statuses are returned
/// as responses, not errors; `Err` is reserved for failures where no response
/// was received at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}
