//! # Symbolication Service
//!
//! The seam between the channel pipeline and whatever knows how to map bundle
//! positions back to original source positions.
//!
//! [`DevServerSymbolicator`] talks to the development server's
//! `/symbolicate` endpoint, which owns the source maps of the running bundle.
//! Symbolication therefore only works while the dev server is up; when it is
//! not, every request fails with [`SymbolicateError::Transport`] and the
//! pipeline falls back to the unsymbolicated stack.
//!
//! There is deliberately no timeout and no retry: a request runs until the
//! server answers or the connection fails.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::SymbolicateError;
use crate::types::{ParsedStack, StackFrame, Symbolication};

/// Default base URL of the development server.
pub const DEFAULT_DEV_SERVER_URL: &str = "http://localhost:8081";

/// Resolves a parsed stack to original source positions.
///
/// Returning an empty [`Symbolication::frames`] means "nothing known about
/// this stack" and is not treated as a failure.
#[async_trait]
pub trait Symbolicator: Send + Sync
{
    /// Resolve `stack`.
    ///
    /// ## Errors
    ///
    /// Any error is reported through the fallback error logger by the
    /// pipeline; it never reaches the caller of a logging channel.
    async fn symbolicate(&self, stack: &ParsedStack) -> Result<Symbolication, SymbolicateError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SymbolicateRequest<'a>
{
    stack: &'a [StackFrame],
    extra_data: serde_json::Map<String, serde_json::Value>,
}

/// Symbolicator backed by the development server.
#[derive(Debug, Clone)]
pub struct DevServerSymbolicator
{
    client: Client,
    endpoint: String,
}

impl DevServerSymbolicator
{
    /// Create a symbolicator for the dev server at `base_url`
    /// (e.g. `http://localhost:8081`).
    ///
    /// ## Errors
    ///
    /// Returns [`SymbolicateError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, SymbolicateError>
    {
        let client = Client::builder()
            .user_agent(concat!("consym/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a symbolicator reusing an existing HTTP client.
    pub fn with_client(client: Client, base_url: &str) -> Self
    {
        Self {
            client,
            endpoint: format!("{}/symbolicate", base_url.trim_end_matches('/')),
        }
    }

    /// Full URL requests are sent to.
    pub fn endpoint(&self) -> &str
    {
        &self.endpoint
    }
}

#[async_trait]
impl Symbolicator for DevServerSymbolicator
{
    async fn symbolicate(&self, stack: &ParsedStack) -> Result<Symbolication, SymbolicateError>
    {
        let request = SymbolicateRequest {
            stack: &stack.frames,
            extra_data: serde_json::Map::new(),
        };

        tracing::trace!(endpoint = %self.endpoint, frames = stack.len(), "Sending symbolication request");

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SymbolicateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let symbolication: Symbolication = serde_json::from_str(&body)?;
        tracing::trace!(frames = symbolication.frames.len(), "Received symbolication response");
        Ok(symbolication)
    }
}
