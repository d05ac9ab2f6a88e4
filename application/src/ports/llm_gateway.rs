//! LLM Gateway port
//!
//! Defines the interface for communicating with the local inference endpoint.

use async_trait::async_trait;
use chat_domain::{ChatRequest, ContentRecord, ModelInfo};
use futures::stream::BoxStream;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("HTTP error! status: {status}, message: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

/// Raw response body of a streaming chat call, chunked as the transport
/// delivers it.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, GatewayError>>;

/// Gateway for LLM communication
///
/// This port defines how the application layer talks to the endpoint.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Start a streaming chat call and hand back the undecoded body.
    ///
    /// Framing and record parsing are left to
    /// [`StreamConsumer`](crate::services::stream_consumer::StreamConsumer).
    async fn chat_stream(&self, request: &ChatRequest) -> Result<ByteStream, GatewayError>;

    /// Non-streaming chat call answering with a single record.
    async fn chat(&self, request: &ChatRequest) -> Result<ContentRecord, GatewayError>;

    /// Models the endpoint can serve.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, GatewayError>;
}
