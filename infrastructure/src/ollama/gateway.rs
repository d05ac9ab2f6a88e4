//! HTTP gateway for a local Ollama server.

use async_trait::async_trait;
use chat_application::ports::llm_gateway::{ByteStream, GatewayError, LlmGateway};
use chat_domain::{ChatRequest, ContentRecord, ModelInfo, ModelList, StreamRecord};
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, trace};

/// Where a stock Ollama install listens.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// [`LlmGateway`] over the Ollama HTTP API.
///
/// - `POST {base_url}/api/chat` for chat, streamed or not
/// - `GET {base_url}/api/tags` for the model listing
///
/// The configured timeout bounds connecting and the non-streaming calls.
/// A streamed body may take as long as the model needs.
pub struct OllamaGateway {
    client: reqwest::Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl OllamaGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, GatewayError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!("Endpoint answered {}: {}", status, body);
        Err(GatewayError::HttpStatus {
            status: status.as_u16(),
            body,
        })
    }

    fn bounded(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }
}

#[async_trait]
impl LlmGateway for OllamaGateway {
    async fn chat_stream(&self, request: &ChatRequest) -> Result<ByteStream, GatewayError> {
        debug!("POST {} (stream, model {})", self.url("/api/chat"), request.model);
        let response = self
            .send(self.client.post(self.url("/api/chat")).json(request))
            .await?;

        let body = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| {
                    trace!("Received {} bytes", bytes.len());
                    bytes.to_vec()
                })
                .map_err(map_reqwest_error)
        });
        Ok(body.boxed())
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ContentRecord, GatewayError> {
        debug!("POST {} (model {})", self.url("/api/chat"), request.model);
        let response = self
            .send(self.bounded(self.client.post(self.url("/api/chat")).json(request)))
            .await?;
        let text = response.text().await.map_err(map_reqwest_error)?;

        match StreamRecord::parse(text.trim()) {
            Ok(StreamRecord::Content(record)) => Ok(record),
            Ok(StreamRecord::Error(record)) => Err(GatewayError::RequestFailed(record.error)),
            Ok(StreamRecord::Unrecognized(value)) => Err(GatewayError::InvalidResponse(format!(
                "unexpected chat response: {}",
                value
            ))),
            Err(malformed) => Err(GatewayError::InvalidResponse(malformed.reason)),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, GatewayError> {
        debug!("GET {}", self.url("/api/tags"));
        let response = self
            .send(self.bounded(self.client.get(self.url("/api/tags"))))
            .await?;
        let list: ModelList = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        Ok(list.models)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_domain::{Message, Model};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(response: String) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });
        (format!("http://{}", addr), handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| {
                        l.to_ascii_lowercase()
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    fn request(stream: bool) -> ChatRequest {
        let history = [Message::user("Hi", 1)];
        ChatRequest::new(&Model::new("llama3"), history.iter(), stream)
    }

    #[test]
    fn trims_trailing_slash() {
        let gateway = OllamaGateway::new("http://localhost:11434/").unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:11434");
        assert_eq!(gateway.url("/api/tags"), "http://localhost:11434/api/tags");
    }

    #[tokio::test]
    async fn streams_raw_body() {
        let body = "{\"message\":{\"role\":\"assistant\",\"content\":\"Hel\"},\"done\":false}\n\
                    {\"message\":{\"role\":\"assistant\",\"content\":\"lo\"},\"done\":true}\n";
        let (url, server) = serve_once(http_response("200 OK", body)).await;
        let gateway = OllamaGateway::new(url).unwrap();

        let mut stream = gateway.chat_stream(&request(true)).await.unwrap();
        let mut received = Vec::new();
        while let Some(chunk) = stream.next().await {
            received.extend(chunk.unwrap());
        }

        assert_eq!(String::from_utf8(received).unwrap(), body);
        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/chat "));
        assert!(raw.contains("\"stream\":true"));
        assert!(raw.contains("\"model\":\"llama3\""));
    }

    #[tokio::test]
    async fn non_success_status_carries_body() {
        let (url, _server) =
            serve_once(http_response("404 Not Found", "model 'llama9' not found")).await;
        let gateway = OllamaGateway::new(url).unwrap();

        let err = match gateway.chat_stream(&request(true)).await {
            Ok(_) => panic!("expected an HTTP error"),
            Err(e) => e,
        };
        assert_eq!(
            err.to_string(),
            "HTTP error! status: 404, message: model 'llama9' not found"
        );
    }

    #[tokio::test]
    async fn chat_parses_single_record() {
        let body = r#"{"model":"llama3","message":{"role":"assistant","content":"Hello"},"done":true}"#;
        let (url, server) = serve_once(http_response("200 OK", body)).await;
        let gateway = OllamaGateway::new(url).unwrap();

        let record = gateway.chat(&request(false)).await.unwrap();
        assert_eq!(record.message.content, "Hello");
        assert!(record.done);
        assert!(server.await.unwrap().contains("\"stream\":false"));
    }

    #[tokio::test]
    async fn lists_models() {
        let body = r#"{"models":[{"name":"llama3:latest","size":1},{"name":"mistral"}]}"#;
        let (url, server) = serve_once(http_response("200 OK", body)).await;
        let gateway = OllamaGateway::new(url).unwrap();

        let models = gateway.list_models().await.unwrap();
        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["llama3:latest", "mistral"]);
        assert!(server.await.unwrap().starts_with("GET /api/tags "));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_connection_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let gateway = OllamaGateway::new(format!("http://{}", addr)).unwrap();
        let err = gateway.list_models().await.unwrap_err();
        assert!(matches!(err, GatewayError::ConnectionError(_)), "{:?}", err);
    }
}
