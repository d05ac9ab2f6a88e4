//! Send Message use case
//!
//! Appends a user prompt to a session, asks the endpoint for a reply and
//! writes the reply into the session as it arrives.

use crate::config::BehaviorConfig;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::stream_observer::StreamObserver;
use crate::services::session_store::SessionStore;
use crate::services::stream_consumer::{StreamConsumer, StreamOutcome};
use chat_domain::util::now_millis;
use chat_domain::{ChatRequest, Message, Model, StreamError};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that prevent a message from being sent at all.
///
/// Failures of the reply itself are not errors here; they are reported
/// through the display observer and in [`SendMessageOutput::outcome`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SendMessageError {
    #[error("Message is empty")]
    EmptyPrompt,

    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

/// Input for the SendMessage use case
#[derive(Debug, Clone)]
pub struct SendMessageInput {
    pub content: String,
    /// Target session. `None` uses the active session, creating one if
    /// there is none.
    pub session_id: Option<String>,
    /// Overrides [`BehaviorConfig::stream`] for this call.
    pub stream: Option<bool>,
}

impl SendMessageInput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            session_id: None,
            stream: None,
        }
    }

    pub fn in_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }
}

/// Result of one send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageOutput {
    pub session_id: String,
    pub model: Model,
    /// Index of the assistant message inside the session.
    pub assistant_index: usize,
    /// Reply text as stored, possibly partial.
    pub reply: String,
    pub outcome: StreamOutcome,
}

/// Use case for sending one prompt and recording the reply.
pub struct SendMessageUseCase {
    gateway: Arc<dyn LlmGateway>,
    consumer: StreamConsumer,
    behavior: BehaviorConfig,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl SendMessageUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            consumer: StreamConsumer::new(),
            behavior: BehaviorConfig::default(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_behavior(mut self, behavior: BehaviorConfig) -> Self {
        self.consumer = StreamConsumer::with_settings(behavior.stream_settings.clone());
        self.behavior = behavior;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Send `input` and record the reply in `store`.
    ///
    /// `display` sees every stream callback after the session has been
    /// patched, so it can render the reply live.
    pub async fn execute<D>(
        &self,
        store: &mut SessionStore,
        input: SendMessageInput,
        display: &mut D,
        cancellation: &CancellationToken,
    ) -> Result<SendMessageOutput, SendMessageError>
    where
        D: StreamObserver + ?Sized,
    {
        if input.content.trim().is_empty() {
            return Err(SendMessageError::EmptyPrompt);
        }

        let session_id = match input.session_id {
            Some(id) if store.session(&id).is_some() => id,
            Some(id) => return Err(SendMessageError::SessionNotFound(id)),
            None => match store.current_session_id() {
                Some(id) => id.to_string(),
                None => store.create_session(),
            },
        };

        store.append_message(&session_id, Message::user(input.content, now_millis()));

        let stream = input.stream.unwrap_or(self.behavior.stream);
        let (model, request) = {
            let session = store
                .session(&session_id)
                .ok_or_else(|| SendMessageError::SessionNotFound(session_id.clone()))?;
            let model = resolve_model(session.model(), store.current_model());
            let request = ChatRequest::new(&model, session.messages(), stream);
            (model, request)
        };

        store.append_message(&session_id, Message::assistant("", now_millis()));
        let assistant_index = store
            .session(&session_id)
            .map(|s| s.messages().len().saturating_sub(1))
            .unwrap_or_default();

        info!(
            "Sending {} message(s) to {} (stream: {})",
            request.messages.len(),
            model,
            stream
        );

        let mut writer = SessionStreamWriter {
            store,
            session_id: &session_id,
            index: assistant_index,
            reply: String::new(),
            display,
        };

        let outcome = if stream {
            self.stream_reply(&request, &mut writer, cancellation).await
        } else {
            self.fetch_reply(&request, &mut writer, cancellation).await
        };
        let reply = writer.reply;

        self.log_outcome(&session_id, &model, &reply, &outcome);

        Ok(SendMessageOutput {
            session_id,
            model,
            assistant_index,
            reply,
            outcome,
        })
    }

    async fn stream_reply<O>(
        &self,
        request: &ChatRequest,
        observer: &mut O,
        cancellation: &CancellationToken,
    ) -> StreamOutcome
    where
        O: StreamObserver + ?Sized,
    {
        let opened = tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(StreamError::Cancelled),
            result = self.gateway.chat_stream(request) => {
                result.map_err(|e| StreamError::Transport(e.to_string()))
            }
        };

        match opened {
            Ok(body) => self.consumer.consume(body, observer, cancellation).await,
            Err(error) => {
                debug!("Could not open stream: {}", error);
                observer.on_error(&error);
                StreamOutcome::from_error(error)
            }
        }
    }

    async fn fetch_reply<O>(
        &self,
        request: &ChatRequest,
        observer: &mut O,
        cancellation: &CancellationToken,
    ) -> StreamOutcome
    where
        O: StreamObserver + ?Sized,
    {
        let result = tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(StreamError::Cancelled),
            result = self.gateway.chat(request) => {
                result.map_err(|e| StreamError::Transport(e.to_string()))
            }
        };

        match result {
            Ok(record) => {
                observer.on_delta(&record.message.content);
                observer.on_done();
                StreamOutcome::Completed
            }
            Err(error) => {
                observer.on_error(&error);
                StreamOutcome::from_error(error)
            }
        }
    }

    fn log_outcome(&self, session_id: &str, model: &Model, reply: &str, outcome: &StreamOutcome) {
        let event = match outcome.error() {
            None => ConversationEvent::new(
                "stream_completed",
                serde_json::json!({
                    "session_id": session_id,
                    "model": model.as_str(),
                    "bytes": reply.len(),
                }),
            ),
            Some(error) => {
                warn!("Reply from {} ended early: {}", model, error);
                ConversationEvent::new(
                    "stream_failed",
                    serde_json::json!({
                        "session_id": session_id,
                        "model": model.as_str(),
                        "error": error.to_string(),
                        "bytes": reply.len(),
                    }),
                )
            }
        };
        self.conversation_logger.log(event);
    }
}

/// Session model, else the default model, else the fallback.
pub fn resolve_model(session_model: &Model, current_model: &Model) -> Model {
    if !session_model.is_unset() {
        session_model.clone()
    } else if !current_model.is_unset() {
        current_model.clone()
    } else {
        Model::fallback()
    }
}

/// Writes deltas into the assistant message and forwards every callback
/// to the caller's display.
struct SessionStreamWriter<'a, D: StreamObserver + ?Sized> {
    store: &'a mut SessionStore,
    session_id: &'a str,
    index: usize,
    reply: String,
    display: &'a mut D,
}

impl<D: StreamObserver + ?Sized> StreamObserver for SessionStreamWriter<'_, D> {
    fn on_delta(&mut self, fragment: &str) {
        self.reply.push_str(fragment);
        self.store
            .update_message_content(self.session_id, self.index, self.reply.as_str());
        self.display.on_delta(fragment);
    }

    fn on_error(&mut self, error: &StreamError) {
        self.store.persist();
        self.display.on_error(error);
    }

    fn on_done(&mut self) {
        self.store.persist();
        self.display.on_done();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::{ByteStream, GatewayError};
    use crate::ports::storage::{InMemoryStore, KeyValueStore};
    use crate::ports::stream_observer::StreamEventCollector;
    use async_trait::async_trait;
    use chat_domain::{ContentRecord, ModelInfo, Role, WireMessage};
    use futures::StreamExt;
    use futures::stream;
    use std::sync::Mutex;

    enum Script {
        Chunks(Vec<&'static str>),
        /// Yields the chunks, then never completes.
        Stall(Vec<&'static str>),
        OpenFails,
    }

    struct ScriptedGateway {
        script: Script,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedGateway {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    fn record(text: &str) -> String {
        format!(
            "{}\n",
            serde_json::json!({"message": {"role": "assistant", "content": text}, "done": false})
        )
    }

    fn owned(chunks: &[&str]) -> Vec<Result<Vec<u8>, GatewayError>> {
        chunks.iter().map(|c| Ok(record(c).into_bytes())).collect()
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn chat_stream(&self, request: &ChatRequest) -> Result<ByteStream, GatewayError> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.script {
                Script::Chunks(chunks) => Ok(stream::iter(owned(chunks)).boxed()),
                Script::Stall(chunks) => {
                    Ok(stream::iter(owned(chunks)).chain(stream::pending()).boxed())
                }
                Script::OpenFails => Err(GatewayError::ConnectionError("refused".to_string())),
            }
        }

        async fn chat(&self, request: &ChatRequest) -> Result<ContentRecord, GatewayError> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.script {
                Script::Chunks(chunks) => Ok(ContentRecord {
                    model: Some(request.model.clone()),
                    created_at: None,
                    message: WireMessage {
                        role: "assistant".to_string(),
                        content: chunks.concat(),
                    },
                    done: true,
                }),
                _ => Err(GatewayError::HttpStatus {
                    status: 500,
                    body: "boom".to_string(),
                }),
            }
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>, GatewayError> {
            Ok(Vec::new())
        }
    }

    struct RecordingLogger {
        events: Mutex<Vec<&'static str>>,
    }

    impl ConversationLogger for RecordingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    fn store_with(storage: Arc<InMemoryStore>) -> SessionStore {
        SessionStore::open(storage).0
    }

    #[tokio::test]
    async fn streams_reply_into_new_session() {
        let gateway = ScriptedGateway::new(Script::Chunks(vec!["Hel", "lo"]));
        let storage = Arc::new(InMemoryStore::new());
        let mut store = store_with(storage.clone());
        let mut display = StreamEventCollector::new();

        let output = SendMessageUseCase::new(gateway.clone())
            .execute(
                &mut store,
                SendMessageInput::new("Hi there"),
                &mut display,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(output.outcome, StreamOutcome::Completed);
        assert_eq!(output.reply, "Hello");
        assert_eq!(output.assistant_index, 1);
        assert_eq!(output.model, Model::fallback());
        assert_eq!(display.deltas(), vec!["Hel", "lo"]);
        assert_eq!(display.done_count(), 1);

        let session = store.session(&output.session_id).unwrap();
        assert_eq!(session.title(), "Hi there");
        assert_eq!(session.messages()[0].role, Role::User);
        assert_eq!(session.messages()[1].content, "Hello");

        // The request carries the history without the assistant placeholder.
        let requests = gateway.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages.len(), 1);
        assert!(requests[0].stream);

        // The finished reply reached storage.
        let saved = storage.get(crate::services::session_store::STORAGE_KEY).unwrap().unwrap();
        assert!(saved.contains("Hello"));
    }

    #[tokio::test]
    async fn uses_session_model() {
        let gateway = ScriptedGateway::new(Script::Chunks(vec!["ok"]));
        let mut store = store_with(Arc::new(InMemoryStore::new()));
        let id = store.create_session();
        store.update_session_model(&id, Model::new("mistral"));

        let output = SendMessageUseCase::new(gateway.clone())
            .execute(
                &mut store,
                SendMessageInput::new("q").in_session(id.clone()),
                &mut StreamEventCollector::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(output.session_id, id);
        assert_eq!(gateway.requests()[0].model, "mistral");
    }

    #[tokio::test]
    async fn rejects_blank_prompt_and_unknown_session() {
        let gateway = ScriptedGateway::new(Script::Chunks(vec![]));
        let mut store = store_with(Arc::new(InMemoryStore::new()));
        let use_case = SendMessageUseCase::new(gateway);
        let cancel = CancellationToken::new();

        let err = use_case
            .execute(&mut store, SendMessageInput::new("   "), &mut StreamEventCollector::new(), &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, SendMessageError::EmptyPrompt);

        let err = use_case
            .execute(
                &mut store,
                SendMessageInput::new("hi").in_session("missing"),
                &mut StreamEventCollector::new(),
                &cancel,
            )
            .await
            .unwrap_err();
        assert_eq!(err, SendMessageError::SessionNotFound("missing".to_string()));
        assert!(store.collection().is_empty());
    }

    #[tokio::test]
    async fn open_failure_is_reported_as_transport_error() {
        let gateway = ScriptedGateway::new(Script::OpenFails);
        let logger = Arc::new(RecordingLogger {
            events: Mutex::new(Vec::new()),
        });
        let mut store = store_with(Arc::new(InMemoryStore::new()));
        let mut display = StreamEventCollector::new();

        let output = SendMessageUseCase::new(gateway)
            .with_conversation_logger(logger.clone())
            .execute(&mut store, SendMessageInput::new("hi"), &mut display, &CancellationToken::new())
            .await
            .unwrap();

        let expected = StreamError::Transport("Connection error: refused".to_string());
        assert_eq!(output.outcome, StreamOutcome::Failed(expected.clone()));
        assert_eq!(display.errors(), vec![&expected]);
        assert_eq!(output.reply, "");
        assert_eq!(*logger.events.lock().unwrap(), vec!["stream_failed"]);
    }

    #[tokio::test]
    async fn cancellation_keeps_partial_reply() {
        let gateway = ScriptedGateway::new(Script::Stall(vec!["partial"]));
        let mut store = store_with(Arc::new(InMemoryStore::new()));
        let use_case = SendMessageUseCase::new(gateway);
        let cancel = CancellationToken::new();
        let mut display = StreamEventCollector::new();

        let canceller = async {
            tokio::task::yield_now().await;
            cancel.cancel();
        };
        let (result, _) = tokio::join!(
            use_case.execute(&mut store, SendMessageInput::new("hi"), &mut display, &cancel),
            canceller
        );
        let output = result.unwrap();

        assert_eq!(output.outcome, StreamOutcome::Cancelled);
        assert_eq!(display.errors(), vec![&StreamError::Cancelled]);
        let session = store.session(&output.session_id).unwrap();
        assert_eq!(session.messages()[output.assistant_index].content, "partial");
    }

    #[tokio::test]
    async fn non_streaming_mode_appends_whole_reply() {
        let gateway = ScriptedGateway::new(Script::Chunks(vec!["all ", "at once"]));
        let mut store = store_with(Arc::new(InMemoryStore::new()));
        let mut display = StreamEventCollector::new();

        let output = SendMessageUseCase::new(gateway.clone())
            .execute(
                &mut store,
                SendMessageInput::new("hi").with_stream(false),
                &mut display,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(output.outcome.is_completed());
        assert_eq!(output.reply, "all at once");
        assert_eq!(display.deltas(), vec!["all at once"]);
        assert!(!gateway.requests()[0].stream);
    }

    #[test]
    fn resolve_model_prefers_session_then_default() {
        let unset = Model::default();
        assert_eq!(resolve_model(&Model::new("a"), &Model::new("b")).as_str(), "a");
        assert_eq!(resolve_model(&unset, &Model::new("b")).as_str(), "b");
        assert_eq!(resolve_model(&unset, &unset), Model::fallback());
    }
}
