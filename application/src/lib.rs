//! Application layer for ollama-chat
//!
//! This crate contains the stream consumer, the session store, use cases
//! and port definitions. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod services;
pub mod use_cases;

// Re-export commonly used types
pub use config::{BehaviorConfig, DEFAULT_MAX_CONSECUTIVE_MALFORMED, StreamSettings};
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    export_sink::{ExportSink, ExportSinkError},
    llm_gateway::{ByteStream, GatewayError, LlmGateway},
    storage::{InMemoryStore, KeyValueStore, StorageError},
    stream_observer::{NoStreamObserver, StreamEventCollector, StreamObserver},
};
pub use services::{
    session_store::{InitOutcome, STORAGE_KEY, SessionStore},
    stream_consumer::{StreamConsumer, StreamOutcome},
};
pub use use_cases::list_models::ListModelsUseCase;
pub use use_cases::send_message::{
    SendMessageError, SendMessageInput, SendMessageOutput, SendMessageUseCase, resolve_model,
};
pub use use_cases::transfer::{
    ExportError, ExportOutput, ExportSessionUseCase, ImportError, ImportSessionUseCase,
};
