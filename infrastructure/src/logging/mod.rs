//! Conversation transcript logging.
//!
//! Provides [`JsonlConversationLogger`], which implements the
//! [`ConversationLogger`](chat_application::ConversationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlConversationLogger;
