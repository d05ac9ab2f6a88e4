//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod conversation_logger;
pub mod export_sink;
pub mod llm_gateway;
pub mod storage;
pub mod stream_observer;
