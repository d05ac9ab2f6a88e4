//! File-backed key-value storage for chat history.

mod json_file_store;

pub use json_file_store::JsonFileStore;
