//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod list_models;
pub mod send_message;
pub mod transfer;
