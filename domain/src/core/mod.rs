//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: a model name served by the local endpoint
//! - [`error`]: the stream and store error taxonomy
//! - [`string`]: title truncation

pub mod error;
pub mod model;
pub mod string;
