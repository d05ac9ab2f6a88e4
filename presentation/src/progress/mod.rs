//! Live rendering of streamed replies

pub mod stream_printer;

pub use stream_printer::StreamPrinter;
