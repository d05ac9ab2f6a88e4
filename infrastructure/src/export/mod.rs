//! Export sinks

mod file_sink;

pub use file_sink::FileExportSink;
