//! Prints a reply as it streams in.

use chat_application::ports::stream_observer::StreamObserver;
use chat_domain::StreamError;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

/// [`StreamObserver`] that writes deltas straight to a terminal.
///
/// A spinner runs until the first callback so a slow model load is
/// visible; it is cleared before any text is written.
pub struct StreamPrinter<W: Write = io::Stdout> {
    out: W,
    prefix: String,
    spinner: Option<ProgressBar>,
    started: bool,
}

impl StreamPrinter<io::Stdout> {
    pub fn stdout(prefix: impl Into<String>, show_progress: bool) -> Self {
        let spinner = show_progress.then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.set_message("Thinking...");
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        Self::new(io::stdout(), prefix, spinner)
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl<W: Write> StreamPrinter<W> {
    pub fn new(out: W, prefix: impl Into<String>, spinner: Option<ProgressBar>) -> Self {
        Self {
            out,
            prefix: prefix.into(),
            spinner,
            started: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        let _ = write!(self.out, "{}", self.prefix);
    }
}

impl<W: Write> StreamObserver for StreamPrinter<W> {
    fn on_delta(&mut self, fragment: &str) {
        self.start();
        let _ = write!(self.out, "{}", fragment);
        let _ = self.out.flush();
    }

    fn on_error(&mut self, error: &StreamError) {
        self.start();
        let text = match error {
            StreamError::Cancelled => format!("[{}]", error).yellow().to_string(),
            _ => format!("[Error: {}]", error).red().to_string(),
        };
        let _ = writeln!(self.out, "\n{}", text);
        let _ = self.out.flush();
    }

    fn on_done(&mut self) {
        self.start();
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}
