//! Console output for sessions, transcripts and model listings

use chat_domain::{Message, Model, ModelInfo, Role, Session};
use colored::Colorize;

/// Formats chat state for terminal display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Sessions newest first, marking the active one.
    ///
    /// Each line starts with its 1-based position, which the REPL accepts
    /// in place of the session id.
    pub fn format_session_list(sessions: &[&Session], current_id: Option<&str>) -> String {
        if sessions.is_empty() {
            return format!("{}\n", "No conversations yet.".dimmed());
        }

        let mut output = Self::section_header("Conversations");
        for (i, session) in sessions.iter().enumerate() {
            let marker = if Some(session.id()) == current_id {
                "*".green().bold().to_string()
            } else {
                " ".to_string()
            };
            output.push_str(&format!(
                "{} {:>3}. {}  {}\n",
                marker,
                i + 1,
                session.title().bold(),
                format!(
                    "({} msgs, {}, {})",
                    session.messages().len(),
                    Self::model_label(session.model()),
                    Self::format_time(session.last_update_time())
                )
                .dimmed()
            ));
        }
        output
    }

    /// Sessions as a JSON array, in the stored field layout.
    pub fn format_sessions_json(sessions: &[&Session]) -> String {
        serde_json::to_string_pretty(sessions).unwrap_or_else(|_| "[]".to_string())
    }

    /// The full message history of one session.
    pub fn format_transcript(session: &Session) -> String {
        let mut output = Self::section_header(session.title());
        for message in session.messages() {
            output.push_str(&Self::format_message(message));
            output.push('\n');
        }
        output
    }

    pub fn format_message(message: &Message) -> String {
        let label = match message.role {
            Role::User => "You:".cyan().bold(),
            Role::Assistant => "Assistant:".green().bold(),
        };
        format!("{} {}\n", label, message.content)
    }

    pub fn format_models(models: &[ModelInfo], current: &Model) -> String {
        let mut output = Self::section_header("Available models");
        for info in models {
            if info.name == current.as_str() {
                output.push_str(&format!("{} {}\n", "*".green().bold(), info.name.bold()));
            } else {
                output.push_str(&format!("  {}\n", info.name));
            }
        }
        output
    }

    /// Prompt label shown before the assistant's streamed reply.
    pub fn reply_prefix(model: &Model) -> String {
        format!("{} ", format!("{}>", model).green().bold())
    }

    pub fn error(message: impl std::fmt::Display) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }

    pub fn notice(message: impl std::fmt::Display) -> String {
        format!("{} {}", "->".cyan(), message)
    }

    fn model_label(model: &Model) -> String {
        if model.is_unset() {
            "default model".to_string()
        } else {
            model.to_string()
        }
    }

    /// Local `YYYY-MM-DD HH:MM` for an epoch-millisecond timestamp.
    pub fn format_time(millis: i64) -> String {
        chrono::DateTime::from_timestamp_millis(millis)
            .map(|t| {
                t.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            })
            .unwrap_or_else(|| "-".to_string())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
