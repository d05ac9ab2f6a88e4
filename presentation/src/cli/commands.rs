//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for ollama-chat
#[derive(Parser, Debug)]
#[command(name = "ollama-chat")]
#[command(author, version, about = "Chat with local models served by Ollama")]
#[command(long_about = r#"
ollama-chat is a terminal client for a local Ollama server. Replies stream in
as they are generated and every conversation is kept on disk.

Without a subcommand an interactive chat starts in the most recent
conversation.

Configuration files are loaded from (in priority order):
1. OLLAMA_CHAT_* environment variables
2. --config <path>     Explicit config file
3. ./ollama-chat.toml  Project-level config
4. ~/.config/ollama-chat/config.toml   Global config

Example:
  ollama-chat
  ollama-chat ask "Explain lifetimes in one paragraph"
  ollama-chat --model mistral sessions list
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Model for new conversations (overrides the saved default)
    #[arg(short, long, value_name = "MODEL", global = true)]
    pub model: Option<String>,

    /// Ask for the whole reply at once instead of streaming it
    #[arg(long, global = true)]
    pub no_stream: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start an interactive chat (the default)
    Chat {
        /// Start in a fresh conversation
        #[arg(long)]
        new: bool,
    },

    /// Send one message and print the reply
    Ask {
        /// The message to send
        prompt: String,

        /// Continue this conversation instead of the active one
        #[arg(long, value_name = "ID")]
        session: Option<String>,

        /// Start a fresh conversation
        #[arg(long, conflicts_with = "session")]
        new: bool,
    },

    /// Manage saved conversations
    Sessions {
        #[command(subcommand)]
        action: SessionsCommand,
    },

    /// List the models the server can run
    Models,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SessionsCommand {
    /// List conversations, most recently updated first
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print a conversation
    Show {
        /// Session id or list position
        session: String,
    },

    /// Make a conversation the active one
    Select {
        /// Session id or list position
        session: String,
    },

    /// Delete a conversation
    Delete {
        /// Session id or list position
        session: String,
    },

    /// Write a conversation to a JSON file
    Export {
        /// Session id or list position (default: active conversation)
        session: Option<String>,

        /// Directory to write into (default: [storage] export_dir)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Load a conversation from an exported JSON file
    Import {
        /// File written by `sessions export`
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_chat() {
        let cli = Cli::try_parse_from(["ollama-chat"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["ollama-chat", "ask", "hi", "-vv", "--model", "mistral"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.model.as_deref(), Some("mistral"));
        assert_eq!(
            cli.command,
            Some(Command::Ask {
                prompt: "hi".to_string(),
                session: None,
                new: false,
            })
        );
    }

    #[test]
    fn sessions_export_takes_optional_target() {
        let cli = Cli::try_parse_from(["ollama-chat", "sessions", "export", "-o", "/tmp"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Sessions {
                action: SessionsCommand::Export {
                    session: None,
                    output: Some(PathBuf::from("/tmp")),
                },
            })
        );
    }

    #[test]
    fn ask_rejects_session_with_new() {
        assert!(Cli::try_parse_from(["ollama-chat", "ask", "hi", "--new", "--session", "x"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
