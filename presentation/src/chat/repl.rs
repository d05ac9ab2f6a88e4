//! REPL (Read-Eval-Print Loop) for interactive chat

use super::session_ref::resolve_session;
use super::turn::{reply_model, run_turn};
use crate::output::console::ConsoleFormatter;
use chat_application::{
    ExportSessionUseCase, ImportSessionUseCase, ListModelsUseCase, SendMessageInput,
    SendMessageUseCase, SessionStore,
};
use chat_domain::Model;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;
use tracing::debug;

/// Interactive chat REPL
pub struct ChatRepl {
    store: SessionStore,
    send_message: SendMessageUseCase,
    list_models: ListModelsUseCase,
    export: ExportSessionUseCase,
    import: ImportSessionUseCase,
    show_progress: bool,
    history_file: Option<PathBuf>,
}

impl ChatRepl {
    pub fn new(
        store: SessionStore,
        send_message: SendMessageUseCase,
        list_models: ListModelsUseCase,
        export: ExportSessionUseCase,
        import: ImportSessionUseCase,
    ) -> Self {
        Self {
            store,
            send_message,
            list_models,
            export,
            import,
            show_progress: true,
            history_file: None,
        }
    }

    /// Set whether to show a spinner while waiting for the first token
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Load and save line-editor history at `path`
    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(path) = &self.history_file {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    if line.starts_with('/') {
                        if self.handle_command(line).await {
                            break;
                        }
                        continue;
                    }

                    self.process_message(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("{}", ConsoleFormatter::error(format!("{:?}", err)));
                    break;
                }
            }
        }

        if let Some(path) = &self.history_file
            && let Err(e) = rl.save_history(path)
        {
            debug!("Could not save history to {}: {}", path.display(), e);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│               Ollama Chat                   │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        match self.store.current_session() {
            Some(session) => println!(
                "Conversation: {} ({} messages)",
                session.title(),
                session.messages().len()
            ),
            None => println!("Conversation: (new)"),
        }
        println!("Model: {}", reply_model(&self.store, None));
        println!();
        println!("Type /help for commands. Ctrl-C stops a reply, Ctrl-D exits.");
        println!();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        println!("  /help, /h, /?        - Show this help");
        println!("  /new                 - Start a new conversation");
        println!("  /sessions, /ls       - List conversations");
        println!("  /switch <n|id>       - Switch to a conversation");
        println!("  /history             - Show the current conversation");
        println!("  /delete [n|id]       - Delete a conversation (default: current)");
        println!("  /model [name]        - Show or change the model");
        println!("  /models              - List models on the server");
        println!("  /export [n|id]       - Export a conversation to JSON");
        println!("  /import <path>       - Import an exported conversation");
        println!("  /quit, /exit, /q     - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&mut self, line: &str) -> bool {
        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line, ""),
        };

        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                return true;
            }
            "/help" | "/h" | "/?" => Self::print_help(),
            "/new" => {
                self.store.create_session();
                println!("{}", ConsoleFormatter::notice("Started a new conversation"));
            }
            "/sessions" | "/ls" => {
                let sessions = self.store.sorted_sessions();
                print!(
                    "{}",
                    ConsoleFormatter::format_session_list(&sessions, self.store.current_session_id())
                );
            }
            "/switch" => match self.resolve(arg) {
                Some(id) => {
                    self.store.select_session(&id);
                    if let Some(session) = self.store.session(&id) {
                        print!("{}", ConsoleFormatter::format_transcript(session));
                    }
                }
                None => Self::unknown_session(arg),
            },
            "/history" => match self.store.current_session() {
                Some(session) => print!("{}", ConsoleFormatter::format_transcript(session)),
                None => println!("{}", ConsoleFormatter::notice("No active conversation")),
            },
            "/delete" => {
                let target = if arg.is_empty() {
                    self.store.current_session_id().map(str::to_string)
                } else {
                    self.resolve(arg)
                };
                match target {
                    Some(id) => {
                        self.store.delete_session(&id);
                        println!("{}", ConsoleFormatter::notice("Conversation deleted"));
                    }
                    None => Self::unknown_session(arg),
                }
            }
            "/model" => self.change_model(arg),
            "/models" => {
                let models = self.list_models.execute().await;
                print!(
                    "{}",
                    ConsoleFormatter::format_models(&models, &reply_model(&self.store, None))
                );
            }
            "/export" => {
                let target = if arg.is_empty() {
                    self.store.current_session_id().map(str::to_string)
                } else {
                    self.resolve(arg)
                };
                match target {
                    Some(id) => match self.export.execute(&self.store, &id) {
                        Ok(output) => println!(
                            "{}",
                            ConsoleFormatter::notice(format!("Exported to {}", output.location))
                        ),
                        Err(e) => eprintln!("{}", ConsoleFormatter::error(e)),
                    },
                    None => Self::unknown_session(arg),
                }
            }
            "/import" => {
                if arg.is_empty() {
                    println!("Usage: /import <path>");
                } else {
                    self.import_file(arg);
                }
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        false
    }

    fn resolve(&self, reference: &str) -> Option<String> {
        resolve_session(&self.store, reference)
    }

    fn unknown_session(reference: &str) {
        if reference.is_empty() {
            println!("{}", ConsoleFormatter::notice("No active conversation"));
        } else {
            println!(
                "{}",
                ConsoleFormatter::error(format!("No conversation matches '{}'", reference))
            );
        }
    }

    fn change_model(&mut self, name: &str) {
        if name.is_empty() {
            println!("Model: {}", reply_model(&self.store, None));
            return;
        }

        let model = Model::new(name);
        if let Some(id) = self.store.current_session_id().map(str::to_string) {
            self.store.update_session_model(&id, model.clone());
        }
        self.store.set_current_model(model.clone());
        println!("{}", ConsoleFormatter::notice(format!("Now using {}", model)));
    }

    fn import_file(&mut self, path: &str) {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("{}", ConsoleFormatter::error(format!("{}: {}", path, e)));
                return;
            }
        };
        match self.import.execute(&mut self.store, &bytes) {
            Ok(id) => {
                if let Some(session) = self.store.session(&id) {
                    println!(
                        "{}",
                        ConsoleFormatter::notice(format!("Imported '{}'", session.title()))
                    );
                }
            }
            Err(e) => eprintln!("{}", ConsoleFormatter::error(e)),
        }
    }

    async fn process_message(&mut self, line: &str) {
        println!();
        let result = run_turn(
            &self.send_message,
            &mut self.store,
            SendMessageInput::new(line),
            self.show_progress,
        )
        .await;

        if let Err(e) = result {
            eprintln!("{}", ConsoleFormatter::error(e));
        }
        println!();
    }
}
