//! CLI entrypoint for ollama-chat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use chat_application::{
    ConversationLogger, ExportSessionUseCase, ImportSessionUseCase, InitOutcome,
    ListModelsUseCase, LlmGateway, NoConversationLogger, SendMessageInput, SendMessageUseCase,
    SessionStore,
};
use chat_domain::Model;
use chat_infrastructure::{
    ConfigLoader, FileConfig, FileExportSink, JsonFileStore, JsonlConversationLogger,
    OllamaGateway,
};
use chat_presentation::{
    ChatRepl, Cli, Command, ConsoleFormatter, SessionsCommand, reply_model, resolve_session,
    run_turn,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        println!();
        println!("Effective configuration:");
        println!("{}", config.to_toml_string()?);
        return Ok(ExitCode::SUCCESS);
    }

    let _log_guard = init_logging(cli.verbose, config.logging.log_file())?;
    info!("Starting ollama-chat");

    for issue in config.validate() {
        warn!("Configuration: {}", issue);
    }

    // === Dependency Injection ===
    let gateway: Arc<dyn LlmGateway> = Arc::new(OllamaGateway::with_timeout(
        config.endpoint.base_url.trim(),
        config.endpoint.timeout(),
    )?);

    let data_dir = config
        .storage
        .data_dir()
        .or_else(JsonFileStore::default_dir)
        .context("Could not determine a data directory; set [storage] data_dir")?;
    info!("Chat history in {}", data_dir.display());
    let (mut store, outcome) = SessionStore::open(Arc::new(JsonFileStore::new(data_dir)));
    if let InitOutcome::Recovered(e) = &outcome {
        eprintln!(
            "{}",
            ConsoleFormatter::error(format!("{}; starting with an empty history", e))
        );
    }

    apply_model_choice(&mut store, &cli, &config);

    let conversation_logger: Arc<dyn ConversationLogger> = match config
        .logging
        .conversation_log()
        .and_then(JsonlConversationLogger::open)
    {
        Some(logger) => {
            info!("Conversation transcript: {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoConversationLogger),
    };

    let mut behavior = config.behavior();
    if cli.no_stream {
        behavior.stream = false;
    }

    let send_message = SendMessageUseCase::new(gateway.clone())
        .with_behavior(behavior)
        .with_conversation_logger(conversation_logger.clone());
    let list_models = ListModelsUseCase::new(gateway);
    let import = ImportSessionUseCase::new().with_conversation_logger(conversation_logger);
    let show_progress = !cli.quiet && config.repl.show_progress;

    match cli.command.clone().unwrap_or(Command::Chat { new: false }) {
        Command::Chat { new } => {
            if new {
                store.create_session();
            }
            let history_file = config
                .repl
                .history_file()
                .or_else(|| dirs::data_dir().map(|d| d.join("ollama-chat").join("history.txt")));
            let export = ExportSessionUseCase::new(Arc::new(FileExportSink::new(
                config.storage.export_dir(),
            )));

            let mut repl = ChatRepl::new(store, send_message, list_models, export, import)
                .with_progress(show_progress)
                .with_history_file(history_file);
            repl.run().await?;
        }

        Command::Ask {
            prompt,
            session,
            new,
        } => {
            let mut input = SendMessageInput::new(prompt);
            if new {
                input = input.in_session(store.create_session());
            } else if let Some(reference) = session {
                input = input.in_session(resolve(&store, &reference)?);
            }

            let output = run_turn(&send_message, &mut store, input, show_progress).await?;
            if !output.outcome.is_completed() {
                return Ok(ExitCode::FAILURE);
            }
        }

        Command::Sessions { action } => {
            run_sessions_command(action, &mut store, &config, import)?;
        }

        Command::Models => {
            let models = list_models.execute().await;
            print!(
                "{}",
                ConsoleFormatter::format_models(&models, &reply_model(&store, None))
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))
}

/// `--model` replaces the saved default; the config file only fills it in
/// when nothing has been chosen yet.
fn apply_model_choice(store: &mut SessionStore, cli: &Cli, config: &FileConfig) {
    let chosen = cli
        .model
        .as_deref()
        .map(Model::new)
        .filter(|m| !m.is_unset());

    if let Some(model) = chosen {
        if store.current_model() != &model {
            store.set_current_model(model);
        }
    } else if store.current_model().is_unset()
        && let Some(model) = config.chat.default_model()
    {
        store.set_current_model(model);
    }
}

fn resolve(store: &SessionStore, reference: &str) -> Result<String> {
    resolve_session(store, reference)
        .with_context(|| format!("No conversation matches '{}'", reference))
}

fn run_sessions_command(
    action: SessionsCommand,
    store: &mut SessionStore,
    config: &FileConfig,
    import: ImportSessionUseCase,
) -> Result<()> {
    match action {
        SessionsCommand::List { json } => {
            let sessions = store.sorted_sessions();
            if json {
                println!("{}", ConsoleFormatter::format_sessions_json(&sessions));
            } else {
                print!(
                    "{}",
                    ConsoleFormatter::format_session_list(&sessions, store.current_session_id())
                );
            }
        }

        SessionsCommand::Show { session } => {
            let id = resolve(store, &session)?;
            if let Some(session) = store.session(&id) {
                print!("{}", ConsoleFormatter::format_transcript(session));
            }
        }

        SessionsCommand::Select { session } => {
            let id = resolve(store, &session)?;
            store.select_session(&id);
            println!("{}", ConsoleFormatter::notice(format!("Active conversation: {}", id)));
        }

        SessionsCommand::Delete { session } => {
            let id = resolve(store, &session)?;
            store.delete_session(&id);
            println!("{}", ConsoleFormatter::notice(format!("Deleted {}", id)));
        }

        SessionsCommand::Export { session, output } => {
            let id = match session {
                Some(reference) => resolve(store, &reference)?,
                None => store
                    .current_session_id()
                    .map(str::to_string)
                    .context("No active conversation to export")?,
            };
            let dir = output.unwrap_or_else(|| config.storage.export_dir());
            let export = ExportSessionUseCase::new(Arc::new(FileExportSink::new(dir)));
            let result = export.execute(store, &id)?;
            println!("{}", result.location);
        }

        SessionsCommand::Import { path } => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let id = import.execute(store, &bytes)?;
            println!("{}", ConsoleFormatter::notice(format!("Imported as {}", id)));
        }
    }
    Ok(())
}

/// Install the tracing subscriber.
///
/// Verbosity picks the level (`-v` = info, `-vv` = debug, `-vvv` = trace).
/// With a log file configured, events also go there, without colors; keep
/// the returned guard alive until exit so buffered lines are flushed.
fn init_logging(verbose: u8, log_file: Option<PathBuf>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::new(level);

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let Some(file_name) = path.file_name() else {
        bail!("Invalid log file path: {}", path.display());
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();
    Ok(Some(guard))
}
