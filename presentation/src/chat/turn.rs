//! One prompt/reply exchange on the terminal.

use crate::output::console::ConsoleFormatter;
use crate::progress::StreamPrinter;
use chat_application::{
    SendMessageError, SendMessageInput, SendMessageOutput, SendMessageUseCase, SessionStore,
    resolve_model,
};
use chat_domain::Model;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Send `input` and print the reply as it streams in.
///
/// Ctrl-C while the reply is streaming stops it; what arrived so far is
/// kept in the session.
pub async fn run_turn(
    use_case: &SendMessageUseCase,
    store: &mut SessionStore,
    input: SendMessageInput,
    show_progress: bool,
) -> Result<SendMessageOutput, SendMessageError> {
    let model = reply_model(store, input.session_id.as_deref());
    let mut printer = StreamPrinter::stdout(ConsoleFormatter::reply_prefix(&model), show_progress);

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("Interrupt received, stopping generation");
                cancel.cancel();
            }
        })
    };

    let result = use_case.execute(store, input, &mut printer, &cancel).await;
    watcher.abort();
    result
}

/// The model a reply in `session_id` (or the active session) will come from.
pub fn reply_model(store: &SessionStore, session_id: Option<&str>) -> Model {
    let session = match session_id {
        Some(id) => store.session(id),
        None => store.current_session(),
    };
    match session {
        Some(session) => resolve_model(session.model(), store.current_model()),
        None => resolve_model(store.current_model(), store.current_model()),
    }
}
