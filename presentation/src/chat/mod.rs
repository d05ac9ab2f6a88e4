//! Interactive chat module
//!
//! Provides a readline-based chat interface over the session store.

mod repl;
mod session_ref;
mod turn;

pub use repl::ChatRepl;
pub use session_ref::resolve_session;
pub use turn::{reply_model, run_turn};
