//! Resolving user-typed session references.

use chat_application::SessionStore;

/// Resolve `reference` to a session id.
///
/// Accepts, in order of precedence:
/// - a 1-based position in the newest-first listing
/// - a full session id
/// - an unambiguous id prefix
pub fn resolve_session(store: &SessionStore, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    if let Ok(position) = reference.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|i| store.sorted_sessions().get(i).map(|s| s.id().to_string()));
    }

    if store.session(reference).is_some() {
        return Some(reference.to_string());
    }

    let mut matches = store
        .sorted_sessions()
        .into_iter()
        .filter(|s| s.id().starts_with(reference));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(only.id().to_string()),
        _ => None,
    }
}
