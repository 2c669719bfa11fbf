/// Inbound text classification and one-shot command parsing
pub mod commands;
/// Heuristic name/phone extraction from pasted contact lists
pub mod contacts;
/// Per-principal conversation state and its keyed store
pub mod conversation;
/// The conversation state machine
pub mod handlers;
/// Reply texts sent back to principals
pub mod replies;
