pub mod event_creation;
pub mod members;
pub mod menu;
pub mod payment;
pub mod wizard;

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::bot::commands;
use crate::bot::conversation::{ConversationState, ConversationStore};
use crate::bot::replies;
use crate::database::connection::DatabaseManager;
use crate::services::messaging::{deliver, MessageSender};
use crate::utils::logging::{log_handler_error, log_message_received, log_transition};
use crate::utils::validation::normalize_address;

/// The conversation state machine: one call per inbound message.
#[derive(Clone)]
pub struct BotHandler {
    pub db: DatabaseManager,
    sender: Arc<dyn MessageSender>,
    conversations: ConversationStore,
}

impl BotHandler {
    pub fn new(db: DatabaseManager, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            db,
            sender,
            conversations: ConversationStore::new(),
        }
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub async fn handle_message(&self, sender_address: &str, text: &str) {
        self.handle_message_at(sender_address, text, Utc::now()).await
    }

    /// Handles one inbound message as if it arrived at `now`.
    ///
    /// Messages from the same principal are processed one at a time. Errors
    /// are logged and answered with a generic reply; they never escape.
    pub async fn handle_message_at(&self, sender_address: &str, text: &str, now: DateTime<Utc>) {
        let principal = normalize_address(sender_address);
        if principal.is_empty() {
            tracing::warn!("Ignoring inbound message without a sender address");
            return;
        }
        let text = text.trim();

        let mut state = self.conversations.lock(&principal).await;
        let before = state.step();
        log_message_received(&principal, before.as_str(), text);

        if let Err(e) = self.dispatch(&principal, text, now, &mut state).await {
            log_handler_error(&principal, before.as_str(), &format!("{:#}", e));
            self.reply(&principal, &replies::generic_failure()).await;
        }

        log_transition(&principal, before.as_str(), state.step().as_str());
        drop(state);
        self.conversations.release(&principal);
    }

    async fn dispatch(
        &self,
        principal: &str,
        text: &str,
        now: DateTime<Utc>,
        state: &mut ConversationState,
    ) -> anyhow::Result<()> {
        // The one-shot command is accepted from any step
        if commands::is_one_shot_create(text) {
            return self.handle_one_shot(principal, text, now, state).await;
        }

        if commands::is_cancel(text) && !state.is_idle() {
            *state = ConversationState::idle();
            self.reply(principal, &replies::wizard_cancelled()).await;
            return Ok(());
        }

        match state.clone() {
            ConversationState::Idle { .. } => self.handle_idle(principal, text, state).await,
            ConversationState::AddingMembers { event_id } => {
                self.handle_adding_members(principal, &event_id, text, state).await
            }
            wizard_step => self.handle_wizard_step(principal, text, now, wizard_step, state).await,
        }
    }

    async fn reply(&self, principal: &str, text: &str) {
        deliver(self.sender.as_ref(), principal, text).await;
    }
}
