use super::BotHandler;
use crate::bot::commands;
use crate::bot::contacts::parse_contacts;
use crate::bot::conversation::ConversationState;
use crate::bot::replies;
use crate::database::models::{Event, Member};
use crate::utils::logging::log_database_operation;

impl BotHandler {
    pub(super) async fn handle_adding_members(
        &self,
        principal: &str,
        event_id: &str,
        text: &str,
        state: &mut ConversationState,
    ) -> anyhow::Result<()> {
        let Some(event) = Event::find_by_id(&self.db.pool, event_id).await? else {
            tracing::warn!("{} was adding members to missing event {}", principal, event_id);
            *state = ConversationState::idle();
            self.reply(principal, &replies::event_missing()).await;
            return Ok(());
        };

        if commands::is_done(text) {
            let total = Member::count_for_event(&self.db.pool, event_id).await?;
            *state = ConversationState::idle();
            self.reply(principal, &replies::members_done(&event.title, total, &event.id)).await;
            return Ok(());
        }

        let contacts = parse_contacts(text);
        if contacts.is_empty() {
            self.reply(principal, &replies::members_not_parsed()).await;
            return Ok(());
        }

        let total = Member::add_batch(&self.db.pool, event_id, &contacts).await?;
        log_database_operation(
            "add_batch",
            "members",
            Some(&format!("{} added to {} ({} total)", contacts.len(), event_id, total)),
        );
        self.reply(principal, &replies::members_added(contacts.len(), total, &event.title)).await;

        Ok(())
    }
}
