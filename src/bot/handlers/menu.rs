use super::BotHandler;
use crate::bot::commands::{classify_idle, IdleCommand};
use crate::bot::conversation::{ConversationState, PaymentHint};
use crate::bot::replies;
use crate::database::models::{Event, Member};

impl BotHandler {
    pub(super) async fn handle_idle(
        &self,
        principal: &str,
        text: &str,
        state: &mut ConversationState,
    ) -> anyhow::Result<()> {
        match classify_idle(text) {
            IdleCommand::CreateEvent => {
                *state = ConversationState::CreatingEventName;
                self.reply(principal, &replies::ask_event_name()).await;
            }
            IdleCommand::MyEvents => self.show_member_events(principal).await?,
            IdleCommand::Help => self.reply(principal, &replies::help()).await,
            IdleCommand::Paid => self.handle_payment(principal, text, state).await?,
            IdleCommand::Unrecognized => {
                let awaiting_choice = state.payment_hint() == Some(&PaymentHint::MustDisambiguate);
                let selected = awaiting_choice
                    && self.handle_event_selection(principal, text, state).await?;
                if !selected {
                    self.reply(principal, &replies::main_menu()).await;
                }
            }
        }
        Ok(())
    }

    async fn show_member_events(&self, principal: &str) -> anyhow::Result<()> {
        let events = Event::find_for_member_address(&self.db.pool, principal).await?;
        if events.is_empty() {
            self.reply(principal, &replies::not_in_any_event()).await;
            return Ok(());
        }

        let mut lines = Vec::with_capacity(events.len());
        for event in events {
            let unpaid = Member::count_unpaid_for_event(&self.db.pool, &event.id).await?;
            lines.push((event.title, event.amount, event.style, unpaid));
        }

        self.reply(principal, &replies::member_events(&lines)).await;
        Ok(())
    }
}
