use chrono::{DateTime, Utc};

use super::event_creation::{EventDraft, DEFAULT_DELAY_MINUTES, DEFAULT_INTERVAL_MINUTES};
use super::BotHandler;
use crate::bot::conversation::ConversationState;
use crate::bot::replies;
use crate::database::models::ReminderStyle;
use crate::utils::validation::{
    parse_amount, parse_delay_minutes, parse_interval_minutes, validate_event_title,
};

impl BotHandler {
    /// Step-by-step event creation.
    ///
    /// Only the amount step refuses to advance on bad input; style, frequency
    /// and delay fall back to their defaults.
    pub(super) async fn handle_wizard_step(
        &self,
        principal: &str,
        text: &str,
        now: DateTime<Utc>,
        current: ConversationState,
        state: &mut ConversationState,
    ) -> anyhow::Result<()> {
        let step = current.step();
        match current {
            ConversationState::CreatingEventName => {
                if let Err(e) = validate_event_title(text) {
                    self.reply(principal, &replies::invalid_event_name(&e.to_string())).await;
                    return Ok(());
                }
                *state = ConversationState::CreatingEventAmount {
                    title: text.trim().to_string(),
                };
                self.reply(principal, &replies::ask_amount()).await;
            }
            ConversationState::CreatingEventAmount { title } => {
                let Some(amount) = parse_amount(text) else {
                    tracing::debug!("Rejected amount {:?} from {}", text, principal);
                    self.reply(principal, &replies::invalid_amount()).await;
                    return Ok(());
                };
                *state = ConversationState::CreatingEventStyle { title, amount };
                self.reply(principal, &replies::ask_style()).await;
            }
            ConversationState::CreatingEventStyle { title, amount } => {
                let style = text.parse::<ReminderStyle>().unwrap_or_default();
                *state = ConversationState::CreatingEventFreq { title, amount, style };
                self.reply(principal, &replies::ask_frequency(DEFAULT_INTERVAL_MINUTES)).await;
            }
            ConversationState::CreatingEventFreq { title, amount, style } => {
                let interval_minutes = parse_interval_minutes(text).unwrap_or(DEFAULT_INTERVAL_MINUTES);
                *state = ConversationState::CreatingEventDelay {
                    title,
                    amount,
                    style,
                    interval_minutes,
                };
                self.reply(principal, &replies::ask_delay(DEFAULT_DELAY_MINUTES)).await;
            }
            ConversationState::CreatingEventDelay { title, amount, style, interval_minutes } => {
                let delay_minutes = parse_delay_minutes(text).unwrap_or(DEFAULT_DELAY_MINUTES);
                let draft = EventDraft {
                    title,
                    amount,
                    style,
                    interval_minutes,
                    delay_minutes,
                };
                self.create_event(principal, draft, now, state).await;
            }
            ConversationState::Idle { .. } | ConversationState::AddingMembers { .. } => {
                tracing::warn!("{} is not a wizard step", step);
            }
        }

        Ok(())
    }
}
