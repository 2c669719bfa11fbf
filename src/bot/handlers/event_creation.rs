use chrono::{DateTime, Utc};

use super::BotHandler;
use crate::bot::commands;
use crate::bot::conversation::ConversationState;
use crate::bot::replies;
use crate::database::models::{Event, NewEvent, ReminderStyle};
use crate::database::RepositoryError;
use crate::utils::datetime::after_minutes;
use crate::utils::validation::{validate_event_title, MAX_SCHEDULE_MINUTES};

pub const DEFAULT_INTERVAL_MINUTES: i64 = 60;
pub const DEFAULT_DELAY_MINUTES: i64 = 0;

/// A fully entered event, from the wizard or the one-shot command.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub amount: f64,
    pub style: ReminderStyle,
    pub interval_minutes: i64,
    pub delay_minutes: i64,
}

impl EventDraft {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_event_title(&self.title)?;

        if !(self.amount.is_finite() && self.amount > 0.0) {
            anyhow::bail!("amount must be a positive number");
        }
        if !(1..=MAX_SCHEDULE_MINUTES).contains(&self.interval_minutes) {
            anyhow::bail!(
                "reminder interval must be between 1 and {} minutes",
                MAX_SCHEDULE_MINUTES
            );
        }
        if !(0..=MAX_SCHEDULE_MINUTES).contains(&self.delay_minutes) {
            anyhow::bail!(
                "first reminder delay must be between 0 and {} minutes",
                MAX_SCHEDULE_MINUTES
            );
        }

        Ok(())
    }

    /// The event to store, with the first reminder `delay_minutes` after `now`.
    pub fn into_new_event(self, now: DateTime<Utc>) -> anyhow::Result<NewEvent> {
        let start_time = after_minutes(now, self.delay_minutes)
            .ok_or_else(|| anyhow::anyhow!("first reminder time is out of range"))?;

        Ok(NewEvent {
            title: self.title.trim().to_string(),
            amount: self.amount,
            style: self.style,
            interval_minutes: self.interval_minutes,
            start_time,
        })
    }
}

impl BotHandler {
    pub(super) async fn handle_one_shot(
        &self,
        principal: &str,
        text: &str,
        now: DateTime<Utc>,
        state: &mut ConversationState,
    ) -> anyhow::Result<()> {
        match commands::parse_one_shot(text) {
            Ok(draft) => self.create_event(principal, draft, now, state).await,
            Err(e) => {
                tracing::debug!("Malformed create command from {}: {}", principal, e);
                self.reply(principal, &replies::one_shot_usage(&e.to_string())).await;
            }
        }
        Ok(())
    }

    /// Shared terminal step of both creation paths.
    ///
    /// Leaves the principal in `AddingMembers` on success and idle on every
    /// failure, so a failed creation never strands anyone inside the wizard.
    pub(super) async fn create_event(
        &self,
        principal: &str,
        draft: EventDraft,
        now: DateTime<Utc>,
        state: &mut ConversationState,
    ) {
        *state = ConversationState::idle();

        let new_event = match draft.validate().and_then(|()| draft.into_new_event(now)) {
            Ok(new_event) => new_event,
            Err(e) => {
                self.reply(principal, &replies::invalid_event(&e.to_string())).await;
                return;
            }
        };
        match Event::create(&self.db.pool, principal, &new_event).await {
            Ok(event) => {
                tracing::info!(
                    "Created event {} for {} ({} every {} min from {})",
                    event.id, principal, event.style, event.interval_minutes, event.start_time
                );
                self.reply(
                    principal,
                    &replies::event_created(&event.title, &event.style, event.interval_minutes, &event.start_time),
                )
                .await;
                *state = ConversationState::AddingMembers { event_id: event.id };
            }
            Err(RepositoryError::Conflict { event_id }) => {
                tracing::info!("Duplicate event {} rejected for {}", event_id, principal);
                self.reply(principal, &replies::duplicate_event(&new_event.title)).await;
            }
            Err(e) => {
                tracing::error!("Failed to create event '{}' for {}: {}", new_event.title, principal, e);
                self.reply(principal, &replies::creation_failed()).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn draft() -> EventDraft {
        EventDraft {
            title: "Picnic".to_string(),
            amount: 50.0,
            style: ReminderStyle::Broker,
            interval_minutes: 30,
            delay_minutes: 15,
        }
    }

    #[test]
    fn test_into_new_event_offsets_start() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let event = draft().into_new_event(now).unwrap();
        assert_eq!(event.start_time, now + Duration::minutes(15));
        assert_eq!(event.interval_minutes, 30);
        assert_eq!(event.style, ReminderStyle::Broker);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(draft().validate().is_ok());
        assert!(EventDraft { title: " ".to_string(), ..draft() }.validate().is_err());
        assert!(EventDraft { amount: 0.0, ..draft() }.validate().is_err());
        assert!(EventDraft { interval_minutes: 0, ..draft() }.validate().is_err());
        assert!(EventDraft { delay_minutes: -1, ..draft() }.validate().is_err());
        assert!(EventDraft { interval_minutes: 1 << 62, ..draft() }.validate().is_err());
        assert!(EventDraft { delay_minutes: 9_000_000_000_000, ..draft() }.validate().is_err());
        assert!(EventDraft { delay_minutes: MAX_SCHEDULE_MINUTES, ..draft() }.validate().is_ok());
    }

    #[test]
    fn test_into_new_event_rejects_unrepresentable_start() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let far = EventDraft { delay_minutes: i64::MAX, ..draft() };
        assert!(far.into_new_event(now).is_err());
    }
}
