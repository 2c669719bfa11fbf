use super::BotHandler;
use crate::bot::commands;
use crate::bot::conversation::{ConversationState, PaymentHint};
use crate::bot::replies;
use crate::database::models::{Admin, Event, Member, PaidReceipt};
use crate::services::messaging::deliver;
use crate::utils::logging::log_database_error;

/// Result of trying to confirm a payment for a principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Paid {
        member_name: String,
        event_title: String,
    },
    AlreadyPaid,
    NotInUnpaidEvent,
    /// Several unpaid events match; nothing was changed.
    Ambiguous {
        titles: Vec<String>,
    },
}

impl PaymentOutcome {
    fn reply(&self) -> String {
        match self {
            PaymentOutcome::Paid { member_name, event_title } => {
                replies::payment_thanks(member_name, event_title)
            }
            PaymentOutcome::AlreadyPaid => replies::already_paid(),
            PaymentOutcome::NotInUnpaidEvent => replies::not_in_unpaid_event(),
            PaymentOutcome::Ambiguous { titles } => replies::ambiguous_payment(titles),
        }
    }
}

impl BotHandler {
    /// Confirms a payment and answers the principal.
    pub(super) async fn handle_payment(
        &self,
        principal: &str,
        text: &str,
        state: &mut ConversationState,
    ) -> anyhow::Result<()> {
        let mut hint = match state {
            ConversationState::Idle { payment_hint } => payment_hint.take(),
            _ => None,
        };

        let outcome = self.resolve_payment(principal, text, &mut hint).await;
        *state = ConversationState::Idle { payment_hint: hint };
        let outcome = outcome?;

        tracing::info!("Payment confirmation from {}: {:?}", principal, outcome);
        self.reply(principal, &outcome.reply()).await;
        Ok(())
    }

    /// Resolves one unpaid membership of the principal.
    ///
    /// Tries, in order: the event recorded in the hint, the event named in a
    /// `paid <title>` message, then the only unpaid membership. With several
    /// candidates nothing is changed and the hint asks for a choice next time.
    pub async fn resolve_payment(
        &self,
        principal: &str,
        text: &str,
        hint: &mut Option<PaymentHint>,
    ) -> anyhow::Result<PaymentOutcome> {
        if let Some(PaymentHint::AwaitingPaymentFor { event_id }) = hint.take() {
            return self.mark_paid(principal, &event_id).await;
        }

        let unpaid = Member::find_unpaid_by_address(&self.db.pool, principal).await?;

        if let Some(requested) = commands::requested_event_title(text) {
            if let Some(membership) = unpaid.iter().find(|m| m.event_title.to_lowercase() == requested) {
                return self.mark_paid(principal, &membership.event_id).await;
            }

            // Named an event the principal belongs to but no longer owes
            let events = Event::find_for_member_address(&self.db.pool, principal).await?;
            if events.iter().any(|e| e.title.to_lowercase() == requested) {
                return Ok(PaymentOutcome::AlreadyPaid);
            }
        }

        match unpaid.as_slice() {
            [] => Ok(PaymentOutcome::NotInUnpaidEvent),
            [only] => self.mark_paid(principal, &only.event_id).await,
            several => {
                *hint = Some(PaymentHint::MustDisambiguate);
                Ok(PaymentOutcome::Ambiguous {
                    titles: several.iter().map(|m| m.event_title.clone()).collect(),
                })
            }
        }
    }

    /// Reply to a disambiguation prompt that only names the event.
    ///
    /// Returns false when the text matches none of the principal's unpaid events.
    pub(super) async fn handle_event_selection(
        &self,
        principal: &str,
        text: &str,
        state: &mut ConversationState,
    ) -> anyhow::Result<bool> {
        let wanted = text.trim().to_lowercase();
        let unpaid = Member::find_unpaid_by_address(&self.db.pool, principal).await?;

        let Some(selected) = unpaid.iter().find(|m| m.event_title.to_lowercase() == wanted) else {
            return Ok(false);
        };

        *state = ConversationState::Idle {
            payment_hint: Some(PaymentHint::AwaitingPaymentFor {
                event_id: selected.event_id.clone(),
            }),
        };
        self.handle_payment(principal, text, state).await?;
        Ok(true)
    }

    async fn mark_paid(&self, principal: &str, event_id: &str) -> anyhow::Result<PaymentOutcome> {
        match Member::set_paid(&self.db.pool, principal, event_id).await? {
            Some(receipt) => {
                self.notify_admin(&receipt).await;
                Ok(PaymentOutcome::Paid {
                    member_name: receipt.member_name,
                    event_title: receipt.event_title,
                })
            }
            None => Ok(PaymentOutcome::AlreadyPaid),
        }
    }

    /// Tells the organizer who paid. The payment stands even if this fails.
    async fn notify_admin(&self, receipt: &PaidReceipt) {
        match Admin::find_by_id(&self.db.pool, receipt.admin_id).await {
            Ok(Some(admin)) => {
                let notice = replies::admin_payment_notice(
                    &receipt.member_name,
                    &receipt.member_phone,
                    &receipt.event_title,
                );
                deliver(self.sender.as_ref(), &admin.phone, &notice).await;
            }
            Ok(None) => tracing::warn!("Admin {} not found for paid event {}", receipt.admin_id, receipt.event_title),
            Err(e) => log_database_error("find_by_id", "admins", &e.to_string(), None),
        }
    }
}
