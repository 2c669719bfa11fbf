use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::database::models::ReminderStyle;

/// Follow-up context for a principal that is confirming a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentHint {
    /// The next confirmation should resolve against this event first.
    AwaitingPaymentFor { event_id: String },
    /// The principal was shown several unpaid events and must pick one.
    MustDisambiguate,
}

/// Where a principal is in the conversation, carrying only the fields
/// entered so far.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationState {
    Idle {
        payment_hint: Option<PaymentHint>,
    },
    CreatingEventName,
    CreatingEventAmount {
        title: String,
    },
    CreatingEventStyle {
        title: String,
        amount: f64,
    },
    CreatingEventFreq {
        title: String,
        amount: f64,
        style: ReminderStyle,
    },
    CreatingEventDelay {
        title: String,
        amount: f64,
        style: ReminderStyle,
        interval_minutes: i64,
    },
    AddingMembers {
        event_id: String,
    },
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::idle()
    }
}

impl ConversationState {
    pub fn idle() -> Self {
        ConversationState::Idle { payment_hint: None }
    }

    pub fn step(&self) -> Step {
        match self {
            ConversationState::Idle { .. } => Step::Idle,
            ConversationState::CreatingEventName => Step::CreatingEventName,
            ConversationState::CreatingEventAmount { .. } => Step::CreatingEventAmount,
            ConversationState::CreatingEventStyle { .. } => Step::CreatingEventStyle,
            ConversationState::CreatingEventFreq { .. } => Step::CreatingEventFreq,
            ConversationState::CreatingEventDelay { .. } => Step::CreatingEventDelay,
            ConversationState::AddingMembers { .. } => Step::AddingMembers,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ConversationState::Idle { .. })
    }

    pub fn payment_hint(&self) -> Option<&PaymentHint> {
        match self {
            ConversationState::Idle { payment_hint } => payment_hint.as_ref(),
            _ => None,
        }
    }
}

/// Tag of a [`ConversationState`], for logs and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Idle,
    CreatingEventName,
    CreatingEventAmount,
    CreatingEventStyle,
    CreatingEventFreq,
    CreatingEventDelay,
    AddingMembers,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Idle => "IDLE",
            Step::CreatingEventName => "CREATING_EVENT_NAME",
            Step::CreatingEventAmount => "CREATING_EVENT_AMOUNT",
            Step::CreatingEventStyle => "CREATING_EVENT_STYLE",
            Step::CreatingEventFreq => "CREATING_EVENT_FREQ",
            Step::CreatingEventDelay => "CREATING_EVENT_DELAY",
            Step::AddingMembers => "ADDING_MEMBERS",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Slot = Arc<AsyncMutex<ConversationState>>;

/// Conversation state keyed by principal address.
///
/// Each principal has its own lock: holding the guard from [`lock`](Self::lock)
/// serializes message handling for that principal while other principals
/// proceed. A principal back in plain idle is dropped from the map by
/// [`release`](Self::release), so the map only holds conversations in
/// progress. State lives only as long as the process.
#[derive(Clone, Default)]
pub struct ConversationStore {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn slot(&self, principal: &str) -> Slot {
        self.slots().entry(principal.to_string()).or_default().clone()
    }

    /// Waits for exclusive access to the principal's state.
    ///
    /// Call [`release`](Self::release) after dropping the guard.
    pub async fn lock(&self, principal: &str) -> OwnedMutexGuard<ConversationState> {
        self.slot(principal).lock_owned().await
    }

    /// Forgets the principal if nobody holds or waits on its slot and the
    /// state is the default idle one.
    pub fn release(&self, principal: &str) {
        let mut slots = self.slots();
        let Some(slot) = slots.get(principal) else {
            return;
        };

        // Clones are only handed out under the map lock, so a count of one
        // means no guard and no waiter exists.
        if Arc::strong_count(slot) != 1 {
            return;
        }
        let forgettable = slot
            .try_lock()
            .map(|state| *state == ConversationState::idle())
            .unwrap_or(false);
        if forgettable {
            slots.remove(principal);
        }
    }

    /// Copy of the principal's current state; unseen principals are idle.
    pub async fn snapshot(&self, principal: &str) -> ConversationState {
        let existing = self.slots().get(principal).cloned();
        match existing {
            Some(slot) => slot.lock().await.clone(),
            None => ConversationState::idle(),
        }
    }

    pub async fn set(&self, principal: &str, state: ConversationState) {
        *self.lock(principal).await = state;
        self.release(principal);
    }

    /// Number of principals with a conversation in progress.
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
