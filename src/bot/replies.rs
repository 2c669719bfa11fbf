//! Texts sent back to principals. WhatsApp renders `*bold*` and `` `code` ``.

use chrono::{DateTime, Utc};

use crate::database::models::ReminderStyle;
use crate::utils::datetime::format_datetime;
use crate::utils::validation::{format_amount, MAX_TITLE_CHARS};

/// Tone of a reply, shown as a leading emoji.
#[derive(Debug, Clone, Copy)]
pub enum FeedbackType {
    Success,
    Warning,
    Error,
    Info,
    Prompt,
}

impl FeedbackType {
    fn emoji(&self) -> &'static str {
        match self {
            FeedbackType::Success => "✅",
            FeedbackType::Warning => "⚠️",
            FeedbackType::Error => "❌",
            FeedbackType::Info => "ℹ️",
            FeedbackType::Prompt => "👉",
        }
    }
}

pub fn feedback(kind: FeedbackType, message: &str) -> String {
    format!("{} {}", kind.emoji(), message)
}

pub fn main_menu() -> String {
    "👋 Hi! What would you like to do?\n\n\
     1️⃣ Create an event\n\
     2️⃣ Show my events\n\
     3️⃣ Help"
        .to_string()
}

pub fn help() -> String {
    feedback(
        FeedbackType::Info,
        "Send *1* to create an event step by step, or in one message:\n\
         `create event: Title Amount [style] [freq=MINUTES] [delay=MINUTES]`\n\
         Example: `create event: Picnic 50 mafia freq=120 delay=30`\n\n\
         Styles: mafia, grandpa, broker (default: mafia).\n\
         Participants confirm with *paid* (or *paid <event>*).",
    )
}

fn event_name_question() -> String {
    format!("What is the event called? (one line, up to {} characters)", MAX_TITLE_CHARS)
}

pub fn ask_event_name() -> String {
    feedback(FeedbackType::Prompt, &event_name_question())
}

pub fn invalid_event_name(reason: &str) -> String {
    feedback(FeedbackType::Error, &format!("{}. {}", reason, event_name_question()))
}

pub fn ask_amount() -> String {
    feedback(FeedbackType::Prompt, "How much should each participant pay? (numbers only)")
}

pub fn invalid_amount() -> String {
    feedback(
        FeedbackType::Error,
        "Please enter a valid amount (a positive number). How much should each participant pay?",
    )
}

pub fn ask_style() -> String {
    let styles: Vec<&str> = ReminderStyle::ALL.iter().map(|s| s.as_str()).collect();
    feedback(
        FeedbackType::Prompt,
        &format!(
            "Which reminder style? ({}) Default: {}",
            styles.join(", "),
            ReminderStyle::default()
        ),
    )
}

pub fn ask_frequency(default_minutes: i64) -> String {
    feedback(
        FeedbackType::Prompt,
        &format!("How many minutes between reminders? (default: {})", default_minutes),
    )
}

pub fn ask_delay(default_minutes: i64) -> String {
    feedback(
        FeedbackType::Prompt,
        &format!("How many minutes to wait before the first reminder? (default: {})", default_minutes),
    )
}

pub fn event_created(
    title: &str,
    style: &str,
    interval_minutes: i64,
    start_time: &DateTime<Utc>,
) -> String {
    format!(
        "📌 Event *{}* created (style: {}).\n\
         ⏳ Reminders every {} minutes, starting {}.\n\
         📇 Paste the participants (name + phone), then send *done*.",
        title,
        style,
        interval_minutes,
        format_datetime(start_time)
    )
}

pub fn duplicate_event(title: &str) -> String {
    feedback(
        FeedbackType::Warning,
        &format!(
            "You already have an event named *{}*. Choose another title.",
            title
        ),
    )
}

pub fn invalid_event(reason: &str) -> String {
    feedback(FeedbackType::Error, &format!("Could not create the event: {}.", reason))
}

pub fn creation_failed() -> String {
    feedback(FeedbackType::Error, "Something went wrong while creating the event. Please try again.")
}

pub fn one_shot_usage(reason: &str) -> String {
    feedback(
        FeedbackType::Error,
        &format!(
            "{}.\nFormat: `create event: Title Amount [style] [freq=MINUTES] [delay=MINUTES]`\n\
             Example: `create event: Picnic 50 mafia freq=30 delay=10`",
            capitalize(reason)
        ),
    )
}

pub fn wizard_cancelled() -> String {
    feedback(FeedbackType::Info, "Cancelled. Send anything to see the menu.")
}

pub fn members_added(added: usize, total: i64, title: &str) -> String {
    feedback(
        FeedbackType::Success,
        &format!(
            "Added {} participants to *{}* ({} so far).\nSend more or write *done* to finish.",
            added, title, total
        ),
    )
}

pub fn members_not_parsed() -> String {
    feedback(
        FeedbackType::Error,
        "I couldn't read any participants. Paste names with phone numbers and try again.",
    )
}

pub fn members_done(title: &str, total: i64, event_id: &str) -> String {
    feedback(
        FeedbackType::Success,
        &format!(
            "Event *{}* is ready with {} participants.\n📇 Event id: `{}`",
            title, total, event_id
        ),
    )
}

pub fn event_missing() -> String {
    feedback(FeedbackType::Warning, "That event no longer exists. Back to the menu.")
}

pub fn not_in_any_event() -> String {
    "📋 You are not part of any event yet.".to_string()
}

/// One line per event: (title, amount, style, unpaid count).
pub fn member_events(events: &[(String, f64, String, i64)]) -> String {
    let mut lines = vec!["📋 You are part of these events:".to_string()];
    for (title, amount, style, unpaid) in events {
        lines.push(format!(
            "• *{}* – {} ({}) | {} unpaid",
            title,
            format_amount(*amount),
            style,
            unpaid
        ));
    }
    lines.join("\n")
}

pub fn payment_thanks(member_name: &str, event_title: &str) -> String {
    feedback(
        FeedbackType::Success,
        &format!("Thanks {}! Marked as paid for *{}*.", member_name, event_title),
    )
}

pub fn already_paid() -> String {
    feedback(FeedbackType::Warning, "You are already marked as paid for this event.")
}

pub fn not_in_unpaid_event() -> String {
    feedback(FeedbackType::Warning, "You are not in any unpaid event.")
}

pub fn ambiguous_payment(titles: &[String]) -> String {
    feedback(
        FeedbackType::Warning,
        &format!(
            "You are in several unpaid events: {}. Reply with the event name (e.g. *paid {}*).",
            titles.join(", "),
            titles.first().map(String::as_str).unwrap_or("Picnic")
        ),
    )
}

pub fn admin_payment_notice(member_name: &str, member_phone: &str, event_title: &str) -> String {
    format!("{} ({}) paid for {}.", member_name, member_phone, event_title)
}

pub fn generic_failure() -> String {
    feedback(FeedbackType::Error, "Something went wrong. Please try again.")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
