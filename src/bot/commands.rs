use thiserror::Error;

use crate::bot::handlers::event_creation::{EventDraft, DEFAULT_DELAY_MINUTES, DEFAULT_INTERVAL_MINUTES};
use crate::database::models::ReminderStyle;
use crate::utils::validation::{parse_amount, parse_delay_minutes, parse_interval_minutes};

const ONE_SHOT_PREFIX: &str = "create event:";
const PAID_KEYWORD: &str = "paid";

/// What an idle principal asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleCommand {
    /// Menu item 1: start the step-by-step event wizard
    CreateEvent,
    /// Menu item 2: list events the principal belongs to
    MyEvents,
    /// Menu item 3
    Help,
    /// Payment confirmation
    Paid,
    Unrecognized,
}

pub fn classify_idle(text: &str) -> IdleCommand {
    let text = text.trim();
    match text {
        "1" => IdleCommand::CreateEvent,
        "2" => IdleCommand::MyEvents,
        "3" => IdleCommand::Help,
        _ if text.eq_ignore_ascii_case("help") => IdleCommand::Help,
        _ if mentions_paid(text) => IdleCommand::Paid,
        _ => IdleCommand::Unrecognized,
    }
}

pub fn is_one_shot_create(text: &str) -> bool {
    text.trim_start()
        .get(..ONE_SHOT_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(ONE_SHOT_PREFIX))
}

pub fn is_done(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("done")
}

pub fn is_cancel(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("cancel")
}

/// True when any word of the message is the payment keyword.
pub fn mentions_paid(text: &str) -> bool {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .any(|word| word.eq_ignore_ascii_case(PAID_KEYWORD))
}

/// Lower-cased event title from a `paid <title>` message.
pub fn requested_event_title(text: &str) -> Option<String> {
    let mut tokens = text.trim().splitn(2, char::is_whitespace);
    let keyword = tokens.next()?;
    let title = tokens.next()?.trim();

    if keyword.eq_ignore_ascii_case(PAID_KEYWORD) && !title.is_empty() {
        Some(title.to_lowercase())
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OneShotError {
    #[error("a title and an amount are required")]
    MissingArguments,
    #[error("amount must be a positive number")]
    InvalidAmount,
    #[error("invalid freq= value (must be 1 to 525600 minutes, e.g. freq=30)")]
    InvalidFrequency,
    #[error("invalid delay= value (must be 0 to 525600 minutes, e.g. delay=10)")]
    InvalidDelay,
}

/// Parses `create event: Title Amount [style] [freq=MINUTES] [delay=MINUTES]`.
///
/// The title is the first word. Tokens that are neither a style nor a
/// `freq=`/`delay=` option are ignored.
pub fn parse_one_shot(text: &str) -> Result<EventDraft, OneShotError> {
    let content = text
        .split_once(':')
        .map(|(_, rest)| rest)
        .ok_or(OneShotError::MissingArguments)?;
    let parts: Vec<&str> = content.split_whitespace().collect();

    if parts.len() < 2 {
        return Err(OneShotError::MissingArguments);
    }

    let title = parts[0].to_string();
    let amount = parse_amount(parts[1]).ok_or(OneShotError::InvalidAmount)?;

    let mut style = ReminderStyle::default();
    let mut interval_minutes = DEFAULT_INTERVAL_MINUTES;
    let mut delay_minutes = DEFAULT_DELAY_MINUTES;

    for part in &parts[2..] {
        let lowered = part.to_lowercase();
        if let Ok(parsed) = lowered.parse::<ReminderStyle>() {
            style = parsed;
        } else if let Some(value) = lowered.strip_prefix("freq=") {
            interval_minutes = parse_interval_minutes(value).ok_or(OneShotError::InvalidFrequency)?;
        } else if let Some(value) = lowered.strip_prefix("delay=") {
            delay_minutes = parse_delay_minutes(value).ok_or(OneShotError::InvalidDelay)?;
        }
    }

    Ok(EventDraft {
        title,
        amount,
        style,
        interval_minutes,
        delay_minutes,
    })
}
