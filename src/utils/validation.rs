use anyhow::{anyhow, Result};

const CHANNEL_PREFIX: &str = "whatsapp:";

pub const MAX_TITLE_CHARS: usize = 100;
/// Upper bound for both the reminder interval and the first-reminder delay.
pub const MAX_SCHEDULE_MINUTES: i64 = 60 * 24 * 365;

/// Strips the channel prefix from an inbound sender, leaving the bare address.
pub fn normalize_address(sender: &str) -> String {
    let sender = sender.trim();
    match sender.get(..CHANNEL_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(CHANNEL_PREFIX) => {
            sender[CHANNEL_PREFIX.len()..].trim().to_string()
        }
        _ => sender.to_string(),
    }
}

pub fn validate_event_title(title: &str) -> Result<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(anyhow!("Event title cannot be empty"));
    }

    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(anyhow!("Event title cannot be longer than {} characters", MAX_TITLE_CHARS));
    }

    if title.contains('\n') || title.contains('\r') {
        return Err(anyhow!("Event title cannot contain line breaks"));
    }

    Ok(())
}

/// Per-member amount: a finite number greater than zero.
pub fn parse_amount(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
}

/// Reminder interval in minutes: `1..=MAX_SCHEDULE_MINUTES`.
pub fn parse_interval_minutes(input: &str) -> Option<i64> {
    input
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|minutes| (1..=MAX_SCHEDULE_MINUTES).contains(minutes))
}

/// Delay before the first reminder in minutes: `0..=MAX_SCHEDULE_MINUTES`.
pub fn parse_delay_minutes(input: &str) -> Option<i64> {
    input
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|minutes| (0..=MAX_SCHEDULE_MINUTES).contains(minutes))
}

/// Renders an amount without a trailing `.0` for whole numbers.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{}", amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_address() {
        assert_eq!(normalize_address("whatsapp:+15551234567"), "+15551234567");
        assert_eq!(normalize_address("WhatsApp:+15551234567 "), "+15551234567");
        assert_eq!(normalize_address("+15551234567"), "+15551234567");
        assert_eq!(normalize_address(""), "");
    }

    #[test]
    fn test_validate_event_title() {
        assert!(validate_event_title("Picnic").is_ok());
        assert!(validate_event_title("  Summer Trip  ").is_ok());
        assert!(validate_event_title("").is_err());
        assert!(validate_event_title("   ").is_err());
        assert!(validate_event_title("Two\nLines").is_err());
        assert!(validate_event_title(&"a".repeat(101)).is_err());
        assert!(validate_event_title(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("50"), Some(50.0));
        assert_eq!(parse_amount(" 12.5 "), Some(12.5));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("0"), None);
        assert_eq!(parse_amount("-5"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("NaN"), None);
    }

    #[test]
    fn test_parse_interval_minutes() {
        assert_eq!(parse_interval_minutes("30"), Some(30));
        assert_eq!(parse_interval_minutes("0"), None);
        assert_eq!(parse_interval_minutes("-10"), None);
        assert_eq!(parse_interval_minutes("hourly"), None);
        assert_eq!(parse_interval_minutes("1.5"), None);
        assert_eq!(parse_interval_minutes("525600"), Some(MAX_SCHEDULE_MINUTES));
        assert_eq!(parse_interval_minutes("525601"), None);
        assert_eq!(parse_interval_minutes("4611686018427387904"), None);
    }

    #[test]
    fn test_parse_delay_minutes() {
        assert_eq!(parse_delay_minutes("0"), Some(0));
        assert_eq!(parse_delay_minutes("45"), Some(45));
        assert_eq!(parse_delay_minutes("-1"), None);
        assert_eq!(parse_delay_minutes("soon"), None);
        assert_eq!(parse_delay_minutes("9000000000000"), None);
        assert_eq!(parse_delay_minutes("99999999999999999999"), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(50.0), "50");
        assert_eq!(format_amount(12.5), "12.5");
    }
}
