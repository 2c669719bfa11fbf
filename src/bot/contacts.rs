use once_cell::sync::Lazy;
use regex::Regex;

use crate::database::models::NewMember;

/// Name used when a line holds a phone number and nothing else.
pub const UNKNOWN_NAME: &str = "Unknown";

#[allow(clippy::expect_used)]
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\d{9,15}").expect("phone pattern is a valid regex"));

fn find_phone(line: &str) -> Option<&str> {
    PHONE_PATTERN.find(line).map(|m| m.as_str())
}

/// Extracts name/phone records from a pasted block of contacts.
///
/// Accepts "name" then "phone" on consecutive lines as well as "name phone"
/// on a single line. Lines that match neither shape are skipped, so the scan
/// always terminates. Records keep input order and are not deduplicated.
pub fn parse_contacts(text: &str) -> Vec<NewMember> {
    let lines: Vec<&str> = text.trim().lines().map(str::trim).collect();
    let mut members = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if let Some(phone) = find_phone(line) {
            let name = line.replace(phone, "");
            let name = name.trim();
            members.push(NewMember {
                name: if name.is_empty() { UNKNOWN_NAME.to_string() } else { name.to_string() },
                phone: phone.to_string(),
            });
            i += 1;
        } else if let Some(phone) = lines.get(i + 1).and_then(|next| find_phone(next)) {
            members.push(NewMember {
                name: line.to_string(),
                phone: phone.to_string(),
            });
            i += 2;
        } else {
            i += 1;
        }
    }

    members
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, phone: &str) -> NewMember {
        NewMember { name: name.to_string(), phone: phone.to_string() }
    }

    #[test]
    fn test_mixed_two_line_and_single_line_pairs() {
        let parsed = parse_contacts("Alice\n+15551234567\nBob 15557654321");
        assert_eq!(
            parsed,
            vec![member("Alice", "+15551234567"), member("Bob", "15557654321")]
        );
    }

    #[test]
    fn test_phone_only_line_gets_placeholder_name() {
        let parsed = parse_contacts("+972501234567");
        assert_eq!(parsed, vec![member(UNKNOWN_NAME, "+972501234567")]);
    }

    #[test]
    fn test_noise_lines_are_skipped() {
        let parsed = parse_contacts("Group members:\n\nDana\n0521234567\n~ typing...\n");
        assert_eq!(parsed, vec![member("Dana", "0521234567")]);
    }

    #[test]
    fn test_short_digit_runs_are_not_phones() {
        assert!(parse_contacts("Room 12345\nTable 7").is_empty());
        assert!(parse_contacts("").is_empty());
    }

    #[test]
    fn test_name_after_phone_on_same_line() {
        let parsed = parse_contacts("+15551234567 Eve");
        assert_eq!(parsed, vec![member("Eve", "+15551234567")]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let parsed = parse_contacts("Sam 15550000001\nSam 15550000001");
        assert_eq!(parsed.len(), 2);
    }
}
