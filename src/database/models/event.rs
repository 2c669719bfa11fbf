use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use super::admin::Admin;
use crate::database::error::{is_unique_violation, RepositoryError};

/// Tone of the reminder messages sent for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStyle {
    #[default]
    Mafia,
    Grandpa,
    Broker,
}

impl ReminderStyle {
    pub const ALL: [ReminderStyle; 3] = [
        ReminderStyle::Mafia,
        ReminderStyle::Grandpa,
        ReminderStyle::Broker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderStyle::Mafia => "mafia",
            ReminderStyle::Grandpa => "grandpa",
            ReminderStyle::Broker => "broker",
        }
    }
}

impl fmt::Display for ReminderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mafia" => Ok(ReminderStyle::Mafia),
            "grandpa" => Ok(ReminderStyle::Grandpa),
            "broker" => Ok(ReminderStyle::Broker),
            other => Err(format!("unknown reminder style '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub style: String,
    pub interval_minutes: i64,
    pub start_time: DateTime<Utc>,
    pub last_reminder_at: Option<DateTime<Utc>>,
    pub admin_id: i64,
    pub created_at: String,
}

/// Fields needed to register an event for an organizer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub amount: f64,
    pub style: ReminderStyle,
    pub interval_minutes: i64,
    pub start_time: DateTime<Utc>,
}

const EVENT_COLUMNS: &str =
    "id, title, amount, style, interval_minutes, start_time, last_reminder_at, admin_id, created_at";

impl Event {
    /// Event identity: owner address plus the lower-cased title.
    pub fn derive_id(owner_phone: &str, title: &str) -> String {
        format!("{}-{}", owner_phone, title.trim().to_lowercase())
    }

    /// Creates the event, registering its organizer on first sight.
    ///
    /// Fails with [`RepositoryError::Conflict`] when the organizer already owns
    /// an event with the same normalized title; nothing is written in that case.
    pub async fn create(
        pool: &sqlx::SqlitePool,
        owner_phone: &str,
        new_event: &NewEvent,
    ) -> Result<Self, RepositoryError> {
        let id = Self::derive_id(owner_phone, &new_event.title);
        let now = Utc::now().to_rfc3339();

        let mut tx = pool.begin().await?;
        let admin = Admin::find_or_create(&mut *tx, owner_phone).await?;

        let inserted = sqlx::query(
            "INSERT INTO events (id, title, amount, style, interval_minutes, start_time, admin_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(new_event.title.trim())
        .bind(new_event.amount)
        .bind(new_event.style.as_str())
        .bind(new_event.interval_minutes)
        .bind(new_event.start_time)
        .bind(admin.id)
        .bind(&now)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            if is_unique_violation(&e) {
                return Err(RepositoryError::Conflict { event_id: id });
            }
            return Err(e.into());
        }

        tx.commit().await?;

        Self::find_by_id(pool, &id)
            .await?
            .ok_or(RepositoryError::NotFound(format!("event {}", id)))
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        event_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS);
        sqlx::query_as::<_, Event>(&query)
            .bind(event_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_all(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM events ORDER BY created_at, rowid", EVENT_COLUMNS);
        sqlx::query_as::<_, Event>(&query)
            .fetch_all(pool)
            .await
    }

    /// Events in which the address is listed as a member, paid or not.
    pub async fn find_for_member_address(
        pool: &sqlx::SqlitePool,
        phone: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let (with_plus, without_plus) = phone_variants(phone);
        sqlx::query_as::<_, Event>(
            "SELECT e.id, e.title, e.amount, e.style, e.interval_minutes, e.start_time,
                    e.last_reminder_at, e.admin_id, e.created_at
             FROM events e
             WHERE e.id IN (SELECT m.event_id FROM members m WHERE m.phone IN (?, ?))
             ORDER BY e.created_at, e.rowid"
        )
        .bind(with_plus)
        .bind(without_plus)
        .fetch_all(pool)
        .await
    }

    /// Records the reminder slot that was fired for this event.
    pub async fn record_reminder_slot(
        pool: &sqlx::SqlitePool,
        event_id: &str,
        slot: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE events SET last_reminder_at = ? WHERE id = ?")
            .bind(slot)
            .bind(event_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Parsed style, `None` when the stored text is not a known style.
    pub fn reminder_style(&self) -> Option<ReminderStyle> {
        self.style.parse().ok()
    }
}

/// The stored phone may or may not carry a leading `+`; match both spellings.
pub(crate) fn phone_variants(phone: &str) -> (String, String) {
    let bare = phone.trim().trim_start_matches('+');
    (format!("+{}", bare), bare.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_parsing_is_case_insensitive() {
        assert_eq!("Grandpa".parse::<ReminderStyle>(), Ok(ReminderStyle::Grandpa));
        assert_eq!(" broker ".parse::<ReminderStyle>(), Ok(ReminderStyle::Broker));
        assert!("pirate".parse::<ReminderStyle>().is_err());
        assert_eq!(ReminderStyle::default(), ReminderStyle::Mafia);
    }

    #[test]
    fn test_derive_id_lowercases_title() {
        assert_eq!(Event::derive_id("+15550001111", "Picnic"), "+15550001111-picnic");
        assert_eq!(Event::derive_id("+15550001111", " PICNIC "), "+15550001111-picnic");
    }

    #[test]
    fn test_phone_variants() {
        assert_eq!(
            phone_variants("+15551234567"),
            ("+15551234567".to_string(), "15551234567".to_string())
        );
        assert_eq!(
            phone_variants("15551234567"),
            ("+15551234567".to_string(), "15551234567".to_string())
        );
    }
}
