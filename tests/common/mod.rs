#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use payment_reminder_bot::bot::handlers::BotHandler;
use payment_reminder_bot::database::connection::DatabaseManager;
use payment_reminder_bot::services::messaging::{DeliveryError, MessageSender};
use payment_reminder_bot::services::reminder::ReminderRunner;
use payment_reminder_bot::services::templates::FixedPicker;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const ORGANIZER: &str = "+15550001111";
pub const ALICE: &str = "+15550002222";
pub const BOB: &str = "+15550003333";

/// Captures outbound traffic instead of sending it.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
    unreachable: Mutex<HashSet<String>>,
}

impl RecordingSender {
    pub fn messages(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn messages_to(&self, to: &str) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(recipient, _)| recipient == to)
            .map(|(_, text)| text)
            .collect()
    }

    pub fn last_to(&self, to: &str) -> Option<String> {
        self.messages_to(to).pop()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    /// Every later send to `to` fails.
    pub fn make_unreachable(&self, to: &str) {
        self.unreachable.lock().unwrap().insert(to.to_string());
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, to: &str, text: &str) -> Result<(), DeliveryError> {
        if self.unreachable.lock().unwrap().contains(to) {
            return Err(DeliveryError::Rejected {
                status: 400,
                body: "unreachable".to_string(),
            });
        }
        self.sent.lock().unwrap().push((to.to_string(), text.to_string()));
        Ok(())
    }
}

pub struct TestContext {
    pub db: Arc<DatabaseManager>,
    pub sender: Arc<RecordingSender>,
    pub handler: BotHandler,
    _temp_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let db = DatabaseManager::new(&db_url)
            .await
            .expect("Failed to create test database");
        db.run_migrations().await.expect("Failed to run migrations");
        let db = Arc::new(db);

        let sender = Arc::new(RecordingSender::default());
        let handler = BotHandler::new(db.as_ref().clone(), sender.clone());

        Self {
            db,
            sender,
            handler,
            _temp_dir: temp_dir,
        }
    }

    /// Runner with a one-minute poll that always picks the first variant.
    pub fn runner(&self) -> ReminderRunner {
        ReminderRunner::new(self.db.clone(), self.sender.clone(), Arc::new(FixedPicker(0)), 1)
    }

    pub async fn say(&self, from: &str, text: &str) {
        self.handler.handle_message_at(from, text, now()).await;
    }

    /// Creates an event through the one-shot command and adds the members.
    pub async fn create_event_with_members(&self, owner: &str, command: &str, contacts: &str) -> String {
        self.say(owner, command).await;
        self.say(owner, contacts).await;
        self.say(owner, "done").await;
        self.sender.clear();

        let title = command
            .split_once(':')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .expect("command has a title");
        format!("{}-{}", owner, title.to_lowercase())
    }
}

/// Fixed wall clock for handler calls.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}
