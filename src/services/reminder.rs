use tokio_cron_scheduler::{JobScheduler, Job};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use crate::database::{connection::DatabaseManager, models::*, RepositoryError};
use crate::services::messaging::{deliver, MessageSender};
use crate::services::templates::{render_reminder, VariantPicker};
use crate::utils::logging::{log_database_error, log_reminder_batch, log_system_event};
use std::sync::Arc;

/// Length of one reminder interval in seconds, or `None` when the interval
/// is not positive or does not fit the clock arithmetic.
pub fn period_seconds(interval_minutes: i64) -> Option<i64> {
    if interval_minutes <= 0 {
        return None;
    }
    interval_minutes.checked_mul(60)
}

/// Whether a poll at `now` lands inside a reminder window of the event.
///
/// The window opens at every multiple of `interval_minutes` after `start`
/// and stays open for one poll width.
pub fn is_due(
    start: DateTime<Utc>,
    interval_minutes: i64,
    now: DateTime<Utc>,
    poll_minutes: i64,
) -> bool {
    let Some(period) = period_seconds(interval_minutes) else {
        return false;
    };
    if now < start {
        return false;
    }

    let elapsed = (now - start).num_seconds();
    elapsed % period < poll_minutes.saturating_mul(60)
}

/// Start of the most recent reminder slot `start + k * interval` at or before `now`.
pub fn current_slot(
    start: DateTime<Utc>,
    interval_minutes: i64,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let period = period_seconds(interval_minutes)?;
    if now < start {
        return None;
    }

    let elapsed = (now - start).num_seconds();
    start.checked_add_signed(Duration::try_seconds(elapsed - elapsed % period)?)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub recipients: usize,
    pub failures: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Set when the previous cycle was still running and this one did nothing.
    pub skipped: bool,
    pub events_checked: usize,
    pub fired_events: Vec<String>,
    pub messages_attempted: usize,
}

/// Everything one reminder cycle needs; cheap to clone into the timer job.
#[derive(Clone)]
pub struct ReminderRunner {
    db: Arc<DatabaseManager>,
    sender: Arc<dyn MessageSender>,
    picker: Arc<dyn VariantPicker>,
    poll_minutes: i64,
    in_flight: Arc<tokio::sync::Mutex<()>>,
}

impl ReminderRunner {
    pub fn new(
        db: Arc<DatabaseManager>,
        sender: Arc<dyn MessageSender>,
        picker: Arc<dyn VariantPicker>,
        poll_minutes: u32,
    ) -> Self {
        Self {
            db,
            sender,
            picker,
            poll_minutes: i64::from(poll_minutes.max(1)),
            in_flight: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn poll_minutes(&self) -> i64 {
        self.poll_minutes
    }

    pub async fn run_cycle(&self) -> Result<CycleReport, RepositoryError> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Sends a batch for every event due at `now`.
    ///
    /// A slot already recorded in `last_reminder_at` is never fired again, and
    /// a cycle that overlaps a running one is skipped.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<CycleReport, RepositoryError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::warn!("Previous reminder cycle still running, skipping tick at {}", now);
            return Ok(CycleReport {
                skipped: true,
                ..CycleReport::default()
            });
        };

        let events = Event::list_all(&self.db.pool).await?;
        let mut report = CycleReport {
            events_checked: events.len(),
            ..CycleReport::default()
        };

        for event in &events {
            if period_seconds(event.interval_minutes).is_none() {
                tracing::warn!(
                    "Event {} has an unusable reminder interval of {} minutes, skipping",
                    event.id,
                    event.interval_minutes
                );
                continue;
            }
            if !is_due(event.start_time, event.interval_minutes, now, self.poll_minutes) {
                continue;
            }
            let Some(slot) = current_slot(event.start_time, event.interval_minutes, now) else {
                continue;
            };
            if event.last_reminder_at.is_some_and(|last| last >= slot) {
                tracing::debug!("Reminder slot {} already fired for event {}", slot, event.id);
                continue;
            }

            // Record before sending so an overlapping or repeated poll cannot re-fire the slot
            if let Err(e) = Event::record_reminder_slot(&self.db.pool, &event.id, slot).await {
                log_database_error("record_reminder_slot", "events", &e.to_string(), Some(&event.id));
                continue;
            }

            match self.send_batch(event).await {
                Ok(batch) => {
                    report.fired_events.push(event.id.clone());
                    report.messages_attempted += batch.recipients;
                }
                Err(e) => {
                    log_database_error("find_unpaid_for_event", "members", &e.to_string(), Some(&event.id));
                }
            }
        }

        Ok(report)
    }

    /// Sends one batch for the event right away, ignoring the schedule.
    pub async fn send_event_reminders(&self, event_id: &str) -> Result<BatchReport, RepositoryError> {
        let event = Event::find_by_id(&self.db.pool, event_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("event {}", event_id)))?;

        Ok(self.send_batch(&event).await?)
    }

    async fn send_batch(&self, event: &Event) -> Result<BatchReport, sqlx::Error> {
        let unpaid = Member::find_unpaid_for_event(&self.db.pool, &event.id).await?;
        let style = event.reminder_style();
        if style.is_none() {
            tracing::warn!("Event {} has unknown style '{}', using default reminders", event.id, event.style);
        }

        let mut report = BatchReport::default();
        for member in &unpaid {
            let text = render_reminder(style, self.picker.as_ref(), &member.name, event.amount, &event.title);
            report.recipients += 1;
            if !deliver(self.sender.as_ref(), &member.phone, &text).await {
                report.failures += 1;
            }
        }

        log_reminder_batch(&event.id, report.recipients, report.failures);
        Ok(report)
    }
}

pub struct ReminderService {
    runner: ReminderRunner,
    scheduler: JobScheduler,
}

impl ReminderService {
    pub async fn new(runner: ReminderRunner) -> anyhow::Result<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            runner,
            scheduler,
        })
    }

    pub async fn start(&mut self) -> anyhow::Result<()> {
        let runner = self.runner.clone();
        let period = std::time::Duration::from_secs(self.runner.poll_minutes().unsigned_abs() * 60);

        let reminder_job = Job::new_repeated_async(period, move |_uuid, _l| {
            let runner = runner.clone();
            Box::pin(async move {
                match runner.run_cycle().await {
                    Ok(report) if !report.fired_events.is_empty() => {
                        tracing::info!(
                            "Reminder cycle fired {} events, {} messages",
                            report.fired_events.len(),
                            report.messages_attempted
                        );
                    }
                    Ok(_) => {}
                    Err(e) => tracing::error!("Failed to run reminder cycle: {}", e),
                }
            })
        })?;

        self.scheduler.add(reminder_job).await?;
        self.scheduler.start().await?;

        log_system_event(
            "Reminder service started",
            Some(&format!("polling every {} minute(s)", self.runner.poll_minutes())),
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> anyhow::Result<()> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}
