mod common;

use chrono::Duration;
use common::{now, TestContext, ALICE, BOB, ORGANIZER};
use payment_reminder_bot::database::models::Event;
use payment_reminder_bot::database::RepositoryError;
use tokio_test::{assert_err, assert_ok};

const CONTACTS: &str = "Alice +15550002222\nBob +15550003333";

#[tokio::test]
async fn test_cycle_fires_at_start_then_every_interval() {
    let ctx = TestContext::new().await;
    let picnic = ctx
        .create_event_with_members(ORGANIZER, "create event: Picnic 50 freq=30", CONTACTS)
        .await;
    let runner = ctx.runner();

    let report = assert_ok!(runner.run_cycle_at(now()).await);
    assert_eq!(report.fired_events, vec![picnic.clone()]);
    assert_eq!(report.messages_attempted, 2);
    assert_eq!(
        ctx.sender.last_to(ALICE).as_deref(),
        Some("💼 Listen Alice, you owe 50 for *Picnic*. Don't make me ask again.")
    );
    assert_eq!(ctx.sender.messages_to(BOB).len(), 1);

    let quiet = assert_ok!(runner.run_cycle_at(now() + Duration::minutes(15)).await);
    assert!(quiet.fired_events.is_empty());

    let again = assert_ok!(runner.run_cycle_at(now() + Duration::minutes(30)).await);
    assert_eq!(again.fired_events, vec![picnic]);
    assert_eq!(ctx.sender.messages_to(ALICE).len(), 2);
}

#[tokio::test]
async fn test_same_slot_never_fires_twice() {
    let ctx = TestContext::new().await;
    ctx.create_event_with_members(ORGANIZER, "create event: Picnic 50 freq=30", CONTACTS)
        .await;
    let runner = ctx.runner();

    assert_ok!(runner.run_cycle_at(now()).await);
    let repeat = assert_ok!(runner.run_cycle_at(now() + Duration::seconds(30)).await);

    assert!(repeat.fired_events.is_empty());
    assert_eq!(ctx.sender.messages_to(ALICE).len(), 1);
}

#[tokio::test]
async fn test_overlapping_cycles_fire_once() {
    let ctx = TestContext::new().await;
    ctx.create_event_with_members(ORGANIZER, "create event: Picnic 50", CONTACTS)
        .await;
    let runner = ctx.runner();

    let (first, second) = tokio::join!(runner.run_cycle_at(now()), runner.run_cycle_at(now()));
    let first = assert_ok!(first);
    let second = assert_ok!(second);

    assert_eq!(first.fired_events.len() + second.fired_events.len(), 1);
    assert_eq!(ctx.sender.messages_to(ALICE).len(), 1);
}

#[tokio::test]
async fn test_nothing_before_first_reminder() {
    let ctx = TestContext::new().await;
    ctx.create_event_with_members(ORGANIZER, "create event: Picnic 50 delay=10", CONTACTS)
        .await;
    let runner = ctx.runner();

    let report = assert_ok!(runner.run_cycle_at(now() + Duration::minutes(5)).await);
    assert_eq!(report.events_checked, 1);
    assert!(report.fired_events.is_empty());
    assert!(ctx.sender.messages().is_empty());

    let report = assert_ok!(runner.run_cycle_at(now() + Duration::minutes(10)).await);
    assert_eq!(report.messages_attempted, 2);
}

#[tokio::test]
async fn test_paid_members_are_not_reminded() {
    let ctx = TestContext::new().await;
    ctx.create_event_with_members(ORGANIZER, "create event: Picnic 50 grandpa", CONTACTS)
        .await;
    ctx.say(ALICE, "paid").await;
    ctx.sender.clear();

    let report = assert_ok!(ctx.runner().run_cycle_at(now()).await);

    assert_eq!(report.messages_attempted, 1);
    assert!(ctx.sender.messages_to(ALICE).is_empty());
    assert_eq!(
        ctx.sender.last_to(BOB).as_deref(),
        Some("👴 In my day we paid on time, Bob. Time to send 50 for *Picnic*.")
    );
}

#[tokio::test]
async fn test_unknown_stored_style_uses_default_reminder() {
    let ctx = TestContext::new().await;
    let picnic = ctx
        .create_event_with_members(ORGANIZER, "create event: Picnic 50", "Alice +15550002222")
        .await;
    sqlx::query("UPDATE events SET style = 'pirate' WHERE id = ?")
        .bind(&picnic)
        .execute(&ctx.db.pool)
        .await
        .unwrap();

    let batch = assert_ok!(ctx.runner().send_event_reminders(&picnic).await);

    assert_eq!(batch.recipients, 1);
    assert_eq!(
        ctx.sender.last_to(ALICE).as_deref(),
        Some("🔔 Reminder: Alice, please pay 50 for *Picnic*.")
    );
}

#[tokio::test]
async fn test_manual_batch_ignores_schedule() {
    let ctx = TestContext::new().await;
    let picnic = ctx
        .create_event_with_members(ORGANIZER, "create event: Picnic 50 delay=600", CONTACTS)
        .await;
    ctx.sender.make_unreachable(BOB);

    let batch = assert_ok!(ctx.runner().send_event_reminders(&picnic).await);

    assert_eq!(batch.recipients, 2);
    assert_eq!(batch.failures, 1);
    assert_eq!(ctx.sender.messages_to(ALICE).len(), 1);

    // The schedule bookkeeping is untouched
    let event = Event::find_by_id(&ctx.db.pool, &picnic).await.unwrap().unwrap();
    assert_eq!(event.last_reminder_at, None);
}

#[tokio::test]
async fn test_manual_batch_for_unknown_event() {
    let ctx = TestContext::new().await;

    let err = assert_err!(ctx.runner().send_event_reminders("nobody-nothing").await);
    assert!(matches!(err, RepositoryError::NotFound(_)));
}

#[tokio::test]
async fn test_unusable_stored_interval_does_not_stop_the_cycle() {
    let ctx = TestContext::new().await;
    let broken = ctx
        .create_event_with_members(ORGANIZER, "create event: Aaa 50", "Alice +15550002222")
        .await;
    sqlx::query("UPDATE events SET interval_minutes = ? WHERE id = ?")
        .bind(4_611_686_018_427_387_904_i64)
        .bind(&broken)
        .execute(&ctx.db.pool)
        .await
        .expect("Failed to corrupt interval");
    let healthy = ctx
        .create_event_with_members(ORGANIZER, "create event: Bbb 50", "Bob +15550003333")
        .await;

    let report = assert_ok!(ctx.runner().run_cycle_at(now()).await);

    assert_eq!(report.events_checked, 2);
    assert_eq!(report.fired_events, vec![healthy]);
    assert!(ctx.sender.messages_to(ALICE).is_empty());
    assert_eq!(ctx.sender.messages_to(BOB).len(), 1);
}
