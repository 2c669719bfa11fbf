use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::event::phone_variants;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub phone: String,
    pub paid: bool,
    pub created_at: String,
}

/// A name/phone pair waiting to be attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub phone: String,
}

/// Unpaid membership together with the owning event's title.
#[derive(Debug, Clone, FromRow)]
pub struct UnpaidMembership {
    pub member_id: String,
    pub name: String,
    pub phone: String,
    pub event_id: String,
    pub event_title: String,
}

/// What a successful payment confirmation changed.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PaidReceipt {
    pub member_name: String,
    pub member_phone: String,
    pub event_title: String,
    pub admin_id: i64,
}

impl Member {
    /// Inserts the batch and returns the event's new member total.
    pub async fn add_batch(
        pool: &sqlx::SqlitePool,
        event_id: &str,
        members: &[NewMember],
    ) -> Result<i64, sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        let mut tx = pool.begin().await?;

        for member in members {
            let id = Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO members (id, event_id, name, phone, paid, created_at) VALUES (?, ?, ?, ?, 0, ?)"
            )
            .bind(&id)
            .bind(event_id)
            .bind(&member.name)
            .bind(&member.phone)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Self::count_for_event(pool, event_id).await
    }

    pub async fn count_for_event(
        pool: &sqlx::SqlitePool,
        event_id: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM members WHERE event_id = ?")
            .bind(event_id)
            .fetch_one(pool)
            .await
    }

    pub async fn count_unpaid_for_event(
        pool: &sqlx::SqlitePool,
        event_id: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM members WHERE event_id = ? AND paid = 0"
        )
        .bind(event_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_event(
        pool: &sqlx::SqlitePool,
        event_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Member>(
            "SELECT id, event_id, name, phone, paid, created_at FROM members WHERE event_id = ? ORDER BY created_at, rowid"
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_unpaid_for_event(
        pool: &sqlx::SqlitePool,
        event_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Member>(
            "SELECT id, event_id, name, phone, paid, created_at FROM members
             WHERE event_id = ? AND paid = 0 ORDER BY created_at, rowid"
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_unpaid_by_address(
        pool: &sqlx::SqlitePool,
        phone: &str,
    ) -> Result<Vec<UnpaidMembership>, sqlx::Error> {
        let (with_plus, without_plus) = phone_variants(phone);
        sqlx::query_as::<_, UnpaidMembership>(
            "SELECT m.id AS member_id, m.name, m.phone, m.event_id, e.title AS event_title
             FROM members m
             JOIN events e ON e.id = m.event_id
             WHERE m.phone IN (?, ?) AND m.paid = 0
             ORDER BY e.created_at, e.rowid, m.rowid"
        )
        .bind(with_plus)
        .bind(without_plus)
        .fetch_all(pool)
        .await
    }

    /// Flips the paid flag for the address in the event.
    ///
    /// Returns `None` when the address is not an unpaid member of the event,
    /// which covers both "already paid" and "not found". The flag is never
    /// reset by this or any other query.
    pub async fn set_paid(
        pool: &sqlx::SqlitePool,
        phone: &str,
        event_id: &str,
    ) -> Result<Option<PaidReceipt>, sqlx::Error> {
        let (with_plus, without_plus) = phone_variants(phone);
        let mut tx = pool.begin().await?;

        let receipt = sqlx::query_as::<_, PaidReceipt>(
            "SELECT m.name AS member_name, m.phone AS member_phone, e.title AS event_title, e.admin_id
             FROM members m
             JOIN events e ON e.id = m.event_id
             WHERE m.event_id = ? AND m.phone IN (?, ?) AND m.paid = 0
             LIMIT 1"
        )
        .bind(event_id)
        .bind(&with_plus)
        .bind(&without_plus)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(receipt) = receipt else {
            return Ok(None);
        };

        let updated = sqlx::query(
            "UPDATE members SET paid = 1 WHERE event_id = ? AND phone IN (?, ?) AND paid = 0"
        )
        .bind(event_id)
        .bind(&with_plus)
        .bind(&without_plus)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(receipt))
    }
}
