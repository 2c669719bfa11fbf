use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
    pub phone: String,
    pub created_at: String,
}

impl Admin {
    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        admin_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Admin>(
            "SELECT id, phone, created_at FROM admins WHERE id = ?"
        )
        .bind(admin_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_phone(
        pool: &sqlx::SqlitePool,
        phone: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Admin>(
            "SELECT id, phone, created_at FROM admins WHERE phone = ?"
        )
        .bind(phone)
        .fetch_optional(pool)
        .await
    }

    /// Looks up the organizer by address, registering it on first sight.
    pub async fn find_or_create(
        conn: &mut sqlx::SqliteConnection,
        phone: &str,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT OR IGNORE INTO admins (phone, created_at) VALUES (?, ?)")
            .bind(phone)
            .bind(&now)
            .execute(&mut *conn)
            .await?;

        sqlx::query_as::<_, Admin>(
            "SELECT id, phone, created_at FROM admins WHERE phone = ?"
        )
        .bind(phone)
        .fetch_one(&mut *conn)
        .await
    }
}
