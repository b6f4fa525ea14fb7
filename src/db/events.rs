use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Event;

pub async fn list_all(pool: &PgPool) -> Result<Vec<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        r#"
        SELECT id, name, date, location, description, organizer_id, created_at
        FROM events
        ORDER BY date, created_at
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        r#"
        SELECT id, name, date, location, description, organizer_id, created_at
        FROM events
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    name: &str,
    date: NaiveDate,
    location: &str,
    description: Option<&str>,
    organizer_id: Uuid,
) -> Result<Event, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        r#"
        INSERT INTO events (id, name, date, location, description, organizer_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, date, location, description, organizer_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(date)
    .bind(location)
    .bind(description)
    .bind(organizer_id)
    .fetch_one(pool)
    .await
}

/// Rewrites every mutable field unconditionally; organizer_id is never
/// touched.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    date: NaiveDate,
    location: &str,
    description: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE events
        SET name = $1, date = $2, location = $3, description = $4
        WHERE id = $5
        "#,
    )
    .bind(name)
    .bind(date)
    .bind(location)
    .bind(description)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// No cascade: dependent attendee rows are left dangling and filtered out
/// by the listing joins.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
