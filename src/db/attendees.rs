use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::{Attendee, AttendeeWithEvent};

/// The fields the deletion guard needs: the row's owner and the organizer
/// of its event, read together immediately before the check.
#[derive(Debug, FromRow)]
pub struct AttendeeOwnership {
    pub user_id: Option<Uuid>,
    pub event_id: Uuid,
    pub organizer_id: Uuid,
}

pub async fn create(
    pool: &PgPool,
    user_id: Option<Uuid>,
    name: &str,
    email: &str,
    phone: &str,
    event_id: Uuid,
    status: &str,
) -> Result<Attendee, sqlx::Error> {
    sqlx::query_as::<_, Attendee>(
        r#"
        INSERT INTO attendees (id, user_id, name, email, phone, event_id, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, user_id, name, email, phone, event_id, status, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(event_id)
    .bind(status)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Attendee>, sqlx::Error> {
    sqlx::query_as::<_, Attendee>(
        r#"
        SELECT id, user_id, name, email, phone, event_id, status, created_at
        FROM attendees
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Event ids the user holds a registration for; drives the "already joined"
/// markers on the event listing.
pub async fn attending_event_ids(pool: &PgPool, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>("SELECT event_id FROM attendees WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Global listing: every registration joined with its event's name. The
/// inner join silently drops rows orphaned by an event deletion.
pub async fn list_all_with_event(pool: &PgPool) -> Result<Vec<AttendeeWithEvent>, sqlx::Error> {
    sqlx::query_as::<_, AttendeeWithEvent>(
        r#"
        SELECT a.id, a.user_id, a.name, a.email, a.phone, a.event_id, a.status,
               e.name AS event_name
        FROM attendees a
        JOIN events e ON a.event_id = e.id
        ORDER BY a.created_at
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Organizer view: every registration for the event.
pub async fn list_for_event(
    pool: &PgPool,
    event_id: Uuid,
) -> Result<Vec<AttendeeWithEvent>, sqlx::Error> {
    sqlx::query_as::<_, AttendeeWithEvent>(
        r#"
        SELECT a.id, a.user_id, a.name, a.email, a.phone, a.event_id, a.status,
               e.name AS event_name
        FROM attendees a
        JOIN events e ON a.event_id = e.id
        WHERE a.event_id = $1
        ORDER BY a.created_at
        "#,
    )
    .bind(event_id)
    .fetch_all(pool)
    .await
}

/// Non-organizer view: the viewer's own registrations plus anonymous ones.
/// Anonymous rows are visible to everyone by policy.
pub async fn list_for_event_visible_to(
    pool: &PgPool,
    event_id: Uuid,
    viewer_id: Option<Uuid>,
) -> Result<Vec<AttendeeWithEvent>, sqlx::Error> {
    sqlx::query_as::<_, AttendeeWithEvent>(
        r#"
        SELECT a.id, a.user_id, a.name, a.email, a.phone, a.event_id, a.status,
               e.name AS event_name
        FROM attendees a
        JOIN events e ON a.event_id = e.id
        WHERE a.event_id = $1 AND (a.user_id = $2 OR a.user_id IS NULL)
        ORDER BY a.created_at
        "#,
    )
    .bind(event_id)
    .bind(viewer_id)
    .fetch_all(pool)
    .await
}

pub async fn find_ownership(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<AttendeeOwnership>, sqlx::Error> {
    sqlx::query_as::<_, AttendeeOwnership>(
        r#"
        SELECT a.user_id, a.event_id, e.organizer_id
        FROM attendees a
        JOIN events e ON a.event_id = e.id
        WHERE a.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Rewrites every mutable field unconditionally.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    email: &str,
    phone: &str,
    event_id: Uuid,
    status: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE attendees
        SET name = $1, email = $2, phone = $3, event_id = $4, status = $5
        WHERE id = $6
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(event_id)
    .bind(status)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM attendees WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Removes every registration the user holds for the event; duplicates from
/// repeated joins all go at once.
pub async fn delete_for_user_and_event(
    pool: &PgPool,
    user_id: Uuid,
    event_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM attendees WHERE user_id = $1 AND event_id = $2")
        .bind(user_id)
        .bind(event_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
