use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{AuthUser, OptionalUser};
use crate::db;
use crate::models::{AttendeeWithEvent, Event, User};
use crate::routes::AppState;
use crate::utils::response::success;
use crate::utils::AppError;

const JOIN_STATUS: &str = "registered";

#[derive(Deserialize)]
pub struct EventForm {
    pub name: String,
    pub date: NaiveDate,
    pub location: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct JoinForm {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Serialize)]
struct EventListView {
    events: Vec<Event>,
    /// Event ids the viewer already joined, for the "already joined" marker.
    attending: Vec<Uuid>,
    viewer: Option<String>,
}

#[derive(Serialize)]
struct EventFormView {
    event: Option<Event>,
}

#[derive(Serialize)]
struct JoinFormView {
    event: Event,
}

#[derive(Serialize)]
struct EventAttendeesView {
    event: Event,
    attendees: Vec<AttendeeWithEvent>,
    viewer_is_organizer: bool,
}

/// The ownership guard for event mutation: the record is re-read from
/// storage by the caller immediately before this check.
fn ensure_organizer(event: &Event, caller: &User) -> Result<(), AppError> {
    if event.organizer_id == caller.id {
        Ok(())
    } else {
        Err(AppError::Forbidden("Unauthorized".to_string()))
    }
}

pub async fn list(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
) -> Result<Response, AppError> {
    let events = db::events::list_all(&state.pool).await?;
    let attending = match &viewer {
        Some(user) => db::attendees::attending_event_ids(&state.pool, user.id).await?,
        None => Vec::new(),
    };

    let view = EventListView {
        events,
        attending,
        viewer: viewer.map(|u| u.username),
    };
    Ok(success(view, "Events").into_response())
}

pub async fn new_form(AuthUser(_user): AuthUser) -> Response {
    success(EventFormView { event: None }, "New event").into_response()
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    let event = db::events::create(
        &state.pool,
        &form.name,
        form.date,
        &form.location,
        form.description.as_deref(),
        user.id,
    )
    .await?;

    tracing::info!(event_id = %event.id, organizer_id = %user.id, "Event created");
    Ok(Redirect::to("/events").into_response())
}

pub async fn edit_form(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = db::events::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    ensure_organizer(&event, &user)?;

    Ok(success(EventFormView { event: Some(event) }, "Edit event").into_response())
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    let event = db::events::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    ensure_organizer(&event, &user)?;

    // No transaction around the check and the write; a concurrent delete
    // makes this affect zero rows, which is tolerated.
    db::events::update(
        &state.pool,
        id,
        &form.name,
        form.date,
        &form.location,
        form.description.as_deref(),
    )
    .await?;

    Ok(Redirect::to("/events").into_response())
}

pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = db::events::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    ensure_organizer(&event, &user)?;

    db::events::delete(&state.pool, id).await?;

    tracing::info!(event_id = %id, "Event deleted");
    Ok(Redirect::to("/events").into_response())
}

pub async fn join_form(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = db::events::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    Ok(success(JoinFormView { event }, "Join event").into_response())
}

/// No duplicate check: joining twice creates two registrations.
pub async fn join(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Form(form): Form<JoinForm>,
) -> Result<Response, AppError> {
    db::attendees::create(
        &state.pool,
        Some(user.id),
        &form.name,
        &form.email,
        &form.phone,
        id,
        JOIN_STATUS,
    )
    .await?;

    tracing::info!(event_id = %id, user_id = %user.id, "User joined event");
    Ok(Redirect::to("/events").into_response())
}

pub async fn leave(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let removed = db::attendees::delete_for_user_and_event(&state.pool, user.id, id).await?;

    tracing::info!(event_id = %id, user_id = %user.id, removed, "User left event");
    Ok(Redirect::to("/events").into_response())
}

/// The organizer sees every registration; everyone else sees their own plus
/// the anonymous ones.
pub async fn attendees(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = db::events::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let viewer_id = viewer.as_ref().map(|u| u.id);
    let viewer_is_organizer = viewer_id == Some(event.organizer_id);

    let attendees = if viewer_is_organizer {
        db::attendees::list_for_event(&state.pool, id).await?
    } else {
        db::attendees::list_for_event_visible_to(&state.pool, id, viewer_id).await?
    };

    let view = EventAttendeesView {
        event,
        attendees,
        viewer_is_organizer,
    };
    Ok(success(view, "Attendees").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: Uuid) -> User {
        User {
            id,
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: "organizer".to_string(),
            created_at: Utc::now(),
        }
    }

    fn event(organizer_id: Uuid) -> Event {
        Event {
            id: Uuid::new_v4(),
            name: "RustConf".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            location: "Portland".to_string(),
            description: None,
            organizer_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_organizer_passes_guard() {
        let id = Uuid::new_v4();
        assert!(ensure_organizer(&event(id), &user(id)).is_ok());
    }

    #[test]
    fn test_non_organizer_is_rejected() {
        let result = ensure_organizer(&event(Uuid::new_v4()), &user(Uuid::new_v4()));
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
