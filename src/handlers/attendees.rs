use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{AuthUser, OptionalUser};
use crate::config::AccessProfile;
use crate::db;
use crate::models::{Attendee, AttendeeWithEvent, Event};
use crate::routes::AppState;
use crate::utils::response::success;
use crate::utils::AppError;

const DEFAULT_STATUS: &str = "registered";

#[derive(Deserialize)]
pub struct AttendeeForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub event_id: Uuid,
    pub status: Option<String>,
}

#[derive(Serialize)]
struct AttendeeListView {
    attendees: Vec<AttendeeWithEvent>,
    viewer: Option<String>,
}

#[derive(Serialize)]
struct AttendeeFormView {
    attendee: Option<Attendee>,
    /// Choices for the event picker.
    events: Vec<Event>,
}

/// Only the owning user may edit a registration.
fn owns(attendee: &Attendee, caller_id: Uuid) -> bool {
    attendee.user_id == Some(caller_id)
}

/// Deletion is wider: the owner or the organizer of the referenced event.
fn may_remove(owner: Option<Uuid>, organizer_id: Uuid, caller_id: Uuid) -> bool {
    owner == Some(caller_id) || organizer_id == caller_id
}

/// Global listing, joined with event names and deliberately unfiltered by
/// ownership: every registration is visible to any visitor, pending a
/// decision on the intended visibility policy.
pub async fn list(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
) -> Result<Response, AppError> {
    let attendees = db::attendees::list_all_with_event(&state.pool).await?;

    let view = AttendeeListView {
        attendees,
        viewer: viewer.map(|u| u.username),
    };
    Ok(success(view, "Attendees").into_response())
}

pub async fn new_form(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = db::events::list_all(&state.pool).await?;
    Ok(success(
        AttendeeFormView {
            attendee: None,
            events,
        },
        "New attendee",
    )
    .into_response())
}

/// The event-scoped variant of the form: the picker holds just that event.
pub async fn new_form_for_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = db::events::find_by_id(&state.pool, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    Ok(success(
        AttendeeFormView {
            attendee: None,
            events: vec![event],
        },
        "New attendee",
    )
    .into_response())
}

/// Under the open profile anonymous submissions are stored with a null user
/// id; under auth-required they bounce to the login page.
pub async fn create(
    State(state): State<AppState>,
    OptionalUser(caller): OptionalUser,
    Form(form): Form<AttendeeForm>,
) -> Result<Response, AppError> {
    if caller.is_none() && state.config.profile == AccessProfile::AuthRequired {
        return Ok(Redirect::to("/login").into_response());
    }

    let status = form.status.as_deref().unwrap_or(DEFAULT_STATUS);
    let attendee = db::attendees::create(
        &state.pool,
        caller.map(|u| u.id),
        &form.name,
        &form.email,
        &form.phone,
        form.event_id,
        status,
    )
    .await?;

    tracing::info!(attendee_id = %attendee.id, event_id = %form.event_id, "Attendee created");
    let target = format!("/events/{}/attendees", form.event_id);
    Ok(Redirect::to(&target).into_response())
}

pub async fn edit_form(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let attendee = db::attendees::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Attendee not found".to_string()))?;
    if !owns(&attendee, user.id) {
        return Err(AppError::Forbidden("Unauthorized".to_string()));
    }

    let events = db::events::list_all(&state.pool).await?;
    Ok(success(
        AttendeeFormView {
            attendee: Some(attendee),
            events,
        },
        "Edit attendee",
    )
    .into_response())
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Form(form): Form<AttendeeForm>,
) -> Result<Response, AppError> {
    let attendee = db::attendees::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Attendee not found".to_string()))?;
    if !owns(&attendee, user.id) {
        return Err(AppError::Forbidden("Unauthorized".to_string()));
    }

    let status = form.status.as_deref().unwrap_or(DEFAULT_STATUS);
    db::attendees::update(
        &state.pool,
        id,
        &form.name,
        &form.email,
        &form.phone,
        form.event_id,
        status,
    )
    .await?;

    let target = format!("/events/{}/attendees", form.event_id);
    Ok(Redirect::to(&target).into_response())
}

pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let ownership = db::attendees::find_ownership(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Attendee not found".to_string()))?;
    if !may_remove(ownership.user_id, ownership.organizer_id, user.id) {
        return Err(AppError::Forbidden("Unauthorized".to_string()));
    }

    db::attendees::delete(&state.pool, id).await?;

    tracing::info!(attendee_id = %id, "Attendee deleted");
    let target = format!("/events/{}/attendees", ownership.event_id);
    Ok(Redirect::to(&target).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn attendee(user_id: Option<Uuid>) -> Attendee {
        Attendee {
            id: Uuid::new_v4(),
            user_id,
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            phone: "555-0100".to_string(),
            event_id: Uuid::new_v4(),
            status: "registered".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_may_edit() {
        let caller = Uuid::new_v4();
        assert!(owns(&attendee(Some(caller)), caller));
    }

    #[test]
    fn test_non_owner_may_not_edit() {
        let caller = Uuid::new_v4();
        assert!(!owns(&attendee(Some(Uuid::new_v4())), caller));
        // Anonymous rows have no owner, so nobody may edit them.
        assert!(!owns(&attendee(None), caller));
    }

    #[test]
    fn test_owner_or_organizer_may_remove() {
        let owner = Uuid::new_v4();
        let organizer = Uuid::new_v4();
        assert!(may_remove(Some(owner), organizer, owner));
        assert!(may_remove(Some(owner), organizer, organizer));
        // The organizer may also clear anonymous registrations.
        assert!(may_remove(None, organizer, organizer));
    }

    #[test]
    fn test_third_party_may_not_remove() {
        let stranger = Uuid::new_v4();
        assert!(!may_remove(Some(Uuid::new_v4()), Uuid::new_v4(), stranger));
        assert!(!may_remove(None, Uuid::new_v4(), stranger));
    }
}
