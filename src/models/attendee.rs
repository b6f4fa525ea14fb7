use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attendee {
    pub id: Uuid,
    /// Null for anonymous registrations made under the open profile.
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub event_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// An attendee row joined with its event's name, as rendered by listings.
/// The inner join drops rows whose event has been deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendeeWithEvent {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub event_id: Uuid,
    pub status: String,
    pub event_name: String,
}
