use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub location: String,
    pub description: Option<String>,
    /// Set at creation, never reassigned.
    pub organizer_id: Uuid,
    pub created_at: DateTime<Utc>,
}
