use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Bcrypt hash; never serialized into a view model.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// The two roles a user may register with. Stored as plain text; this enum
/// exists to validate registration input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Attendee,
    Organizer,
}

impl Role {
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "attendee" => Some(Role::Attendee),
            "organizer" => Some(Role::Organizer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Attendee => "attendee",
            Role::Organizer => "organizer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_roles() {
        assert_eq!(Role::parse("attendee"), Some(Role::Attendee));
        assert_eq!(Role::parse("organizer"), Some(Role::Organizer));
    }

    #[test]
    fn test_parse_rejects_anything_else() {
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse("Organizer"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Attendee, Role::Organizer] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }
}
