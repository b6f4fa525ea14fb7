use std::env;
use std::time::Duration;

pub mod cors;
pub mod method_override;
pub mod rate_limit;
pub mod security;

pub use cors::create_cors_layer;
pub use rate_limit::RateLimiter;
pub use security::create_security_headers_layer;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_RATE_LIMIT_MAX: u32 = 100;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;

/// Which handler profile the server runs with. Under `AuthRequired` the
/// attendee form demands a logged-in caller; under `Open` it accepts
/// anonymous submissions (stored with a null user id).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessProfile {
    AuthRequired,
    Open,
}

impl AccessProfile {
    pub fn parse(value: &str) -> Option<AccessProfile> {
        match value {
            "auth-required" => Some(AccessProfile::AuthRequired),
            "open" => Some(AccessProfile::Open),
            _ => None,
        }
    }
}

pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub port: u16,
    /// Production enables Secure cookies and HSTS.
    pub production: bool,
    pub profile: AccessProfile,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let production = env::var("APP_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false);

        let profile = env::var("ACCESS_PROFILE")
            .ok()
            .and_then(|v| {
                let parsed = AccessProfile::parse(&v);
                if parsed.is_none() {
                    tracing::warn!("Unknown ACCESS_PROFILE '{}', using auth-required", v);
                }
                parsed
            })
            .unwrap_or(AccessProfile::AuthRequired);

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/gatherly".to_string()),
            session_secret: env::var("SESSION_SECRET")
                .unwrap_or_else(|_| "default-session-secret".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            production,
            profile,
            rate_limit_max: env::var("RATE_LIMIT_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RATE_LIMIT_MAX),
            rate_limit_window: Duration::from_secs(
                env::var("RATE_LIMIT_WINDOW_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_profile_parse() {
        assert_eq!(
            AccessProfile::parse("auth-required"),
            Some(AccessProfile::AuthRequired)
        );
        assert_eq!(AccessProfile::parse("open"), Some(AccessProfile::Open));
        assert_eq!(AccessProfile::parse("public"), None);
    }
}
