use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::utils::AppError;

pub const SESSION_COOKIE: &str = "session";

/// Sessions live as long as the cookie: 24 hours.
const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Only the user id is carried in the session; the full user row is
/// re-read from storage on every request.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: u64,
    iat: u64,
}

pub fn create_token(user_id: Uuid, secret: &str) -> Result<String, AppError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + SESSION_TTL.as_secs(),
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to create session token: {e}")))
}

/// Extracts the user id from a session token. Any failure (bad signature,
/// expired, malformed subject) is reported as `None`; the caller treats the
/// request as anonymous.
pub fn verify_token(token: &str, secret: &str) -> Option<Uuid> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .ok()?;
    Uuid::parse_str(&data.claims.sub).ok()
}

/// Builds the Set-Cookie value for a fresh login.
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        token,
        SESSION_TTL.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Builds the Set-Cookie value that logs the caller out.
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!("{}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Pulls the session token out of a Cookie request header.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(SESSION_COOKIE).and_then(|rest| rest.strip_prefix('=')))
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_create_then_verify() {
        let user_id = Uuid::new_v4();
        let token = create_token(user_id, SECRET).unwrap();
        assert_eq!(verify_token(&token, SECRET), Some(user_id));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let token = create_token(Uuid::new_v4(), SECRET).unwrap();
        assert_eq!(verify_token(&token, "other-secret"), None);
    }

    #[test]
    fn test_garbage_token_fails() {
        assert_eq!(verify_token("invalid.token.here", SECRET), None);
    }

    #[test]
    fn test_cookie_flags() {
        let cookie = session_cookie("abc", false);
        assert!(cookie.starts_with("session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));

        let secure = session_cookie("abc", true);
        assert!(secure.ends_with("; Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(false);
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_token_from_cookie_header() {
        assert_eq!(
            token_from_cookie_header("theme=dark; session=tok123; lang=en"),
            Some("tok123")
        );
        assert_eq!(token_from_cookie_header("theme=dark"), None);
        assert_eq!(token_from_cookie_header("session="), None);
        // A prefix-named cookie must not match.
        assert_eq!(token_from_cookie_header("session_old=tok"), None);
    }
}
