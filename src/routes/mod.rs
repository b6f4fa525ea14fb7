use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::identity;
use crate::config::{
    create_cors_layer, create_security_headers_layer, rate_limit, Config, RateLimiter,
};
use crate::handlers::{attendees, auth, events, health_check, root};

/// Everything handlers need, injected instead of captured globally: the
/// pool is opened in main and travels with the request.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Arc<Config>) -> Self {
        Self { pool, config }
    }
}

pub fn create_routes(state: AppState) -> Router {
    let limiter = RateLimiter::new(state.config.rate_limit_max, state.config.rate_limit_window);
    let production = state.config.production;

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/logout", get(auth::logout))
        .route("/events", get(events::list).post(events::create))
        .route("/events/new", get(events::new_form))
        .route("/events/:id", put(events::update).delete(events::remove))
        .route("/events/:id/edit", get(events::edit_form))
        .route("/events/:id/join", get(events::join_form).post(events::join))
        .route("/events/:id/leave", post(events::leave))
        .route("/events/:id/attendees", get(events::attendees))
        .route("/events/:id/attendees/new", get(attendees::new_form_for_event))
        .route("/attendees", get(attendees::list).post(attendees::create))
        .route("/attendees/new", get(attendees::new_form))
        .route(
            "/attendees/:id",
            put(attendees::update).delete(attendees::remove),
        )
        .route("/attendees/:id/edit", get(attendees::edit_form))
        .layer(middleware::from_fn_with_state(state.clone(), identity::restore))
        .layer(middleware::from_fn_with_state(
            limiter,
            rate_limit::limit_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(production))
        .layer(create_cors_layer())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccessProfile;
    use sqlx::postgres::PgPoolOptions;
    use std::time::Duration;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/gatherly_test".to_string(),
            session_secret: "test-secret".to_string(),
            port: 0,
            production: false,
            profile: AccessProfile::AuthRequired,
            rate_limit_max: 100,
            rate_limit_window: Duration::from_secs(900),
        }
    }

    #[tokio::test]
    async fn test_router_builds() {
        // connect_lazy performs no IO, so the full route table can be
        // assembled without a running database.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/gatherly_test")
            .unwrap();
        let state = AppState::new(pool, Arc::new(test_config()));
        let _router = create_routes(state);
    }
}
