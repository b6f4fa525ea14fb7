use axum::response::{IntoResponse, Redirect, Response};
use serde::Serialize;

use crate::utils::response::success;

pub mod attendees;
pub mod auth;
pub mod events;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "gatherly",
    };

    success(payload, "Health check successful").into_response()
}

pub async fn root() -> Redirect {
    Redirect::to("/events")
}
