pub mod admin;
pub mod appointments;
pub mod auth;
pub mod calendar;
pub mod health;
pub mod slots;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/slots", get(slots::list_slots))
        .route("/api/slots/dates", get(slots::available_dates))
        .route("/api/instructors", get(slots::list_instructors))
        .route("/api/instructors/:id", get(slots::get_instructor))
        .route(
            "/api/appointments",
            get(appointments::list_mine).post(appointments::book),
        )
        .route(
            "/api/appointments/:id/cancel",
            post(appointments::cancel_mine),
        )
        .route("/calendar/:appointment_id", get(calendar::download_ics))
        .route("/api/admin/overview", get(admin::overview))
        .route("/api/admin/appointments", get(admin::list_appointments))
        .route(
            "/api/admin/appointments/:id/cancel",
            post(admin::cancel_appointment),
        )
        .route("/api/admin/events", get(admin::events_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
