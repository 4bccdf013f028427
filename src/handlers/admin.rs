use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, Sse};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::{BroadcastStream, IntervalStream};
use tokio_stream::StreamExt;

use crate::errors::AppError;
use crate::handlers::auth::{require_admin, require_admin_token};
use crate::models::Appointment;
use crate::services::auth;
use crate::state::AppState;

// GET /api/admin/overview
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    appointments: usize,
    students: usize,
    slots: usize,
    fully_booked_slots: usize,
    seats_booked: u32,
    seats_total: u32,
    available_dates: usize,
    active_sessions: i64,
}

pub async fn overview(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<OverviewResponse>, AppError> {
    require_admin(&state, &headers)?;

    let active_sessions = {
        let db = state.db()?;
        auth::active_sessions(&db)?
    };

    let store = state.store()?;
    let students: HashSet<&str> = store
        .appointments()
        .iter()
        .map(|a| a.user_id.as_str())
        .collect();

    let response = OverviewResponse {
        appointments: store.appointments().len(),
        students: students.len(),
        slots: store.slots().len(),
        fully_booked_slots: store.slots().iter().filter(|s| !s.is_available()).count(),
        seats_booked: store.slots().iter().map(|s| s.booked_students).sum(),
        seats_total: store.slots().iter().map(|s| s.max_students).sum(),
        available_dates: store.available_dates().len(),
        active_sessions,
    };

    Ok(Json(response))
}

// GET /api/admin/appointments
#[derive(Deserialize)]
pub struct AppointmentsQuery {
    pub date: Option<NaiveDate>,
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AppointmentsQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    require_admin(&state, &headers)?;

    let appointments: Vec<Appointment> = {
        let store = state.store()?;
        store
            .appointments()
            .iter()
            .filter(|a| query.date.map_or(true, |d| a.booking_date == d))
            .cloned()
            .collect()
    };

    Ok(Json(appointments))
}

// POST /api/admin/appointments/:id/cancel
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let admin = require_admin(&state, &headers)?;

    let cancelled = state.store()?.cancel(&id);
    let was_cancelled = cancelled.is_some();
    if let Some((appointment, event)) = cancelled {
        tracing::info!(
            admin = %admin.id,
            appointment_id = %appointment.id,
            user_id = %appointment.user_id,
            "admin cancelled appointment"
        );
        state.publish(event);
    }

    Ok(Json(serde_json::json!({"ok": true, "cancelled": was_cancelled})))
}

// GET /api/admin/events — SSE stream
#[derive(Deserialize)]
pub struct SseQuery {
    pub token: Option<String>,
}

pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SseQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    // EventSource can't set headers, so the token may also come as a query param.
    match query.token.as_deref() {
        Some(token) => require_admin_token(&state, token)?,
        None => require_admin(&state, &headers)?,
    };

    let rx = state.events_tx.subscribe();

    let live_stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(data).event("store_event")))
        }
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "admin event stream lagged");
            None
        }
    });

    let keepalive_stream = IntervalStream::new(tokio::time::interval(Duration::from_secs(30)))
        .map(|_| Ok(Event::default().comment("keepalive")));

    Ok(Sse::new(live_stream.merge(keepalive_stream)))
}
