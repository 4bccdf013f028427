use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::errors::AppError;
use crate::handlers::auth::require_user;
use crate::models::{Appointment, AppointmentStatus, LessonType, StoreEvent, User};
use crate::services::appointments::AppointmentStore;
use crate::services::summary::{self, BookingSummary};
use crate::services::validation;
use crate::state::AppState;

pub const MAX_SESSIONS_PER_BATCH: usize = 20;
pub const MAX_NOTES_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSelection {
    pub date: NaiveDate,
    pub slot_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub lesson_type: LessonType,
    pub notes: Option<String>,
    pub sessions: Vec<SessionSelection>,
}

struct Contact {
    name: String,
    email: String,
    phone: String,
}

/// Form values win over the profile, matching the booking form's prefill.
fn resolve_contact(user: &User, body: &BookRequest) -> Result<Contact, AppError> {
    fn pick(form: Option<&str>, profile: Option<&str>) -> String {
        form.map(str::trim)
            .filter(|v| !v.is_empty())
            .or(profile)
            .unwrap_or_default()
            .to_string()
    }

    let contact = Contact {
        name: pick(body.name.as_deref(), Some(user.name.as_str())),
        email: pick(body.email.as_deref(), Some(user.email.as_str())),
        phone: pick(body.phone.as_deref(), user.phone.as_deref()),
    };

    if contact.name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    if !validation::is_valid_email(&contact.email) {
        return Err(AppError::BadRequest("invalid email address".to_string()));
    }
    if !contact.phone.is_empty() && !validation::is_valid_phone(&contact.phone) {
        return Err(AppError::BadRequest("phone number must be 10 digits".to_string()));
    }
    Ok(contact)
}

fn build_batch(
    user: &User,
    contact: &Contact,
    body: &BookRequest,
    store: &AppointmentStore,
) -> Vec<Appointment> {
    let total = body.sessions.len() as u32;
    let created_at = Utc::now().naive_utc();
    let notes = body
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    body.sessions
        .iter()
        .zip(1..)
        .map(|(selection, session_number)| {
            let slot = store.slot(selection.slot_id);
            Appointment {
                id: uuid::Uuid::new_v4().to_string(),
                user_id: user.id.clone(),
                user_name: contact.name.clone(),
                user_email: contact.email.clone(),
                user_phone: contact.phone.clone(),
                slot_id: selection.slot_id,
                booking_date: selection.date,
                day: slot
                    .map(|s| s.day.clone())
                    .unwrap_or_else(|| selection.date.format("%A").to_string()),
                time: slot.map(|s| s.time.clone()).unwrap_or_default(),
                lesson_type: body.lesson_type,
                notes: notes.clone(),
                status: AppointmentStatus::Pending,
                session_number,
                total_sessions: total,
                created_at,
            }
        })
        .collect()
}

// POST /api/appointments
pub async fn book(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<BookRequest>,
) -> Result<Json<BookingSummary>, AppError> {
    let user = require_user(&state, &headers)?;

    if body.sessions.is_empty() {
        return Err(AppError::BadRequest("select at least one session".to_string()));
    }
    if body.sessions.len() > MAX_SESSIONS_PER_BATCH {
        return Err(AppError::BadRequest(format!(
            "at most {MAX_SESSIONS_PER_BATCH} sessions can be booked at once"
        )));
    }
    if body.notes.as_deref().is_some_and(|n| n.chars().count() > MAX_NOTES_CHARS) {
        return Err(AppError::BadRequest(format!(
            "notes must be at most {MAX_NOTES_CHARS} characters"
        )));
    }
    let mut seen = HashSet::new();
    if !body.sessions.iter().all(|s| seen.insert(s.slot_id)) {
        return Err(AppError::BadRequest(
            "each session must use a different time slot".to_string(),
        ));
    }
    let contact = resolve_contact(&user, &body)?;

    let (summary, events) = {
        let mut store = state.store()?;
        let batch = build_batch(&user, &contact, &body, &store);

        let mut events: Vec<StoreEvent> = Vec::with_capacity(batch.len());
        let mut booked: Vec<Appointment> = Vec::with_capacity(batch.len());
        for appointment in batch {
            let id = appointment.id.clone();
            match store.book(appointment.clone()) {
                Ok(event) => {
                    events.push(event);
                    booked.push(appointment);
                }
                Err(e) => {
                    // Undo this batch so the student never ends up half-booked.
                    for done in &booked {
                        store.cancel(&done.id);
                    }
                    tracing::warn!(
                        user_id = %user.id,
                        appointment_id = %id,
                        error = %e,
                        rolled_back = booked.len(),
                        "booking batch rejected"
                    );
                    return Err(e.into());
                }
            }
        }

        (summary::summarize(&booked, &store), events)
    };

    tracing::info!(
        user_id = %user.id,
        sessions = summary.total_sessions,
        "booking batch confirmed"
    );
    for event in events {
        state.publish(event);
    }

    Ok(Json(summary))
}

// GET /api/appointments
pub async fn list_mine(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let user = require_user(&state, &headers)?;

    let mut appointments: Vec<Appointment> = {
        let store = state.store()?;
        store
            .appointments_for_user(&user.id)
            .into_iter()
            .cloned()
            .collect()
    };
    appointments.sort_by_key(|a| (a.booking_date, a.slot_id, a.session_number));

    Ok(Json(appointments))
}

// POST /api/appointments/:id/cancel
pub async fn cancel_mine(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = require_user(&state, &headers)?;

    let cancelled = {
        let mut store = state.store()?;
        let owner = store.appointment(&id).map(|a| a.user_id.clone());
        match owner {
            Some(owner) if owner != user.id => return Err(AppError::Forbidden),
            Some(_) => store.cancel(&id),
            None => None,
        }
    };

    let was_cancelled = cancelled.is_some();
    if let Some((_, event)) = cancelled {
        state.publish(event);
    }

    Ok(Json(serde_json::json!({"ok": true, "cancelled": was_cancelled})))
}
