use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Instructor, Slot};
use crate::services::appointments::AppointmentStore;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotResponse {
    id: i64,
    day: String,
    time: String,
    date: NaiveDate,
    instructor_id: i64,
    instructor_name: Option<String>,
    max_students: u32,
    booked_students: u32,
    available: bool,
}

impl SlotResponse {
    pub(crate) fn new(slot: &Slot, store: &AppointmentStore) -> Self {
        Self {
            id: slot.id,
            day: slot.day.clone(),
            time: slot.time.clone(),
            date: slot.date,
            instructor_id: slot.instructor_id,
            instructor_name: store.instructor(slot.instructor_id).map(|i| i.name.clone()),
            max_students: slot.max_students,
            booked_students: slot.booked_students,
            available: slot.is_available(),
        }
    }
}

// GET /api/slots/dates
pub async fn available_dates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<NaiveDate>>, AppError> {
    let dates = state.store()?.available_dates();
    Ok(Json(dates))
}

// GET /api/slots?date=YYYY-MM-DD
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: Option<String>,
}

pub async fn list_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Vec<SlotResponse>>, AppError> {
    let date = query
        .date
        .as_deref()
        .map(|d| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|_| AppError::BadRequest(format!("invalid date: {d}")))
        })
        .transpose()?;

    let store = state.store()?;
    let slots: Vec<&Slot> = match date {
        Some(date) => store.slots_by_date(date),
        None => store.slots().iter().collect(),
    };

    Ok(Json(
        slots
            .into_iter()
            .map(|slot| SlotResponse::new(slot, &store))
            .collect(),
    ))
}

// GET /api/instructors
pub async fn list_instructors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Instructor>>, AppError> {
    let instructors = state.store()?.instructors().to_vec();
    Ok(Json(instructors))
}

// GET /api/instructors/:id
pub async fn get_instructor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Instructor>, AppError> {
    let instructor = state.store()?.instructor(id).cloned();
    instructor
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("instructor {id}")))
}
