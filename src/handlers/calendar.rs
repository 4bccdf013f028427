use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};

use crate::errors::AppError;
use crate::handlers::auth::require_user;
use crate::models::Role;
use crate::services::calendar::generate_ics;
use crate::state::AppState;

// GET /calendar/:appointment_id
pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let user = require_user(&state, &headers)?;
    let appointment_id = raw_id.strip_suffix(".ics").unwrap_or(&raw_id);

    let ics = {
        let store = state.store()?;
        let appointment = store
            .appointment(appointment_id)
            .ok_or_else(|| AppError::NotFound("appointment".to_string()))?;
        if appointment.user_id != user.id && user.role != Role::Admin {
            return Err(AppError::Forbidden);
        }
        let slot = store
            .slot(appointment.slot_id)
            .ok_or_else(|| AppError::NotFound(format!("slot {}", appointment.slot_id)))?;
        let instructor = store.instructor(slot.instructor_id);
        generate_ics(appointment, slot, instructor, &state.config.school_name)
    };

    let filename = format!("lesson-{appointment_id}.ics");
    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response())
}
