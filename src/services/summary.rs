use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Appointment, LessonType};
use crate::services::appointments::AppointmentStore;

/// Confirmation shown after a batch of sessions is booked, grouped by date.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub total_sessions: usize,
    pub lesson_type: Option<LessonType>,
    pub days: Vec<DaySummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub day: String,
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub appointment_id: String,
    pub session_number: u32,
    pub time: String,
    pub instructor: Option<String>,
}

pub fn summarize(appointments: &[Appointment], store: &AppointmentStore) -> BookingSummary {
    let mut by_date: BTreeMap<NaiveDate, DaySummary> = BTreeMap::new();

    for appointment in appointments {
        let instructor = store
            .slot(appointment.slot_id)
            .and_then(|slot| store.instructor(slot.instructor_id))
            .map(|i| i.name.clone());

        by_date
            .entry(appointment.booking_date)
            .or_insert_with(|| DaySummary {
                date: appointment.booking_date,
                day: appointment.day.clone(),
                sessions: Vec::new(),
            })
            .sessions
            .push(SessionSummary {
                appointment_id: appointment.id.clone(),
                session_number: appointment.session_number,
                time: appointment.time.clone(),
                instructor,
            });
    }

    let mut days: Vec<DaySummary> = by_date.into_values().collect();
    for day in &mut days {
        day.sessions.sort_by_key(|s| s.session_number);
    }

    BookingSummary {
        total_sessions: appointments.len(),
        lesson_type: appointments.first().map(|a| a.lesson_type),
        days,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::AppointmentStatus;
    use crate::services::appointments::BookingPolicy;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn booked(store: &AppointmentStore, id: &str, slot_id: i64, session_number: u32) -> Appointment {
        let slot = store.slot(slot_id).unwrap();
        Appointment {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            user_name: "Sara".to_string(),
            user_email: "sara@example.com".to_string(),
            user_phone: "0501234567".to_string(),
            slot_id,
            booking_date: slot.date,
            day: slot.day.clone(),
            time: slot.time.clone(),
            lesson_type: LessonType::Night,
            notes: None,
            status: AppointmentStatus::Pending,
            session_number,
            total_sessions: 3,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_groups_by_date_ascending() {
        let store = AppointmentStore::seeded(date("2025-06-16"), 1, BookingPolicy::default());
        // Submitted out of date order: Tuesday afternoon, Monday morning, Tuesday morning.
        let batch = vec![
            booked(&store, "a-1", 4, 1),
            booked(&store, "a-2", 1, 2),
            booked(&store, "a-3", 3, 3),
        ];

        let summary = summarize(&batch, &store);
        assert_eq!(summary.total_sessions, 3);
        assert_eq!(summary.lesson_type, Some(LessonType::Night));
        assert_eq!(summary.days.len(), 2);

        assert_eq!(summary.days[0].date, date("2025-06-16"));
        assert_eq!(summary.days[0].day, "Monday");
        assert_eq!(summary.days[0].sessions[0].instructor.as_deref(), Some("Ahmed Hassan"));

        let tuesday = &summary.days[1];
        assert_eq!(tuesday.sessions.len(), 2);
        assert_eq!(tuesday.sessions[0].session_number, 1);
        assert_eq!(tuesday.sessions[1].appointment_id, "a-3");
    }

    #[test]
    fn test_empty_batch() {
        let store = AppointmentStore::seeded(date("2025-06-16"), 1, BookingPolicy::default());
        let summary = summarize(&[], &store);
        assert_eq!(summary.total_sessions, 0);
        assert!(summary.lesson_type.is_none());
        assert!(summary.days.is_empty());
    }
}
