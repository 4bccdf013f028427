use crate::models::{Appointment, AppointmentStatus, Instructor, Slot};

/// TEXT value escaping for iCalendar properties (RFC 5545 section 3.3.11).
/// Line breaks in any form collapse to a literal `\n`.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

pub fn generate_ics(
    appointment: &Appointment,
    slot: &Slot,
    instructor: Option<&Instructor>,
    school_name: &str,
) -> String {
    let dtstart = appointment
        .booking_date
        .and_time(slot.starts_at)
        .format("%Y%m%dT%H%M%S")
        .to_string();
    let dtend = appointment
        .booking_date
        .and_time(slot.ends_at)
        .format("%Y%m%dT%H%M%S")
        .to_string();
    let dtstamp = appointment.created_at.format("%Y%m%dT%H%M%S").to_string();
    let uid = format!("{}@drivebook", appointment.id);

    let summary = escape_text(&format!(
        "{} driving lesson ({}/{}) - {}",
        appointment.lesson_type.label(),
        appointment.session_number,
        appointment.total_sessions,
        school_name
    ));
    let description = match (instructor, appointment.notes.as_deref()) {
        (Some(i), Some(notes)) => format!("Instructor: {}. {notes}", i.name),
        (Some(i), None) => format!("Instructor: {}", i.name),
        (None, Some(notes)) => notes.to_string(),
        (None, None) => "No additional notes".to_string(),
    };
    let description = escape_text(&description);
    let status = match appointment.status {
        AppointmentStatus::Confirmed => "CONFIRMED",
        AppointmentStatus::Pending => "TENTATIVE",
    };

    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Drivebook//Lesson Booking//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         DESCRIPTION:{description}\r\n\
         STATUS:{status}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LessonType;
    use crate::services::catalog;
    use chrono::{NaiveDate, NaiveDateTime};

    fn fixtures() -> (Appointment, Slot) {
        let slot = catalog::slots(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(), 1)
            .into_iter()
            .find(|s| s.id == 4)
            .unwrap();
        let appointment = Appointment {
            id: "test-123".to_string(),
            user_id: "sara@example.com".to_string(),
            user_name: "Sara".to_string(),
            user_email: "sara@example.com".to_string(),
            user_phone: "0501234567".to_string(),
            slot_id: slot.id,
            booking_date: slot.date,
            day: slot.day.clone(),
            time: slot.time.clone(),
            lesson_type: LessonType::Parking,
            notes: Some("Parallel parking".to_string()),
            status: AppointmentStatus::Pending,
            session_number: 2,
            total_sessions: 3,
            created_at: NaiveDateTime::parse_from_str("2025-03-01 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
        };
        (appointment, slot)
    }

    #[test]
    fn test_generate_ics() {
        let (appointment, slot) = fixtures();
        let instructors = catalog::instructors();
        let ics = generate_ics(&appointment, &slot, instructors.first(), "Drivebook");

        // Slot 4 is Tuesday afternoon, 2025-03-11 14:00-16:00.
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("DTSTART:20250311T140000"));
        assert!(ics.contains("DTEND:20250311T160000"));
        assert!(ics.contains("DTSTAMP:20250301T100000"));
        assert!(ics.contains("SUMMARY:Parking practice driving lesson (2/3) - Drivebook"));
        assert!(ics.contains("DESCRIPTION:Instructor: Ahmed Hassan. Parallel parking"));
        assert!(ics.contains("STATUS:TENTATIVE"));
        assert!(ics.contains("UID:test-123@drivebook"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn test_generate_ics_no_notes_no_instructor() {
        let (mut appointment, slot) = fixtures();
        appointment.notes = None;
        appointment.status = AppointmentStatus::Confirmed;

        let ics = generate_ics(&appointment, &slot, None, "Drivebook");
        assert!(ics.contains("DESCRIPTION:No additional notes"));
        assert!(ics.contains("STATUS:CONFIRMED"));
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a;b,c\\d"), "a\\;b\\,c\\\\d");
        assert_eq!(escape_text("one\r\ntwo\nthree\rfour"), "one\\ntwo\\nthree\\nfour");
        assert_eq!(escape_text("tab\there"), "tabhere");
    }

    #[test]
    fn test_notes_cannot_add_calendar_lines() {
        let (mut appointment, slot) = fixtures();
        appointment.notes = Some(
            "hi; bring glasses, please\r\nEND:VEVENT\r\nBEGIN:VEVENT\r\nSUMMARY:injected".to_string(),
        );

        let ics = generate_ics(&appointment, &slot, None, "Drivebook");
        let lines: Vec<&str> = ics.split("\r\n").collect();
        assert_eq!(lines.iter().filter(|l| **l == "BEGIN:VEVENT").count(), 1);
        assert_eq!(lines.iter().filter(|l| **l == "END:VEVENT").count(), 1);
        assert_eq!(ics.matches("\r\n").count(), 13);
        assert!(ics.contains(
            "DESCRIPTION:hi\\; bring glasses\\, please\\nEND:VEVENT\\nBEGIN:VEVENT\\nSUMMARY:injected\r\n"
        ));
        assert!(!ics.contains("\r\nSUMMARY:injected"));
    }
}
