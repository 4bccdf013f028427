use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};

use crate::models::slot::display_time_range;
use crate::models::{Instructor, Slot};

pub const SLOT_CAPACITY: u32 = 4;

/// Slot id seeded as already full, matching the booking page's long-standing
/// "booked" Wednesday morning.
pub const SEEDED_FULL_SLOT: i64 = 5;

struct WeeklySession {
    weekday: Weekday,
    start: (u32, u32),
    end: (u32, u32),
    instructor_id: i64,
}

const WEEKLY_TEMPLATE: [WeeklySession; 6] = [
    WeeklySession { weekday: Weekday::Mon, start: (9, 0), end: (11, 0), instructor_id: 1 },
    WeeklySession { weekday: Weekday::Mon, start: (14, 0), end: (16, 0), instructor_id: 2 },
    WeeklySession { weekday: Weekday::Tue, start: (9, 0), end: (11, 0), instructor_id: 3 },
    WeeklySession { weekday: Weekday::Tue, start: (14, 0), end: (16, 0), instructor_id: 1 },
    WeeklySession { weekday: Weekday::Wed, start: (9, 0), end: (11, 0), instructor_id: 2 },
    WeeklySession { weekday: Weekday::Wed, start: (14, 0), end: (16, 0), instructor_id: 3 },
];

pub fn instructors() -> Vec<Instructor> {
    vec![
        Instructor {
            id: 1,
            name: "Ahmed Hassan".to_string(),
            specialization: "Beginner lessons".to_string(),
            experience: "12 years".to_string(),
        },
        Instructor {
            id: 2,
            name: "Mona Khalil".to_string(),
            specialization: "Highway and night driving".to_string(),
            experience: "8 years".to_string(),
        },
        Instructor {
            id: 3,
            name: "Omar Saleh".to_string(),
            specialization: "Parking and manoeuvres".to_string(),
            experience: "5 years".to_string(),
        },
    ]
}

/// The Monday on or after `date`.
pub fn next_monday(date: NaiveDate) -> NaiveDate {
    let days_ahead = (7 - date.weekday().num_days_from_monday()) % 7;
    date + Days::new(u64::from(days_ahead))
}

/// Builds the slot catalog for `weeks` weeks, starting with the week of the
/// first Monday on or after `start`. Ids are sequential in catalog order.
pub fn slots(start: NaiveDate, weeks: u32) -> Vec<Slot> {
    let first_monday = next_monday(start);
    let mut slots = Vec::with_capacity(WEEKLY_TEMPLATE.len() * weeks as usize);
    let mut next_id = 1;

    for week in 0..weeks {
        let monday = first_monday + Days::new(u64::from(week) * 7);
        for session in &WEEKLY_TEMPLATE {
            let date = monday + Days::new(u64::from(session.weekday.num_days_from_monday()));
            let (Some(starts_at), Some(ends_at)) = (
                NaiveTime::from_hms_opt(session.start.0, session.start.1, 0),
                NaiveTime::from_hms_opt(session.end.0, session.end.1, 0),
            ) else {
                continue;
            };

            let booked_students = if next_id == SEEDED_FULL_SLOT {
                SLOT_CAPACITY
            } else {
                0
            };

            slots.push(Slot {
                id: next_id,
                day: date.format("%A").to_string(),
                time: display_time_range(starts_at, ends_at),
                date,
                starts_at,
                ends_at,
                instructor_id: session.instructor_id,
                max_students: SLOT_CAPACITY,
                booked_students,
            });
            next_id += 1;
        }
    }

    slots
}
