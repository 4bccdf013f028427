use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: i64,
    pub day: String,
    pub time: String,
    pub date: NaiveDate,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub instructor_id: i64,
    pub max_students: u32,
    pub booked_students: u32,
}

impl Slot {
    /// A slot is open while it still has a free seat. Never stored.
    pub fn is_available(&self) -> bool {
        self.booked_students < self.max_students
    }

    pub fn seats_left(&self) -> u32 {
        self.max_students.saturating_sub(self.booked_students)
    }

    /// Takes one seat. Saturates at capacity so the counter never exceeds
    /// `max_students`; returns false when no seat was free.
    pub(crate) fn reserve(&mut self) -> bool {
        if self.booked_students >= self.max_students {
            self.booked_students = self.max_students;
            return false;
        }
        self.booked_students += 1;
        true
    }

    /// Gives one seat back, floored at zero.
    pub(crate) fn release(&mut self) {
        self.booked_students = self.booked_students.saturating_sub(1);
    }
}

/// Renders a time range the way the booking page shows it, e.g. `9:00 AM - 11:00 AM`.
pub fn display_time_range(start: NaiveTime, end: NaiveTime) -> String {
    format!(
        "{} - {}",
        start.format("%-I:%M %p"),
        end.format("%-I:%M %p")
    )
}
