use chrono::NaiveDate;
use serde::Serialize;

/// Emitted after every store mutation, streamed to the admin dashboard.
/// Slot counters are `None` when the appointment references no known slot.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StoreEvent {
    Booked {
        appointment_id: String,
        slot_id: i64,
        date: NaiveDate,
        booked_students: Option<u32>,
        available: Option<bool>,
    },
    Cancelled {
        appointment_id: String,
        slot_id: i64,
        booked_students: Option<u32>,
        available: Option<bool>,
    },
}
