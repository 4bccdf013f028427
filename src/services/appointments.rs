use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;

use crate::models::{Appointment, Instructor, Slot, StoreEvent};
use crate::services::catalog;

/// How strictly `AppointmentStore::book` treats requests the booking page
/// should never send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    /// Reject appointments whose slot id is not in the catalog. When off, the
    /// appointment is recorded and no slot is touched.
    pub reject_unknown_slot: bool,
    /// Reject appointments against a slot with no free seat. When off, the
    /// appointment is recorded and the seat counter stays at capacity.
    pub enforce_capacity: bool,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            reject_unknown_slot: true,
            enforce_capacity: true,
        }
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum BookingError {
    #[error("unknown slot: {0}")]
    UnknownSlot(i64),

    #[error("slot {0} is fully booked")]
    SlotFull(i64),

    #[error("slot {slot_id} is on {expected}, not {got}")]
    DateMismatch {
        slot_id: i64,
        expected: NaiveDate,
        got: NaiveDate,
    },

    #[error("appointment {0} already exists")]
    DuplicateId(String),
}

/// Slot inventory and booked appointments. Every seat counter change goes
/// through `Slot::reserve` / `Slot::release`.
#[derive(Debug, Clone)]
pub struct AppointmentStore {
    instructors: Vec<Instructor>,
    slots: Vec<Slot>,
    appointments: Vec<Appointment>,
    /// Appointments recorded against a full slot without taking a seat;
    /// cancelling them must not give a seat back.
    seatless: HashSet<String>,
    policy: BookingPolicy,
}

impl AppointmentStore {
    pub fn new(instructors: Vec<Instructor>, slots: Vec<Slot>, policy: BookingPolicy) -> Self {
        Self {
            instructors,
            slots,
            appointments: Vec::new(),
            seatless: HashSet::new(),
            policy,
        }
    }

    /// Store over the seeded catalog.
    pub fn seeded(start: NaiveDate, weeks: u32, policy: BookingPolicy) -> Self {
        Self::new(catalog::instructors(), catalog::slots(start, weeks), policy)
    }

    pub fn policy(&self) -> BookingPolicy {
        self.policy
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn instructors(&self) -> &[Instructor] {
        &self.instructors
    }

    /// Distinct dates with at least one open slot, ascending.
    pub fn available_dates(&self) -> Vec<NaiveDate> {
        self.slots
            .iter()
            .filter(|slot| slot.is_available())
            .map(|slot| slot.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Every slot on `date`, open or not, in catalog order.
    pub fn slots_by_date(&self, date: NaiveDate) -> Vec<&Slot> {
        self.slots.iter().filter(|slot| slot.date == date).collect()
    }

    pub fn instructor(&self, id: i64) -> Option<&Instructor> {
        self.instructors.iter().find(|i| i.id == id)
    }

    pub fn slot(&self, id: i64) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    pub fn appointment(&self, id: &str) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    pub fn appointments_for_user(&self, user_id: &str) -> Vec<&Appointment> {
        self.appointments
            .iter()
            .filter(|a| a.user_id == user_id)
            .collect()
    }

    pub fn book(&mut self, appointment: Appointment) -> Result<StoreEvent, BookingError> {
        if self.appointment(&appointment.id).is_some() {
            return Err(BookingError::DuplicateId(appointment.id));
        }

        let Some(slot) = self.slots.iter_mut().find(|s| s.id == appointment.slot_id) else {
            if self.policy.reject_unknown_slot {
                return Err(BookingError::UnknownSlot(appointment.slot_id));
            }
            tracing::warn!(
                appointment_id = %appointment.id,
                slot_id = appointment.slot_id,
                "recording appointment against unknown slot"
            );
            let event = StoreEvent::Booked {
                appointment_id: appointment.id.clone(),
                slot_id: appointment.slot_id,
                date: appointment.booking_date,
                booked_students: None,
                available: None,
            };
            self.appointments.push(appointment);
            return Ok(event);
        };

        if slot.date != appointment.booking_date {
            return Err(BookingError::DateMismatch {
                slot_id: slot.id,
                expected: slot.date,
                got: appointment.booking_date,
            });
        }

        if !slot.is_available() && self.policy.enforce_capacity {
            return Err(BookingError::SlotFull(slot.id));
        }

        if !slot.reserve() {
            tracing::warn!(
                appointment_id = %appointment.id,
                slot_id = slot.id,
                "slot over capacity, appointment recorded without a seat"
            );
            self.seatless.insert(appointment.id.clone());
        }

        let event = StoreEvent::Booked {
            appointment_id: appointment.id.clone(),
            slot_id: slot.id,
            date: slot.date,
            booked_students: Some(slot.booked_students),
            available: Some(slot.is_available()),
        };

        tracing::info!(
            appointment_id = %appointment.id,
            slot_id = slot.id,
            booked = slot.booked_students,
            capacity = slot.max_students,
            "booked appointment"
        );

        self.appointments.push(appointment);
        Ok(event)
    }

    /// Removes the appointment and gives its seat back. Unknown ids are a no-op.
    pub fn cancel(&mut self, appointment_id: &str) -> Option<(Appointment, StoreEvent)> {
        let idx = self
            .appointments
            .iter()
            .position(|a| a.id == appointment_id)?;
        let appointment = self.appointments.remove(idx);
        let seated = !self.seatless.remove(&appointment.id);

        let mut slot = self.slots.iter_mut().find(|s| s.id == appointment.slot_id);
        if let Some(slot) = slot.as_deref_mut().filter(|_| seated) {
            slot.release();
        }

        let event = StoreEvent::Cancelled {
            appointment_id: appointment.id.clone(),
            slot_id: appointment.slot_id,
            booked_students: slot.as_ref().map(|s| s.booked_students),
            available: slot.as_ref().map(|s| s.is_available()),
        };

        tracing::info!(
            appointment_id = %appointment.id,
            slot_id = appointment.slot_id,
            "cancelled appointment"
        );

        Some((appointment, event))
    }
}
