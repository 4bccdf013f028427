pub mod appointment;
pub mod event;
pub mod instructor;
pub mod slot;
pub mod user;

pub use appointment::{Appointment, AppointmentStatus, LessonType};
pub use event::StoreEvent;
pub use instructor::Instructor;
pub use slot::Slot;
pub use user::{AuthSnapshot, Role, User};
