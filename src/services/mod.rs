pub mod appointments;
pub mod auth;
pub mod calendar;
pub mod catalog;
pub mod summary;
pub mod validation;
