pub mod bookings;
pub mod import;
pub mod tasks;
