pub mod bookings;
pub mod documents;
pub mod health;
pub mod manual_reservation;
pub mod mapping;
pub mod metrics;
pub mod registration;
