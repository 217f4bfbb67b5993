pub mod bookings;
pub mod manual_reservation;
pub mod mapping;
pub mod registration;

pub use bookings::*;
pub use manual_reservation::*;
pub use mapping::*;
pub use registration::*;
