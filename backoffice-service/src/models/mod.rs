//! Domain models for backoffice-service.

mod commands;
mod mapping;
mod reservation;

pub use commands::{
    AgencyRegistration, Cancellation, NewReservation, NewReservationGuest, NewReservationHotel,
    PriceUpdate, WireMarkup, WireMoney, WirePriceDetails,
};
pub use mapping::{
    CountryRecord, DecisionStatus, HotelRecord, MappingDecision, MappingEntity,
};
pub use reservation::{
    AgencyInfo, Guest, HotelInfo, ListReservationsFilter, MoneyValue, PriceDetails, RawMarkup,
    Reservation, ReservationPage, ReservationStatus,
};
