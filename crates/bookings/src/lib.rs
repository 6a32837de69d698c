//! Bookings domain module.
//!
//! Flight, hotel, vehicle, event and visa bookings share one shape: a
//! customer, line items and a payment block. Pure domain logic only: no IO,
//! no persistence concerns.

pub mod booking;
pub mod payment;

pub use booking::{
    Booking, BookingDraft, BookingKind, BookingValidationError, CreatorRef, CustomerRef, LineItem,
};
pub use payment::{PaymentBlock, PaymentMethod, PaymentValidationError, MAX_INSTALLMENTS};
