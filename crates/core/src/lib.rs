//! `rihla-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod mode;
pub mod money;

pub use error::{DomainError, DomainResult};
pub use id::{BookingId, CustomerId, DocumentId, EmployeeId, UserId};
pub use mode::DataMode;
pub use money::{Amount, AMOUNT_TOLERANCE};
