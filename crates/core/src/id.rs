//! Strongly-typed identifiers used across the domain.
//!
//! The document store hands out opaque string ids, so every identifier wraps a
//! `String` rather than a parsed UUID. Locally generated ids are UUIDv7 strings.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of any stored document (collection-agnostic).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

/// Identifier of an application user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Identifier of an employee record (users may be derived from employees).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(String);

/// Identifier of a customer record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

/// Identifier of a booking (flight/hotel/vehicle/event/visa).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

macro_rules! impl_string_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Generate a fresh identifier (UUIDv7, time-ordered).
            ///
            /// Prefer passing ids explicitly in tests for determinism.
            pub fn generate() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Wrap an id produced elsewhere (e.g. by the document store).
            ///
            /// Empty or whitespace-only ids are rejected.
            pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: empty", $name)));
                }
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

impl_string_id!(DocumentId, "DocumentId");
impl_string_id!(UserId, "UserId");
impl_string_id!(EmployeeId, "EmployeeId");
impl_string_id!(CustomerId, "CustomerId");
impl_string_id!(BookingId, "BookingId");

impl From<DocumentId> for BookingId {
    fn from(value: DocumentId) -> Self {
        Self(value.0)
    }
}

impl From<BookingId> for DocumentId {
    fn from(value: BookingId) -> Self {
        Self(value.0)
    }
}

impl From<DocumentId> for UserId {
    fn from(value: DocumentId) -> Self {
        Self(value.0)
    }
}
