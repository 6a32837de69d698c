use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use rihla_core::{AMOUNT_TOLERANCE, Amount, CustomerId, UserId};

use crate::payment::{PaymentBlock, PaymentValidationError};

/// The five booking kinds. They differ only in line-item details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingKind {
    Flight,
    Hotel,
    Vehicle,
    Event,
    Visa,
}

impl BookingKind {
    pub const ALL: [BookingKind; 5] = [
        BookingKind::Flight,
        BookingKind::Hotel,
        BookingKind::Vehicle,
        BookingKind::Event,
        BookingKind::Visa,
    ];

    /// Tag written on accounting documents (`bookingType`).
    pub fn as_str(self) -> &'static str {
        match self {
            BookingKind::Flight => "flight",
            BookingKind::Hotel => "hotel",
            BookingKind::Vehicle => "vehicle",
            BookingKind::Event => "event",
            BookingKind::Visa => "visa",
        }
    }

    pub fn collection(self) -> &'static str {
        match self {
            BookingKind::Flight => "flightBookings",
            BookingKind::Hotel => "hotelBookings",
            BookingKind::Vehicle => "vehicleBookings",
            BookingKind::Event => "eventBookings",
            BookingKind::Visa => "visaBookings",
        }
    }

    /// Section gating the booking page.
    pub fn section(self) -> &'static str {
        match self {
            BookingKind::Flight => "flights",
            BookingKind::Hotel => "hotels",
            BookingKind::Vehicle => "vehicles",
            BookingKind::Event => "events",
            BookingKind::Visa => "visas",
        }
    }

    /// Permission needed to create or edit bookings of this kind.
    pub fn write_permission(self) -> &'static str {
        match self {
            BookingKind::Flight => "manage_flights",
            BookingKind::Hotel => "manage_hotels",
            BookingKind::Vehicle => "manage_vehicles",
            BookingKind::Event => "manage_events",
            BookingKind::Visa => "manage_visas",
        }
    }
}

impl core::fmt::Display for BookingKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer reference, denormalized for listing pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRef {
    pub id: CustomerId,
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// Employee/user who created the booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorRef {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    pub cost: Amount,
    pub price: Amount,
    /// Kind-specific fields (airline, hotel name, plate number, ...).
    #[serde(flatten)]
    pub details: Map<String, JsonValue>,
}

impl LineItem {
    pub fn new(description: impl Into<String>, cost: Amount, price: Amount) -> Self {
        Self {
            description: description.into(),
            cost,
            price,
            details: Map::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Sale price suggested by applying a percentage markup to the cost.
    pub fn suggested_price(&self, markup_percent: f64) -> Option<Amount> {
        self.cost.with_markup(markup_percent).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BookingValidationError {
    #[error("a customer must be selected")]
    MissingCustomer,

    #[error("a booking needs at least one line item")]
    NoLineItems,

    #[error("payment total price {declared} does not match line items ({computed})")]
    PriceMismatch { declared: Amount, computed: Amount },

    #[error("payment total cost {declared} does not match line items ({computed})")]
    CostMismatch { declared: Amount, computed: Amount },

    #[error(transparent)]
    Payment(#[from] PaymentValidationError),
}

/// Booking payload assembled by the booking form, not yet validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub kind: BookingKind,
    pub customer: Option<CustomerRef>,
    pub items: Vec<LineItem>,
    pub payment: PaymentBlock,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BookingDraft {
    /// Check every booking invariant. Runs before anything is persisted.
    pub fn validate(&self) -> Result<(), BookingValidationError> {
        let Some(customer) = &self.customer else {
            return Err(BookingValidationError::MissingCustomer);
        };
        if customer.name.trim().is_empty() {
            return Err(BookingValidationError::MissingCustomer);
        }

        if self.items.is_empty() {
            return Err(BookingValidationError::NoLineItems);
        }

        let computed_price: Amount = self.items.iter().map(|i| i.price).sum();
        if !computed_price.approx_eq(self.payment.total_price, AMOUNT_TOLERANCE) {
            return Err(BookingValidationError::PriceMismatch {
                declared: self.payment.total_price,
                computed: computed_price,
            });
        }

        let computed_cost: Amount = self.items.iter().map(|i| i.cost).sum();
        if !computed_cost.approx_eq(self.payment.total_cost, AMOUNT_TOLERANCE) {
            return Err(BookingValidationError::CostMismatch {
                declared: self.payment.total_cost,
                computed: computed_cost,
            });
        }

        self.payment.validate()?;
        Ok(())
    }

    /// Validate and stamp creator + creation time.
    pub fn into_booking(
        self,
        created_by: CreatorRef,
        created_at: DateTime<Utc>,
    ) -> Result<Booking, BookingValidationError> {
        self.validate()?;
        let customer = self.customer.ok_or(BookingValidationError::MissingCustomer)?;
        Ok(Booking {
            kind: self.kind,
            customer,
            items: self.items,
            payment: self.payment,
            notes: self.notes,
            created_by,
            created_at,
        })
    }
}

/// A validated booking, ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub kind: BookingKind,
    pub customer: CustomerRef,
    pub items: Vec<LineItem>,
    pub payment: PaymentBlock,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: CreatorRef,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn total_cost(&self) -> Amount {
        self.items.iter().map(|i| i.cost).sum()
    }

    pub fn total_price(&self) -> Amount {
        self.items.iter().map(|i| i.price).sum()
    }

    /// Sale minus cost; negative for a loss.
    pub fn profit(&self) -> f64 {
        self.total_price().difference(self.total_cost())
    }

    /// Whether two versions differ in any money-bearing field.
    pub fn financially_differs(&self, other: &Booking) -> bool {
        self.payment != other.payment
            || self.items.len() != other.items.len()
            || self
                .items
                .iter()
                .zip(&other.items)
                .any(|(a, b)| a.cost != b.cost || a.price != b.price)
    }
}
