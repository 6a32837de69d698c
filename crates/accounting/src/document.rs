use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rihla_bookings::{Booking, BookingKind, PaymentMethod};
use rihla_core::{Amount, BookingId, CustomerId, DataMode, UserId};

/// The three documents fanned out from one saved booking, in posting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Artifact {
    Revenue,
    Invoice,
    Receipt,
}

impl Artifact {
    pub const ALL: [Artifact; 3] = [Artifact::Revenue, Artifact::Invoice, Artifact::Receipt];

    pub fn collection(self) -> &'static str {
        match self {
            Artifact::Revenue => "revenues",
            Artifact::Invoice => "invoices",
            Artifact::Receipt => "receipts",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Artifact::Revenue => "revenue",
            Artifact::Invoice => "invoice",
            Artifact::Receipt => "receipt",
        }
    }
}

impl core::fmt::Display for Artifact {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Posted,
    /// The source booking was deleted.
    Void,
}

/// What the posting workflow needs to know about a saved booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub amount: Amount,
    pub booking_type: BookingKind,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub receipt_number: String,
    pub created_by: UserId,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
}

impl PaymentSummary {
    /// Summary of a booking's payment.
    ///
    /// The amount is always the total sale price, including for
    /// installment plans: individual installments are not posted.
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            amount: booking.payment.total_price,
            booking_type: booking.kind,
            customer_id: booking.customer.id.clone(),
            customer_name: booking.customer.name.clone(),
            payment_method: booking.payment.method,
            receipt_number: booking.payment.receipt_number.clone(),
            created_by: booking.created_by.id.clone(),
            created_by_name: booking.created_by.name.clone(),
            created_at: booking.created_at,
        }
    }
}

/// Revenue entry, invoice or receipt. All three share this shape and differ
/// only by collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountingDocument {
    pub booking_id: BookingId,
    pub amount: Amount,
    pub booking_type: BookingKind,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub receipt_number: String,
    pub created_by: UserId,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub data_mode: DataMode,
    #[serde(default)]
    pub status: DocumentStatus,
}

impl AccountingDocument {
    pub fn for_booking(booking_id: &BookingId, summary: &PaymentSummary, mode: DataMode) -> Self {
        Self {
            booking_id: booking_id.clone(),
            amount: summary.amount,
            booking_type: summary.booking_type,
            customer_id: summary.customer_id.clone(),
            customer_name: summary.customer_name.clone(),
            payment_method: summary.payment_method,
            receipt_number: summary.receipt_number.clone(),
            created_by: summary.created_by.clone(),
            created_by_name: summary.created_by_name.clone(),
            created_at: summary.created_at,
            data_mode: mode,
            status: DocumentStatus::Posted,
        }
    }

    pub fn is_void(&self) -> bool {
        self.status == DocumentStatus::Void
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rihla_bookings::{BookingDraft, CreatorRef, CustomerRef, LineItem, PaymentBlock};

    fn amt(v: f64) -> Amount {
        Amount::new(v).unwrap()
    }

    fn installment_booking() -> Booking {
        let mut payment = PaymentBlock::new(PaymentMethod::Installments, amt(250.0), amt(300.0));
        payment.installments = vec![Some(amt(100.0)), Some(amt(100.0)), Some(amt(100.0))];
        payment.receipt_number = "R-0042".to_string();
        BookingDraft {
            kind: BookingKind::Hotel,
            customer: Some(CustomerRef {
                id: CustomerId::parse("cust-9").unwrap(),
                name: "Yousef".to_string(),
                phone: String::new(),
            }),
            items: vec![LineItem::new("Jumeirah, 3 nights", amt(250.0), amt(300.0))],
            payment,
            notes: None,
        }
        .into_booking(
            CreatorRef {
                id: UserId::parse("u-1").unwrap(),
                name: "Agent".to_string(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn installments_post_total_sale_price() {
        let summary = PaymentSummary::from_booking(&installment_booking());
        assert_eq!(summary.amount, amt(300.0));
        assert_eq!(summary.receipt_number, "R-0042");
    }

    #[test]
    fn document_serializes_with_store_field_names() {
        let booking = installment_booking();
        let summary = PaymentSummary::from_booking(&booking);
        let doc = AccountingDocument::for_booking(
            &BookingId::parse("b-1").unwrap(),
            &summary,
            DataMode::Test,
        );
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["bookingId"], "b-1");
        assert_eq!(value["bookingType"], "hotel");
        assert_eq!(value["paymentMethod"], "installments");
        assert_eq!(value["dataMode"], "test");
        assert_eq!(value["status"], "posted");
    }

    #[test]
    fn artifacts_are_ordered_revenue_invoice_receipt() {
        let collections: Vec<_> = Artifact::ALL.iter().map(|a| a.collection()).collect();
        assert_eq!(collections, ["revenues", "invoices", "receipts"]);
    }
}
