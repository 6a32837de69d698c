use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rihla_bookings::BookingKind;
use rihla_core::Amount;

use crate::document::{AccountingDocument, DocumentStatus};
use crate::expense::Expense;

/// Totals over revenue entries and expenses. Voided documents are excluded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub total_revenue: Amount,
    pub total_expenses: Amount,
    /// Revenue minus expenses; negative for a loss.
    pub net: f64,
    pub revenue_by_kind: BTreeMap<BookingKind, Amount>,
    pub revenue_count: usize,
    pub expense_count: usize,
    pub voided_count: usize,
}

impl LedgerSummary {
    pub fn from_documents(revenues: &[AccountingDocument], expenses: &[Expense]) -> Self {
        let mut summary = LedgerSummary::default();

        for doc in revenues {
            if doc.is_void() {
                summary.voided_count += 1;
                continue;
            }
            summary.revenue_count += 1;
            summary.total_revenue = summary.total_revenue + doc.amount;
            let slot = summary.revenue_by_kind.entry(doc.booking_type).or_default();
            *slot = *slot + doc.amount;
        }

        for expense in expenses {
            if expense.status == DocumentStatus::Void {
                summary.voided_count += 1;
                continue;
            }
            summary.expense_count += 1;
            summary.total_expenses = summary.total_expenses + expense.amount;
        }

        summary.total_revenue = summary.total_revenue.rounded();
        summary.total_expenses = summary.total_expenses.rounded();
        summary.net = summary.total_revenue.difference(summary.total_expenses);
        summary
    }
}
