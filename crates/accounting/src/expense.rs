use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rihla_bookings::PaymentMethod;
use rihla_core::{Amount, DataMode, DomainError, DomainResult, UserId};

use crate::document::DocumentStatus;

/// Operating expense (rent, salaries, supplier payouts...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    pub created_by: UserId,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub data_mode: DataMode,
    #[serde(default)]
    pub status: DocumentStatus,
}

impl Expense {
    pub fn new(
        description: impl Into<String>,
        category: impl Into<String>,
        amount: Amount,
        created_by: UserId,
        created_by_name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            description: description.into(),
            category: category.into(),
            amount,
            payment_method: None,
            created_by,
            created_by_name: created_by_name.into(),
            created_at,
            data_mode: DataMode::default(),
            status: DocumentStatus::Posted,
        }
    }

    pub fn paid_with(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("expense description is required"));
        }
        if self.amount.is_zero() {
            return Err(DomainError::validation("expense amount must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(description: &str, amount: f64) -> Expense {
        Expense::new(
            description,
            "office",
            Amount::new(amount).unwrap(),
            UserId::parse("acc-1").unwrap(),
            "Accountant",
            Utc::now(),
        )
    }

    #[test]
    fn valid_expense_passes() {
        assert!(expense("Office rent", 450.0).paid_with(PaymentMethod::Cash).validate().is_ok());
    }

    #[test]
    fn zero_amount_is_rejected() {
        assert!(matches!(
            expense("Office rent", 0.0).validate(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn blank_description_is_rejected() {
        assert!(expense("  ", 10.0).validate().is_err());
    }
}
