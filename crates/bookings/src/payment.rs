//! Payment block and payment-method validation, shared by every booking kind.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rihla_core::{AMOUNT_TOLERANCE, Amount};

/// Installment plans are split into at most this many payments.
pub const MAX_INSTALLMENTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Knet,
    Visa,
    Mastercard,
    Tabby,
    Deferred,
    Installments,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Knet => "knet",
            PaymentMethod::Visa => "visa",
            PaymentMethod::Mastercard => "mastercard",
            PaymentMethod::Tabby => "tabby",
            PaymentMethod::Deferred => "deferred",
            PaymentMethod::Installments => "installments",
        }
    }
}

impl core::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBlock {
    pub method: PaymentMethod,
    #[serde(default)]
    pub receipt_number: String,
    pub total_cost: Amount,
    pub total_price: Amount,
    /// Required for `deferred`. Free text; no date-range check is applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Installment amounts for `installments`; `None` marks an empty field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub installments: Vec<Option<Amount>>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaymentValidationError {
    #[error("a due date is required for deferred payments")]
    MissingDueDate,

    #[error("installment payments need at least one installment")]
    NoInstallments,

    #[error("at most 3 installments are allowed (got {0})")]
    TooManyInstallments(usize),

    #[error("installment {0} is empty")]
    MissingInstallment(usize),

    #[error("installments sum to {sum} but the total price is {total}")]
    InstallmentMismatch { sum: Amount, total: Amount },
}

impl PaymentBlock {
    pub fn new(method: PaymentMethod, total_cost: Amount, total_price: Amount) -> Self {
        Self {
            method,
            receipt_number: String::new(),
            total_cost,
            total_price,
            due_date: None,
            installments: Vec::new(),
        }
    }

    /// Validate the fields the chosen method requires.
    ///
    /// - `deferred`: non-empty due date.
    /// - `installments`: 1..=3 amounts, all present, summing to the total
    ///   price within one fils.
    /// - everything else: nothing extra.
    pub fn validate(&self) -> Result<(), PaymentValidationError> {
        match self.method {
            PaymentMethod::Deferred => {
                let has_due_date = self
                    .due_date
                    .as_deref()
                    .is_some_and(|d| !d.trim().is_empty());
                if !has_due_date {
                    return Err(PaymentValidationError::MissingDueDate);
                }
                Ok(())
            }
            PaymentMethod::Installments => {
                if self.installments.is_empty() {
                    return Err(PaymentValidationError::NoInstallments);
                }
                if self.installments.len() > MAX_INSTALLMENTS {
                    return Err(PaymentValidationError::TooManyInstallments(
                        self.installments.len(),
                    ));
                }

                let mut sum = Amount::ZERO;
                for (idx, installment) in self.installments.iter().enumerate() {
                    match installment {
                        Some(a) => sum = sum + *a,
                        None => return Err(PaymentValidationError::MissingInstallment(idx + 1)),
                    }
                }

                if !sum.approx_eq(self.total_price, AMOUNT_TOLERANCE) {
                    return Err(PaymentValidationError::InstallmentMismatch {
                        sum,
                        total: self.total_price,
                    });
                }
                Ok(())
            }
            PaymentMethod::Cash
            | PaymentMethod::Knet
            | PaymentMethod::Visa
            | PaymentMethod::Mastercard
            | PaymentMethod::Tabby => Ok(()),
        }
    }
}
